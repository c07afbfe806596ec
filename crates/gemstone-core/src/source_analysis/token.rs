// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for GemStone Smalltalk lexical analysis.
//!
//! **DDD Context:** Source Analysis
//!
//! Each token consists of:
//! - A [`TokenKind`] indicating the type of token
//! - The exact source text it was scanned from
//! - A [`Span`] indicating its location in the document
//!
//! Whitespace and comments are ordinary tokens ([`TokenKind::Whitespace`],
//! [`TokenKind::Comment`]) rather than trivia attached to neighbours, so the
//! formatter and the folding provider can recover exact layout. The parser
//! filters them out.

use std::fmt;

use ecow::EcoString;

use super::Span;

/// The kind of token, not including its text or source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Names and selectors ===
    /// An identifier: `foo`, `Array`, `_private`
    Identifier,
    /// A keyword selector part (ends with colon): `at:`, `ifTrue:`
    Keyword,
    /// A binary selector: `+`, `==`, `->`, `<=`, `~=`
    BinarySelector,
    /// A lone `-`; the parser decides between binary minus and a negative literal.
    Minus,
    /// A lone `<` (pragma/primitive opener or the less-than selector).
    LessThan,
    /// A lone `>` (pragma/primitive closer or the greater-than selector).
    GreaterThan,
    /// An environment specifier: `@env1:`
    EnvSpecifier,

    // === Literals ===
    /// An integer literal: `42`, `16rFF`, `16#FF`
    Integer,
    /// A float literal: `3.14`, `1e10`, `2.5d-3`, `1.5p2`
    Float,
    /// A scaled decimal literal: `3.14s2`, `1s`
    ScaledDecimal,
    /// A string literal: `'it''s'`
    String,
    /// A symbol literal: `#foo`, `#at:put:`, `#'hello world'`, `#+`
    Symbol,
    /// A character literal: `$a`
    Character,
    /// `true`, `false`, `nil` or `_remoteNil`
    SpecialLiteral,

    // === Delimiters ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// Literal array opener: `#(`
    ArrayOpen,
    /// Byte array opener: `#[`
    ByteArrayOpen,

    // === Punctuation ===
    /// Assignment: `:=` or the legacy `_`
    Assign,
    /// Return: `^`
    Caret,
    /// Block parameter marker: `:`
    Colon,
    /// Statement separator, or path separator when adjacent to identifiers: `.`
    Period,
    /// Cascade separator: `;`
    Semicolon,
    /// Temporaries/parameter delimiter, or the `|` binary selector
    Pipe,
    /// A `#` that does not start a literal
    Hash,

    // === Layout ===
    /// A run of whitespace
    Whitespace,
    /// A double-quoted comment: `"note"`
    Comment,

    // === Special ===
    /// Unrecognized input, preserved verbatim
    Error,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns true for tokens the parser skips.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Returns true for literal tokens.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Float
                | Self::ScaledDecimal
                | Self::String
                | Self::Symbol
                | Self::Character
                | Self::SpecialLiteral
        )
    }

    /// Returns true for numeric literal tokens.
    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::ScaledDecimal)
    }

    /// Returns true for tokens usable as a binary selector in message position.
    #[must_use]
    pub const fn is_binary_operator(self) -> bool {
        matches!(
            self,
            Self::BinarySelector | Self::Minus | Self::LessThan | Self::GreaterThan | Self::Pipe
        )
    }

    /// Returns true for closing delimiters.
    #[must_use]
    pub const fn is_closer(self) -> bool {
        matches!(
            self,
            Self::RightParen | Self::RightBracket | Self::RightBrace
        )
    }

    /// Returns a short human-readable description for diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::BinarySelector => "binary selector",
            Self::Minus => "'-'",
            Self::LessThan => "'<'",
            Self::GreaterThan => "'>'",
            Self::EnvSpecifier => "environment specifier",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::ScaledDecimal => "scaled decimal",
            Self::String => "string",
            Self::Symbol => "symbol",
            Self::Character => "character",
            Self::SpecialLiteral => "special literal",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::ArrayOpen => "'#('",
            Self::ByteArrayOpen => "'#['",
            Self::Assign => "':='",
            Self::Caret => "'^'",
            Self::Colon => "':'",
            Self::Period => "'.'",
            Self::Semicolon => "';'",
            Self::Pipe => "'|'",
            Self::Hash => "'#'",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Error => "unrecognized character",
            Self::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its kind, source text and location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    text: EcoString,
    span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns the token kind.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the exact source text of the token.
    #[must_use]
    pub fn text(&self) -> &EcoString {
        &self.text
    }

    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns true if this token ends exactly where `next` begins.
    #[must_use]
    pub const fn is_adjacent_to(&self, next: &Self) -> bool {
        self.span.end().offset == next.span.start().offset
    }

    /// Returns true for whitespace and comments.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            f.write_str("end of input")
        } else {
            write!(f, "'{}'", self.text)
        }
    }
}
