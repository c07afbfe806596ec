// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for GemStone Smalltalk source code.
//!
//! **DDD Context:** Source Analysis
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written for control over error recovery and layout preservation.
//!
//! # Design Principles
//!
//! - **Error recovery**: Never panic on malformed input; emit [`TokenKind::Error`]
//! - **Layout preservation**: Whitespace and comments are tokens too
//! - **Precise spans**: Every token carries offset, line and column
//! - **Unterminated literals**: Strings, quoted symbols and comments that never
//!   close run to end of input instead of failing
//!
//! # Example
//!
//! ```
//! use gemstone_core::source_analysis::{TokenKind, tokenize};
//!
//! let kinds: Vec<_> = tokenize("x + 1")
//!     .iter()
//!     .map(|t| t.kind())
//!     .filter(|k| !k.is_trivia())
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::Identifier, TokenKind::BinarySelector, TokenKind::Integer, TokenKind::Eof]
//! );
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use super::{Position, Span, Token, TokenKind};

/// Identifiers that scan as [`TokenKind::SpecialLiteral`].
const SPECIAL_LITERALS: [&str; 4] = ["true", "false", "nil", "_remoteNil"];

/// Exponent letters that make a number a float.
const FLOAT_EXPONENTS: [char; 8] = ['e', 'E', 'd', 'D', 'q', 'Q', 'f', 'F'];

/// A lexer that tokenizes GemStone Smalltalk source code.
///
/// The lexer implements [`Iterator`] (yielding every token except EOF). Use
/// [`tokenize`] or [`tokenize_at`] to collect a full stream ending with EOF.
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions relative to `source`.
    chars: Peekable<CharIndices<'src>>,
    /// Document offset of `source[0]`.
    base: u32,
    /// Current document position.
    position: Position,
    /// Set once EOF has been produced.
    finished: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.index()..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer starting at the beginning of a document.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::with_origin(source, Position::default())
    }

    /// Creates a lexer whose first character sits at `origin`.
    ///
    /// Used for regions of a larger document so every span is already in
    /// whole-document coordinates.
    #[must_use]
    pub fn with_origin(source: &'src str, origin: Position) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            base: origin.offset,
            position: origin,
            finished: false,
        }
    }

    /// Byte index into `source` of the current position.
    fn index(&self) -> usize {
        (self.position.offset - self.base) as usize
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is same as `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        self.position = self.position.advanced_by(c);
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Extracts source text from `start` to the current position.
    fn text_from(&self, start: Position) -> &'src str {
        let from = (start.offset - self.base) as usize;
        &self.source[from..self.index()]
    }

    /// Lexes the next token, returning EOF once input is exhausted.
    fn lex_token(&mut self) -> Token {
        let start = self.position;
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.lex_token_kind(c),
        };
        Token::new(kind, self.text_from(start), Span::new(start, self.position))
    }

    /// Lexes a token kind based on the first character.
    fn lex_token_kind(&mut self, c: char) -> TokenKind {
        match c {
            c if c.is_whitespace() => {
                self.advance_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            '"' => self.lex_comment(),

            // Identifiers, keywords, special literals; `_` alone is the legacy assignment
            '_' if !self.peek_char_n(1).is_some_and(|c| c.is_ascii_alphabetic()) => {
                self.advance();
                TokenKind::Assign
            }
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier_or_keyword(),

            '0'..='9' => self.lex_number(),
            '\'' => self.lex_string(),
            '$' => self.lex_character(),
            '#' => self.lex_symbol_or_hash(),
            ':' => self.lex_colon_or_assign(),
            '@' => self.lex_at(),
            '<' | '>' => self.lex_angle(c),
            '-' => self.lex_minus(),

            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '^' => self.single(TokenKind::Caret),
            '.' => self.single(TokenKind::Period),
            ';' => self.single(TokenKind::Semicolon),
            '|' => self.single(TokenKind::Pipe),

            c if is_binary_selector_char(c) => self.lex_binary_selector(),

            // Unknown character - error recovery
            _ => self.single(TokenKind::Error),
        }
    }

    /// Consumes one character and returns `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Lexes a comment: `"..."`, with `""` standing for an embedded quote.
    fn lex_comment(&mut self) -> TokenKind {
        self.skip_quoted('"');
        TokenKind::Comment
    }

    /// Consumes a `quote`-delimited body whose closing quote is doubled to escape it.
    ///
    /// Unterminated input runs to end of input.
    fn skip_quoted(&mut self, quote: char) {
        self.advance(); // opening quote
        while let Some(c) = self.advance() {
            if c == quote {
                if self.peek_char() == Some(quote) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
    }

    /// Lexes an identifier, keyword selector part or special literal.
    fn lex_identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.position;
        self.advance_while(is_identifier_char);

        if self.peek_char() == Some(':') && self.peek_char_n(1) != Some('=') {
            self.advance(); // consume the colon
            return TokenKind::Keyword;
        }

        if SPECIAL_LITERALS.contains(&self.text_from(start)) {
            TokenKind::SpecialLiteral
        } else {
            TokenKind::Identifier
        }
    }

    /// Lexes a number: integer, radix integer, float, scaled decimal or fixed point.
    fn lex_number(&mut self) -> TokenKind {
        self.advance_while(|c| c.is_ascii_digit());

        // Radix: 16rFF or 16#FF, only when a digit follows the marker
        if matches!(self.peek_char(), Some('r' | '#'))
            && self.peek_char_n(1).is_some_and(|c| c.is_ascii_alphanumeric())
        {
            self.advance(); // r or #
            self.advance_while(|c| c.is_ascii_alphanumeric());
            return TokenKind::Integer;
        }

        let mut kind = TokenKind::Integer;

        // Fraction: a decimal point followed by a digit
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // .
            self.advance_while(|c| c.is_ascii_digit());
            kind = TokenKind::Float;
        }

        match self.peek_char() {
            Some(c) if FLOAT_EXPONENTS.contains(&c) && self.exponent_follows() => {
                self.advance(); // exponent letter
                self.lex_signed_digits();
                TokenKind::Float
            }
            Some('s') if self.suffix_allowed() => {
                self.advance(); // s
                self.lex_signed_digits();
                TokenKind::ScaledDecimal
            }
            Some('p') if self.suffix_allowed() => {
                self.advance(); // p
                self.lex_signed_digits();
                TokenKind::Float
            }
            _ => kind,
        }
    }

    /// True when the character after the exponent letter starts a (signed) integer.
    fn exponent_follows(&self) -> bool {
        match self.peek_char_n(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('-') => self.peek_char_n(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// True when a scale/fixed-point suffix letter belongs to the number.
    ///
    /// The letter may stand alone (`3s`) or carry a scale (`3.1s2`), but must
    /// not be the start of an adjacent identifier (`3sqrt`).
    fn suffix_allowed(&self) -> bool {
        match self.peek_char_n(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('-') => self.peek_char_n(2).is_some_and(|c| c.is_ascii_digit()),
            Some(c) => !is_identifier_char(c) && c != ':',
            None => true,
        }
    }

    /// Consumes an optional `-` followed by digits.
    fn lex_signed_digits(&mut self) {
        if self.peek_char() == Some('-') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
        }
        self.advance_while(|c| c.is_ascii_digit());
    }

    /// Lexes a string literal: `'...'` with `''` for an embedded quote.
    fn lex_string(&mut self) -> TokenKind {
        self.skip_quoted('\'');
        TokenKind::String
    }

    /// Lexes a character literal: `$a`, `$ `, `$'`.
    fn lex_character(&mut self) -> TokenKind {
        self.advance(); // $
        if self.advance().is_some() {
            TokenKind::Character
        } else {
            TokenKind::Error
        }
    }

    /// Lexes a symbol literal, a literal array opener or a standalone hash.
    fn lex_symbol_or_hash(&mut self) -> TokenKind {
        self.advance(); // #

        match self.peek_char() {
            Some('(') => self.single(TokenKind::ArrayOpen),
            Some('[') => self.single(TokenKind::ByteArrayOpen),
            Some('\'') => {
                self.skip_quoted('\'');
                TokenKind::Symbol
            }
            // Identifier symbol: #foo, or keyword symbol: #at:put:
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.advance_while(is_identifier_char);
                while self.peek_char() == Some(':') && self.peek_char_n(1) != Some('=') {
                    self.advance(); // :
                    if !self
                        .peek_char()
                        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    {
                        break;
                    }
                    self.advance_while(is_identifier_char);
                }
                TokenKind::Symbol
            }
            // Binary selector symbol: at most two selector characters
            Some(c) if is_binary_selector_char(c) || c == '|' => {
                self.advance();
                if self
                    .peek_char()
                    .is_some_and(|c| is_binary_selector_char(c) || c == '|')
                {
                    self.advance();
                }
                TokenKind::Symbol
            }
            _ => TokenKind::Hash,
        }
    }

    /// Lexes a colon or the assignment operator.
    fn lex_colon_or_assign(&mut self) -> TokenKind {
        self.advance(); // :
        if self.peek_char() == Some('=') {
            self.advance(); // =
            TokenKind::Assign
        } else {
            TokenKind::Colon
        }
    }

    /// Lexes `@envN:` or an `@`-led binary selector.
    fn lex_at(&mut self) -> TokenKind {
        let is_env = self.peek_char_n(1) == Some('e')
            && self.peek_char_n(2) == Some('n')
            && self.peek_char_n(3) == Some('v')
            && self.peek_char_n(4).is_some_and(|c| c.is_ascii_digit());
        if is_env {
            let mut n = 5;
            while self.peek_char_n(n).is_some_and(|c| c.is_ascii_digit()) {
                n += 1;
            }
            if self.peek_char_n(n) == Some(':') {
                for _ in 0..=n {
                    self.advance();
                }
                return TokenKind::EnvSpecifier;
            }
        }
        self.lex_binary_selector()
    }

    /// Lexes `<` or `>`, pairing with a directly following `=`.
    fn lex_angle(&mut self, c: char) -> TokenKind {
        self.advance();
        if self.peek_char() == Some('=') {
            self.advance();
            return TokenKind::BinarySelector;
        }
        if c == '<' {
            TokenKind::LessThan
        } else {
            TokenKind::GreaterThan
        }
    }

    /// Lexes `-`, which is standalone unless another selector character follows.
    fn lex_minus(&mut self) -> TokenKind {
        self.advance(); // -
        if self.peek_char().is_some_and(is_binary_selector_char) {
            self.advance();
            TokenKind::BinarySelector
        } else {
            TokenKind::Minus
        }
    }

    /// Lexes a binary selector: one selector character followed by more,
    /// stopping before a `-` so that `3+-1` reads as `3 + -1`.
    fn lex_binary_selector(&mut self) -> TokenKind {
        self.advance();
        self.advance_while(|c| is_binary_selector_char(c) && c != '-');
        TokenKind::BinarySelector
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.lex_token();
        if token.kind() == TokenKind::Eof {
            self.finished = true;
            None
        } else {
            Some(token)
        }
    }
}

/// Returns true if `c` may continue an identifier.
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if the character is a binary selector (operator) character.
///
/// `|` is excluded: it is always its own [`TokenKind::Pipe`] token.
#[must_use]
pub fn is_binary_selector_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '\\' | '<' | '>' | '=' | '~' | '@' | '%' | '&' | '?' | ',' | '!'
    )
}

/// Tokenizes a whole document. The result always ends with an EOF token.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_at(source, Position::default())
}

/// Tokenizes `source` as if it started at `origin` within a larger document.
#[must_use]
pub fn tokenize_at(source: &str, origin: Position) -> Vec<Token> {
    let mut lexer = Lexer::with_origin(source, origin);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex_token();
        let is_eof = token.kind() == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}
