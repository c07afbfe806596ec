// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Literal parsing for GemStone Smalltalk.
//!
//! Handles scalar literal tokens, literal arrays (`#(...)`) with their
//! reduced grammar, byte arrays (`#[...]`) and the lexical diagnostics the
//! parser reports for error tokens and unterminated literals.

use crate::ast::{Literal, LiteralNode, NumberKind, NumberLiteral, SpecialLiteral};
use crate::source_analysis::{Token, TokenKind};
use ecow::EcoString;

use super::{Diagnostic, Parser};

/// Parses an integer literal, including `16rFF` and `16#FF` radix forms.
pub(super) fn parse_integer(s: &str) -> Result<i64, String> {
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let value = if let Some((radix_str, digits)) = s.split_once(['r', '#']) {
        let radix = radix_str
            .parse::<u32>()
            .map_err(|_| format!("Invalid radix: {radix_str}"))?;

        if !(2..=36).contains(&radix) {
            return Err(format!("Radix must be between 2 and 36, got {radix}"));
        }

        i64::from_str_radix(digits, radix)
            .map_err(|_| format!("Invalid digit for radix {radix}: {digits}"))?
    } else {
        s.parse::<i64>()
            .map_err(|_| format!("Invalid integer: {s}"))?
    };
    Ok(if negative { -value } else { value })
}

/// Returns true if a `quote`-delimited literal text has its closing quote.
///
/// The body after the opening quote must end in an odd run of quotes: an
/// even run is only doubled-quote escapes.
fn is_terminated(text: &str, quote: char) -> bool {
    let Some(body) = text.strip_prefix(quote) else {
        return false;
    };
    let trailing = body.chars().rev().take_while(|&c| c == quote).count();
    trailing % 2 == 1
}

/// Resolves doubled-quote escapes in a quoted literal body.
fn unescape(text: &str, quote: char) -> EcoString {
    let body = text.strip_prefix(quote).unwrap_or(text);
    let body = if is_terminated(text, quote) {
        body.strip_suffix(quote).unwrap_or(body)
    } else {
        body
    };
    let mut value = EcoString::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        value.push(c);
        if c == quote && chars.peek() == Some(&quote) {
            chars.next();
        }
    }
    value
}

/// Returns the diagnostic a token warrants before parsing, if any.
pub(super) fn lexical_diagnostic(token: &Token) -> Option<Diagnostic> {
    let text = token.text().as_str();
    let message = match token.kind() {
        TokenKind::Error if text == "$" => "expected a character after '$'".to_string(),
        TokenKind::Error => format!("unexpected character '{text}'"),
        TokenKind::String if !is_terminated(text, '\'') => "unterminated string literal".into(),
        TokenKind::Comment if !is_terminated(text, '"') => "unterminated comment".into(),
        TokenKind::Symbol
            if text.starts_with("#'") && !is_terminated(&text[1..], '\'') =>
        {
            "unterminated symbol literal".into()
        }
        _ => return None,
    };
    Some(Diagnostic::error(message, token.span()))
}

/// Builds the value of a scalar literal token.
pub(super) fn scalar_literal(token: &Token) -> Option<Literal> {
    let text = token.text();
    let value = match token.kind() {
        TokenKind::Integer => number(text.clone(), NumberKind::Integer),
        TokenKind::Float => number(text.clone(), NumberKind::Float),
        TokenKind::ScaledDecimal => number(text.clone(), NumberKind::ScaledDecimal),
        TokenKind::String => Literal::String(unescape(text, '\'')),
        TokenKind::Symbol => Literal::Symbol(symbol_value(text)),
        TokenKind::Character => Literal::Character(text.chars().nth(1)?),
        TokenKind::SpecialLiteral => Literal::Special(SpecialLiteral::from_name(text)?),
        _ => return None,
    };
    Some(value)
}

fn number(text: EcoString, kind: NumberKind) -> Literal {
    Literal::Number(NumberLiteral { text, kind })
}

fn number_kind(kind: TokenKind) -> NumberKind {
    match kind {
        TokenKind::Float => NumberKind::Float,
        TokenKind::ScaledDecimal => NumberKind::ScaledDecimal,
        _ => NumberKind::Integer,
    }
}

/// Returns a symbol's name without `#` and quotes.
fn symbol_value(text: &str) -> EcoString {
    let name = text.strip_prefix('#').unwrap_or(text);
    if name.starts_with('\'') {
        unescape(name, '\'')
    } else {
        name.into()
    }
}

impl Parser {
    // ========================================================================
    // Literal Parsing
    // ========================================================================

    /// Returns true if the current token is a `-` immediately followed by a number.
    pub(super) fn at_negative_number(&self) -> bool {
        self.check(TokenKind::Minus)
            && self.peek_at(1).is_some_and(|next| {
                next.kind().is_number() && self.current_token().is_adjacent_to(next)
            })
    }

    /// Parses `-` followed by an adjacent number into one negative literal.
    pub(super) fn parse_negative_number(&mut self) -> LiteralNode {
        let minus = self.advance();
        let number = self.advance();
        let mut text = EcoString::from("-");
        text.push_str(number.text());
        LiteralNode {
            value: Literal::Number(NumberLiteral {
                text,
                kind: number_kind(number.kind()),
            }),
            span: minus.span().merge(number.span()),
        }
    }

    /// Parses a literal usable as a pragma argument.
    pub(super) fn parse_pragma_literal(&mut self) -> Option<LiteralNode> {
        if self.at_negative_number() {
            return Some(self.parse_negative_number());
        }
        match self.current_kind() {
            TokenKind::ArrayOpen => Some(self.parse_literal_array()),
            TokenKind::ByteArrayOpen => Some(self.parse_byte_array()),
            _ => self.parse_scalar_literal(),
        }
    }

    /// Parses a literal array: `#(1 $a 'str' #sym foo at:put: (nested) #[1 2])`.
    ///
    /// The current token is `#(` (or `(` for a nested array).
    pub(super) fn parse_literal_array(&mut self) -> LiteralNode {
        let open = self.advance();
        if !self.enter_nesting() {
            return LiteralNode {
                value: Literal::Array(Vec::new()),
                span: open.span(),
            };
        }
        let elements = stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            self.parse_literal_array_elements()
        });
        self.leave_nesting();

        let end = if self.check(TokenKind::RightParen) {
            self.advance().span()
        } else {
            self.error("expected ')' to close literal array");
            self.previous_span()
        };
        LiteralNode {
            value: Literal::Array(elements),
            span: open.span().merge(end),
        }
    }

    fn parse_literal_array_elements(&mut self) -> Vec<LiteralNode> {
        let mut elements = Vec::new();
        loop {
            if self.at_negative_number() {
                elements.push(self.parse_negative_number());
                continue;
            }
            let token = self.current_token().clone();
            match token.kind() {
                TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
                | TokenKind::Eof => break,
                TokenKind::LeftParen | TokenKind::ArrayOpen => {
                    elements.push(self.parse_literal_array());
                }
                TokenKind::ByteArrayOpen => elements.push(self.parse_byte_array()),
                TokenKind::Identifier => {
                    self.advance();
                    elements.push(LiteralNode {
                        value: Literal::Symbol(token.text().clone()),
                        span: token.span(),
                    });
                }
                TokenKind::Keyword => elements.push(self.parse_bare_keyword_symbol()),
                kind if kind.is_binary_operator() => {
                    self.advance();
                    elements.push(LiteralNode {
                        value: Literal::Symbol(token.text().clone()),
                        span: token.span(),
                    });
                }
                _ => match scalar_literal(&token) {
                    Some(value) => {
                        self.advance();
                        elements.push(LiteralNode {
                            value,
                            span: token.span(),
                        });
                    }
                    None => {
                        self.error(format!("unexpected {token} in literal array"));
                        self.advance();
                    }
                },
            }
        }
        elements
    }

    /// Glues adjacent keyword tokens inside a literal array: `at:put:`.
    fn parse_bare_keyword_symbol(&mut self) -> LiteralNode {
        let first = self.advance();
        let mut name = first.text().clone();
        let mut span = first.span();
        while let Some(next) = self.peek_at(0) {
            let adjacent = self
                .tokens
                .get(self.current.wrapping_sub(1))
                .is_some_and(|prev| prev.is_adjacent_to(next));
            if next.kind() != TokenKind::Keyword || !adjacent {
                break;
            }
            let next = self.advance();
            name.push_str(next.text());
            span = span.merge(next.span());
        }
        LiteralNode {
            value: Literal::Symbol(name),
            span,
        }
    }

    /// Parses a byte array: `#[1 2 255]`.
    pub(super) fn parse_byte_array(&mut self) -> LiteralNode {
        let open = self.advance();
        let mut bytes = Vec::new();
        loop {
            let token = self.current_token().clone();
            match token.kind() {
                TokenKind::RightBracket => break,
                TokenKind::Eof | TokenKind::RightParen | TokenKind::RightBrace => break,
                TokenKind::Integer => {
                    self.advance();
                    match parse_integer(token.text()).ok().and_then(|v| u8::try_from(v).ok()) {
                        Some(byte) => bytes.push(byte),
                        None => self.error_at(
                            "byte array elements must be integers between 0 and 255",
                            token.span(),
                        ),
                    }
                }
                _ if self.at_negative_number() => {
                    let literal = self.parse_negative_number();
                    self.error_at(
                        "byte array elements must be integers between 0 and 255",
                        literal.span,
                    );
                }
                _ => {
                    self.error(format!("unexpected {token} in byte array"));
                    self.advance();
                }
            }
        }
        let end = if self.check(TokenKind::RightBracket) {
            self.advance().span()
        } else {
            self.error("expected ']' to close byte array");
            self.previous_span()
        };
        LiteralNode {
            value: Literal::ByteArray(bytes),
            span: open.span().merge(end),
        }
    }

    /// Parses a scalar literal token at the current position.
    pub(super) fn parse_scalar_literal(&mut self) -> Option<LiteralNode> {
        let token = self.current_token().clone();
        let value = scalar_literal(&token)?;
        self.advance();
        Some(LiteralNode {
            value,
            span: token.span(),
        })
    }
}
