// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Method-level declaration parsing for GemStone Smalltalk.
//!
//! This module handles everything in a method before its statements:
//! - Message patterns (unary, binary, keyword)
//! - Primitive declarations (`<primitive: 62>`, `<protected primitive: 33>`,
//!   `<protected>`)
//! - Pragmas (`<category: 'accessing'>`, `<inline>`)
//! - Temporary declarations (`| a b |`)

use crate::ast::{
    BinaryPattern, Identifier, KeywordPattern, MessagePattern, Method, MethodBody, Pragma,
    PragmaPair, Primitive, Protection, UnaryPattern,
};
use crate::source_analysis::{Span, TokenKind};
use ecow::EcoString;

use super::Parser;
use super::literals::parse_integer;

impl Parser {
    // ========================================================================
    // Method Parsing
    // ========================================================================

    /// Parses a complete method: pattern, declarations and statements.
    pub(super) fn parse_method(&mut self) -> Method {
        let pattern = self.parse_pattern();
        let (primitive, body) = self.parse_method_body();
        let span = pattern.span().merge(self.previous_span()).merge(body.span);
        Method {
            pattern,
            primitive,
            body,
            span,
        }
    }

    /// Parses a bare statement list with optional temporaries.
    pub(super) fn parse_code_body(&mut self) -> MethodBody {
        let body_start = self.current;
        let (temporaries, temporaries_span) = self.parse_temporaries();
        let statements = self.parse_statements(None);
        MethodBody {
            pragmas: Vec::new(),
            temporaries,
            temporaries_span,
            statements,
            span: self.span_since(body_start),
        }
    }

    /// Parses the declarations and statements that follow a pattern.
    ///
    /// Primitives, pragmas and one temporaries declaration may appear in any
    /// order before the first statement.
    fn parse_method_body(&mut self) -> (Option<Primitive>, MethodBody) {
        let body_start = self.current;
        let mut primitive = None;
        let mut pragmas = Vec::new();
        let mut temporaries = Vec::new();
        let mut temporaries_span = None;

        loop {
            if self.check(TokenKind::LessThan) {
                self.parse_angle_declaration(&mut primitive, &mut pragmas);
            } else if self.check(TokenKind::Pipe) && temporaries_span.is_none() {
                (temporaries, temporaries_span) = self.parse_temporaries();
            } else {
                break;
            }
        }

        let statements = self.parse_statements(None);
        let body = MethodBody {
            pragmas,
            temporaries,
            temporaries_span,
            statements,
            span: self.span_since(body_start),
        };
        (primitive, body)
    }

    /// Returns the span covering tokens consumed since index `start`.
    fn span_since(&self, start: usize) -> Span {
        match self.tokens.get(start) {
            Some(first) if self.current > start => first.span().merge(self.previous_span()),
            _ => Span::at(self.current_span().start()),
        }
    }

    // ========================================================================
    // Message Patterns
    // ========================================================================

    /// Parses the method's message pattern.
    ///
    /// A missing pattern is reported and replaced by a placeholder unary
    /// pattern without consuming anything.
    fn parse_pattern(&mut self) -> MessagePattern {
        match self.current_kind() {
            TokenKind::Keyword => MessagePattern::Keyword(self.parse_keyword_pattern()),
            TokenKind::Identifier => {
                let token = self.advance();
                MessagePattern::Unary(UnaryPattern {
                    selector: Identifier::new(token.text().clone(), token.span()),
                    span: token.span(),
                })
            }
            kind if kind.is_binary_operator() => {
                let (selector, selector_span) = self.parse_binary_selector();
                let parameter = self.parse_pattern_argument(&selector, selector_span);
                MessagePattern::Binary(BinaryPattern {
                    span: selector_span.merge(parameter.span),
                    selector,
                    selector_span,
                    parameter,
                })
            }
            _ => {
                let found = self.current_token().to_string();
                self.error(format!("expected method pattern, found {found}"));
                let span = Span::at(self.current_span().start());
                MessagePattern::Unary(UnaryPattern {
                    selector: Identifier::placeholder(span),
                    span,
                })
            }
        }
    }

    fn parse_keyword_pattern(&mut self) -> KeywordPattern {
        let mut keywords = Vec::new();
        let mut parameters = Vec::new();
        let mut selector = EcoString::new();
        while self.check(TokenKind::Keyword) {
            let token = self.advance();
            selector.push_str(token.text());
            parameters.push(self.parse_pattern_argument(token.text(), token.span()));
            keywords.push(Identifier::new(token.text().clone(), token.span()));
        }

        let span = match (keywords.first(), parameters.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => self.previous_span(),
        };
        KeywordPattern {
            keywords,
            parameters,
            selector,
            span,
        }
    }

    /// Parses a pattern parameter name following `after`.
    fn parse_pattern_argument(&mut self, after: &str, after_span: Span) -> Identifier {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            return Identifier::new(token.text().clone(), token.span());
        }
        let found = self.current_token().to_string();
        self.error(format!("expected argument name after '{after}', found {found}"));
        Identifier::placeholder(Span::at(after_span.end()))
    }

    // ========================================================================
    // Primitives and Pragmas
    // ========================================================================

    /// Parses one `< ... >` declaration, which is either a primitive or a
    /// pragma.
    fn parse_angle_declaration(
        &mut self,
        primitive: &mut Option<Primitive>,
        pragmas: &mut Vec<Pragma>,
    ) {
        let open = self.advance(); // <
        match self.try_parse_primitive(open.span()) {
            Some(parsed) if primitive.is_some() => {
                self.error_at("duplicate primitive declaration", parsed.span);
            }
            Some(parsed) => *primitive = Some(parsed),
            None => {
                if let Some(pragma) = self.parse_pragma(open.span()) {
                    pragmas.push(pragma);
                }
            }
        }
    }

    /// Attempts to parse the inside of a primitive declaration.
    ///
    /// On anything that is not a primitive the cursor is restored to just
    /// after `<` and `None` is returned.
    fn try_parse_primitive(&mut self, open: Span) -> Option<Primitive> {
        let saved = self.current;

        let protection = match self.current_token().text().as_str() {
            "protected" if self.check(TokenKind::Identifier) => Some(Protection::Protected),
            "unprotected" if self.check(TokenKind::Identifier) => Some(Protection::Unprotected),
            _ => None,
        };
        if protection.is_some() {
            self.advance();
            if self.check(TokenKind::GreaterThan) {
                let close = self.advance();
                return Some(Primitive {
                    protection,
                    number: None,
                    span: open.merge(close.span()),
                });
            }
        }

        if !(self.check(TokenKind::Keyword) && self.current_token().text() == "primitive:") {
            self.current = saved;
            return None;
        }
        self.advance(); // primitive:

        let number = self.parse_primitive_number();
        let end = match self.expect(TokenKind::GreaterThan, "expected '>' to close primitive") {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        Some(Primitive {
            protection,
            number,
            span: open.merge(end),
        })
    }

    /// Parses the primitive number; on failure skips to the closing `>`.
    fn parse_primitive_number(&mut self) -> Option<u32> {
        if self.check(TokenKind::Integer) {
            let token = self.advance();
            let value = parse_integer(token.text())
                .ok()
                .and_then(|n| u32::try_from(n).ok());
            if value.is_none() {
                self.error_at("primitive number is out of range", token.span());
            }
            return value;
        }

        let found = self.current_token().to_string();
        self.error(format!("expected primitive number, found {found}"));
        while !self.is_at_end() && !self.check(TokenKind::GreaterThan) {
            self.advance();
        }
        None
    }

    /// Parses a pragma body after `<`: `inline>` or `category: 'x'>`.
    fn parse_pragma(&mut self, open: Span) -> Option<Pragma> {
        if self.check(TokenKind::Identifier) && self.peek_kind() == Some(TokenKind::GreaterThan) {
            let name = self.advance();
            let close = self.advance();
            return Some(Pragma::Unary {
                selector: Identifier::new(name.text().clone(), name.span()),
                span: open.merge(close.span()),
            });
        }

        if !self.check(TokenKind::Keyword) {
            let found = self.current_token().to_string();
            self.error(format!("expected pragma or primitive after '<', found {found}"));
            return None;
        }

        let mut pairs = Vec::new();
        while self.check(TokenKind::Keyword) {
            let token = self.advance();
            let keyword = Identifier::new(token.text().clone(), token.span());
            let Some(literal) = self.parse_pragma_literal() else {
                let found = self.current_token().to_string();
                self.error(format!(
                    "expected literal argument for '{}', found {found}",
                    keyword.name
                ));
                break;
            };
            pairs.push(PragmaPair { keyword, literal });
        }

        let end = match self.expect(TokenKind::GreaterThan, "expected '>' to close pragma") {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        Some(Pragma::Keyword {
            pairs,
            span: open.merge(end),
        })
    }

    // ========================================================================
    // Temporaries
    // ========================================================================

    /// Parses `| a b c |`, returning the names and the span including both
    /// bars. Returns no span when the current token is not `|`.
    pub(super) fn parse_temporaries(&mut self) -> (Vec<Identifier>, Option<Span>) {
        if !self.check(TokenKind::Pipe) {
            return (Vec::new(), None);
        }
        let open = self.advance();
        let mut names = Vec::new();
        while self.check(TokenKind::Identifier) {
            let token = self.advance();
            names.push(Identifier::new(token.text().clone(), token.span()));
        }
        let end = match self.expect(TokenKind::Pipe, "expected '|' to close temporaries") {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        (names, Some(open.span().merge(end)))
    }
}
