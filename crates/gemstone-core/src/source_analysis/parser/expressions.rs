// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement and expression parsing for GemStone Smalltalk.
//!
//! This module contains the expression half of the `Parser`:
//!
//! - Return statements (`^`)
//! - Assignment chains (`:=` and the legacy `_`)
//! - Message sends (unary, binary, keyword) with environment specifiers
//! - Cascades (`;`)
//! - Primaries: variables, dotted paths, literals, blocks, selection blocks,
//!   parenthesized statements and curly-brace array builders

use crate::ast::{
    Assignment, BinaryMessage, Block, CurlyArrayBuilder, EnvSpecifier, Expression, Identifier,
    KeywordMessage, KeywordPart, Message, ParenExpression, Path, Primary, Return, SelectionBlock,
    Statement, UnaryMessage,
};
use crate::source_analysis::{Span, Token, TokenKind};
use ecow::EcoString;

use super::Parser;

/// Reads the environment number out of an `@envN:` token.
fn env_number(token: &Token) -> u32 {
    token
        .text()
        .trim_start_matches("@env")
        .trim_end_matches(':')
        .parse()
        .unwrap_or(0)
}

impl Parser {
    // ========================================================================
    // Statement Parsing
    // ========================================================================

    /// Parses a statement: a return, an assignment chain or an expression.
    pub(super) fn parse_statement(&mut self) -> Statement {
        if self.check(TokenKind::Caret) {
            let caret = self.advance();
            let value = self.parse_assignment();
            let span = caret.span().merge(value.span());
            return Statement::Return(Return {
                expression: Box::new(value),
                span,
            });
        }
        self.parse_assignment()
    }

    /// Parses `a := b := expr`, building the chain right-associatively.
    fn parse_assignment(&mut self) -> Statement {
        let mut targets = Vec::new();
        while self.check(TokenKind::Identifier) && self.peek_kind() == Some(TokenKind::Assign) {
            let name = self.advance();
            self.advance(); // := or _
            targets.push(Identifier::new(name.text().clone(), name.span()));
        }

        let mut statement = Statement::Expression(self.parse_expression());
        while let Some(variable) = targets.pop() {
            let span = variable.span.merge(statement.span());
            statement = Statement::Assignment(Assignment {
                variable,
                value: Box::new(statement),
                span,
            });
        }
        statement
    }

    // ========================================================================
    // Expression Parsing
    // ========================================================================

    /// Parses a full expression: primary, unary*, binary*, keyword?, cascades.
    pub(super) fn parse_expression(&mut self) -> Expression {
        let receiver = self.parse_primary();
        let mut messages = Vec::new();
        self.parse_unary_messages(&mut messages);
        self.parse_binary_messages(&mut messages);
        if let Some(keyword) = self.parse_keyword_message() {
            messages.push(Message::Keyword(keyword));
        }

        let mut cascades = Vec::new();
        if !messages.is_empty() {
            while self.check(TokenKind::Semicolon) {
                let semicolon = self.advance();
                match self.parse_cascade_message() {
                    Some(message) => cascades.push(message),
                    None => {
                        self.error_at("expected a message after ';' in cascade", semicolon.span());
                        break;
                    }
                }
            }
        }

        let span = messages
            .iter()
            .chain(&cascades)
            .fold(receiver.span(), |span, message| span.merge(message.span()));
        Expression {
            receiver,
            messages,
            cascades,
            span,
        }
    }

    /// Parses a keyword-message argument: primary, unary*, binary*.
    fn parse_keyword_argument(&mut self) -> Expression {
        let receiver = self.parse_primary();
        let mut messages = Vec::new();
        self.parse_unary_messages(&mut messages);
        self.parse_binary_messages(&mut messages);
        Self::finish_expression(receiver, messages)
    }

    /// Parses a binary-message argument: primary, unary*.
    fn parse_binary_argument(&mut self) -> Expression {
        let receiver = self.parse_primary();
        let mut messages = Vec::new();
        self.parse_unary_messages(&mut messages);
        Self::finish_expression(receiver, messages)
    }

    fn finish_expression(receiver: Primary, messages: Vec<Message>) -> Expression {
        let span = messages
            .iter()
            .fold(receiver.span(), |span, message| span.merge(message.span()));
        Expression {
            receiver,
            messages,
            cascades: Vec::new(),
            span,
        }
    }

    /// Parses one cascade segment: a single unary, binary or keyword message.
    fn parse_cascade_message(&mut self) -> Option<Message> {
        if let Some(unary) = self.parse_unary_message() {
            return Some(Message::Unary(unary));
        }
        if let Some(binary) = self.parse_binary_message() {
            return Some(Message::Binary(binary));
        }
        self.parse_keyword_message().map(Message::Keyword)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Returns true if the current token (after an optional environment
    /// specifier) satisfies `selector`.
    fn at_selector(&self, selector: impl Fn(TokenKind) -> bool) -> bool {
        if self.check(TokenKind::EnvSpecifier) {
            self.peek_kind().is_some_and(selector)
        } else {
            selector(self.current_kind())
        }
    }

    /// Consumes an `@envN:` token if present.
    fn parse_env(&mut self) -> Option<EnvSpecifier> {
        if self.check(TokenKind::EnvSpecifier) {
            let token = self.advance();
            Some(EnvSpecifier {
                env: env_number(&token),
                span: token.span(),
            })
        } else {
            None
        }
    }

    fn parse_unary_messages(&mut self, messages: &mut Vec<Message>) {
        while let Some(unary) = self.parse_unary_message() {
            messages.push(Message::Unary(unary));
        }
    }

    fn parse_unary_message(&mut self) -> Option<UnaryMessage> {
        if !self.at_selector(|k| k == TokenKind::Identifier) {
            return None;
        }
        let env = self.parse_env();
        let token = self.advance();
        let selector = Identifier::new(token.text().clone(), token.span());
        let span = env.map_or(token.span(), |e| e.span.merge(token.span()));
        Some(UnaryMessage {
            selector,
            env,
            span,
        })
    }

    fn parse_binary_messages(&mut self, messages: &mut Vec<Message>) {
        while let Some(binary) = self.parse_binary_message() {
            messages.push(Message::Binary(binary));
        }
    }

    fn parse_binary_message(&mut self) -> Option<BinaryMessage> {
        if !self.at_selector(TokenKind::is_binary_operator) {
            return None;
        }
        let env = self.parse_env();
        let (selector, selector_span) = self.parse_binary_selector();
        let argument = self.parse_binary_argument();
        let start = env.map_or(selector_span, |e| e.span);
        Some(BinaryMessage {
            selector,
            selector_span,
            span: start.merge(argument.span),
            argument: Box::new(argument),
            env,
        })
    }

    /// Consumes a binary selector, gluing adjacent `<`, `>` and operator
    /// tokens (`>>`, `<<`, `~>`). `-` and `|` always stand alone.
    pub(super) fn parse_binary_selector(&mut self) -> (EcoString, Span) {
        let first = self.advance();
        let mut selector = first.text().clone();
        let mut span = first.span();
        let glues = |kind: TokenKind| {
            matches!(
                kind,
                TokenKind::BinarySelector | TokenKind::LessThan | TokenKind::GreaterThan
            )
        };
        if glues(first.kind()) {
            let mut last = first;
            while glues(self.current_kind()) && last.is_adjacent_to(self.current_token()) {
                last = self.advance();
                selector.push_str(last.text());
                span = span.merge(last.span());
            }
        }
        (selector, span)
    }

    fn parse_keyword_message(&mut self) -> Option<KeywordMessage> {
        if !self.at_selector(|k| k == TokenKind::Keyword) {
            return None;
        }
        let env = self.parse_env();
        let mut parts = Vec::new();
        let mut selector = EcoString::new();
        while self.check(TokenKind::Keyword) {
            let token = self.advance();
            selector.push_str(token.text());
            let keyword = Identifier::new(token.text().clone(), token.span());
            let value = self.parse_keyword_argument();
            parts.push(KeywordPart { keyword, value });
        }

        let first = parts.first().map(|p| p.keyword.span)?;
        let last = parts.last().map(|p| p.value.span)?;
        let start = env.map_or(first, |e| e.span);
        Some(KeywordMessage {
            parts,
            selector,
            env,
            span: start.merge(last),
        })
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    /// Parses a primary.
    ///
    /// Uses `stacker::maybe_grow` to extend the stack on the heap if
    /// remaining stack space falls below 32 KiB. Every nested construct
    /// passes through here, so this is also where the nesting guard lives.
    pub(super) fn parse_primary(&mut self) -> Primary {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            if !self.enter_nesting() {
                let token = self.advance();
                return Primary::Variable(Identifier::placeholder(token.span()));
            }
            let primary = self.parse_primary_inner();
            self.leave_nesting();
            primary
        })
    }

    fn parse_primary_inner(&mut self) -> Primary {
        if self.at_negative_number() {
            return Primary::Literal(self.parse_negative_number());
        }
        match self.current_kind() {
            TokenKind::Identifier => self.parse_variable_or_path(),
            TokenKind::ArrayOpen => Primary::Literal(self.parse_literal_array()),
            TokenKind::ByteArrayOpen => Primary::Literal(self.parse_byte_array()),
            TokenKind::LeftParen => self.parse_paren(),
            TokenKind::LeftBracket => Primary::Block(self.parse_block()),
            TokenKind::LeftBrace if self.peek_kind() == Some(TokenKind::Colon) => {
                self.parse_selection_block()
            }
            TokenKind::LeftBrace => Primary::CurlyArray(self.parse_curly_array()),
            TokenKind::Hash => {
                let token = self.advance();
                self.error_at("expected a literal after '#'", token.span());
                Primary::Variable(Identifier::placeholder(token.span()))
            }
            _ => {
                if let Some(literal) = self.parse_scalar_literal() {
                    return Primary::Literal(literal);
                }
                self.parse_missing_primary()
            }
        }
    }

    /// Reports a missing primary and synthesizes a placeholder.
    ///
    /// Closers, periods, semicolons and EOF are left for the enclosing
    /// construct; any other token is consumed.
    fn parse_missing_primary(&mut self) -> Primary {
        let token = self.current_token().clone();
        self.error(format!("expected expression, found {token}"));
        let keep = token.kind().is_closer()
            || matches!(
                token.kind(),
                TokenKind::Period | TokenKind::Semicolon | TokenKind::Eof
            );
        if keep {
            Primary::Variable(Identifier::placeholder(Span::at(token.span().start())))
        } else {
            self.advance();
            Primary::Variable(Identifier::placeholder(token.span()))
        }
    }

    /// Parses an identifier, or a dotted path when every dot is adjacent to
    /// the identifiers on both sides: `Globals.Foo.Bar`.
    fn parse_variable_or_path(&mut self) -> Primary {
        let first = self.advance();
        let mut segments = vec![Identifier::new(first.text().clone(), first.span())];
        let mut last = first;
        loop {
            let (Some(dot), Some(next)) = (self.peek_at(0), self.peek_at(1)) else {
                break;
            };
            let continues = dot.kind() == TokenKind::Period
                && next.kind() == TokenKind::Identifier
                && last.is_adjacent_to(dot)
                && dot.is_adjacent_to(next);
            if !continues {
                break;
            }
            self.advance(); // .
            last = self.advance();
            segments.push(Identifier::new(last.text().clone(), last.span()));
        }

        if segments.len() == 1 {
            return Primary::Variable(segments.remove(0));
        }
        let span = segments[0].span.merge(last.span());
        Primary::Path(Path { segments, span })
    }

    /// Parses `( statement )`.
    fn parse_paren(&mut self) -> Primary {
        let open = self.advance();
        let inner = self.parse_statement();
        let end = match self.expect(TokenKind::RightParen, "expected ')'") {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        Primary::Paren(ParenExpression {
            expression: Box::new(inner),
            span: open.span().merge(end),
        })
    }

    /// Parses `[:a :b | | t | statements]`.
    fn parse_block(&mut self) -> Block {
        let open = self.advance();

        let mut parameters = Vec::new();
        while self.check(TokenKind::Colon) {
            let colon = self.advance();
            if self.check(TokenKind::Identifier) {
                let name = self.advance();
                parameters.push(Identifier::new(name.text().clone(), name.span()));
            } else {
                self.error("expected block parameter name after ':'");
                parameters.push(Identifier::placeholder(Span::at(colon.span().end())));
            }
        }
        if !parameters.is_empty() && !self.match_token(TokenKind::Pipe) {
            // `[:a]` is tolerated only when the block ends right away
            if !self.check(TokenKind::RightBracket) {
                self.error("expected '|' after block parameters");
            }
        }

        let (temporaries, temporaries_span) = self.parse_temporaries();
        let statements = self.parse_statements(Some(TokenKind::RightBracket));

        let end = match self.expect(TokenKind::RightBracket, "expected ']' to close block") {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        Block {
            parameters,
            temporaries,
            temporaries_span,
            statements,
            span: open.span().merge(end),
        }
    }

    /// Parses `{:e | predicate}`.
    fn parse_selection_block(&mut self) -> Primary {
        let open = self.advance(); // {
        let colon = self.advance(); // :
        let parameter = if self.check(TokenKind::Identifier) {
            let name = self.advance();
            Identifier::new(name.text().clone(), name.span())
        } else {
            self.error("expected selection block parameter name after ':'");
            Identifier::placeholder(Span::at(colon.span().end()))
        };
        self.expect(TokenKind::Pipe, "expected '|' after selection block parameter");
        let predicate = self.parse_expression();
        let end = match self.expect(TokenKind::RightBrace, "expected '}' to close selection block")
        {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        Primary::SelectionBlock(SelectionBlock {
            parameter,
            predicate: Box::new(predicate),
            span: open.span().merge(end),
        })
    }

    /// Parses `{expr. expr. expr}`.
    fn parse_curly_array(&mut self) -> CurlyArrayBuilder {
        let open = self.advance();
        let expressions = self.parse_statements(Some(TokenKind::RightBrace));
        let end = match self.expect(TokenKind::RightBrace, "expected '}' to close array builder")
        {
            Some(close) => close.span(),
            None => self.previous_span(),
        };
        CurlyArrayBuilder {
            expressions,
            span: open.span().merge(end),
        }
    }
}
