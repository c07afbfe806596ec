// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for GemStone Smalltalk methods.
//!
//! This parser builds an AST from a stream of tokens. It is designed
//! for IDE use with comprehensive error recovery and diagnostics.
//!
//! # Design Philosophy
//!
//! - **Error recovery is mandatory** - Parser always produces a best-effort AST
//! - **Multiple errors** - Report all errors, don't stop at first
//! - **Precise spans** - Every diagnostic points to exact source location
//! - **Placeholders** - Missing names become [`Identifier::placeholder`]
//!
//! # Message Precedence
//!
//! Smalltalk has three fixed precedence tiers and no operator precedence:
//!
//! 1. **Unary messages**: `object message` (highest precedence)
//! 2. **Binary messages**: `3 + 4 * 2` is `(3 + 4) * 2`; each argument is a
//!    primary followed by unary messages only
//! 3. **Keyword messages**: `array at: 1 put: 'x'` (lowest precedence); each
//!    argument is a primary followed by unary then binary messages
//!
//! Cascades (`;`) add one message per segment, sent to the receiver of the
//! last message before the first `;`.
//!
//! # Usage
//!
//! ```
//! use gemstone_core::source_analysis::{parse, tokenize};
//!
//! let (method, diagnostics) = parse(tokenize("at: index put: value ^self"));
//! assert!(diagnostics.is_empty());
//! assert_eq!(method.unwrap().selector(), "at:put:");
//! ```
//!
//! [`Identifier::placeholder`]: crate::ast::Identifier::placeholder

use crate::ast::{Method, MethodBody, Statement};
use crate::source_analysis::{Span, Token, TokenKind};
use ecow::EcoString;

// Submodules with additional impl blocks for Parser
mod declarations;
mod expressions;
mod literals;

#[cfg(test)]
mod property_tests;

/// Parses a token stream as one method.
///
/// Returns `None` only when the stream holds nothing but trivia. Otherwise a
/// best-effort [`Method`] is always produced; check the diagnostics for
/// errors.
///
/// # Examples
///
/// ```
/// use gemstone_core::source_analysis::{parse, tokenize};
///
/// let (method, diagnostics) = parse(tokenize("foo ^self size"));
/// assert!(diagnostics.is_empty());
/// assert_eq!(method.unwrap().body.statements.len(), 1);
///
/// let (method, _) = parse(tokenize("  \"only a comment\"  "));
/// assert!(method.is_none());
/// ```
#[must_use]
pub fn parse(tokens: Vec<Token>) -> (Option<Method>, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens);
    if parser.is_at_end() {
        return (None, parser.diagnostics);
    }
    let method = parser.parse_method();
    (Some(method), parser.diagnostics)
}

/// Parses a token stream as a bare statement list (temporaries allowed).
///
/// Used for Topaz `run`/`doit`/`printit` blocks and class definitions.
#[must_use]
pub fn parse_code(tokens: Vec<Token>) -> (MethodBody, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens);
    let body = parser.parse_code_body();
    (body, parser.diagnostics)
}

/// A diagnostic message (error, warning, or hint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The error message.
    pub message: EcoString,
    /// The source location.
    pub span: Span,
    /// Optional hint for how to fix the issue.
    pub hint: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Creates a new hint diagnostic (informational, lower severity than warning).
    #[must_use]
    pub fn hint(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Hint,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Attaches a fix-it hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Returns true for error-severity diagnostics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// A syntax error; the region is not formatted or indexed.
    Error,
    /// A warning that should be addressed.
    Warning,
    /// A hint or informational note.
    Hint,
}

/// Maximum nesting depth for primaries before the parser bails out.
///
/// Prevents stack overflow on deeply nested input (e.g., `(((((...)))))`).
/// Each nesting level uses several stack frames through the parser call
/// chain, and ASAN-instrumented builds (fuzzing) have larger frames.
///
/// As a second line of defence, `stacker::maybe_grow` is used at the
/// recursive entry point so the stack is extended on the heap if needed.
const MAX_NESTING_DEPTH: usize = 64;

/// The parser state.
pub(super) struct Parser {
    /// The non-trivia tokens being parsed, ending with EOF.
    pub(super) tokens: Vec<Token>,
    /// Current token index.
    pub(super) current: usize,
    /// Accumulated diagnostics.
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Current primary nesting depth (guards against stack overflow).
    nesting_depth: usize,
}

impl Parser {
    /// Creates a new parser, reporting lexical problems up front.
    ///
    /// Whitespace and comments are dropped. Error tokens are reported and
    /// dropped so the grammar never sees them.
    fn new(tokens: Vec<Token>) -> Self {
        let mut diagnostics = Vec::new();
        let mut kept = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(diagnostic) = literals::lexical_diagnostic(&token) {
                diagnostics.push(diagnostic);
            }
            match token.kind() {
                TokenKind::Whitespace | TokenKind::Comment | TokenKind::Error => {}
                _ => kept.push(token),
            }
        }
        if kept.last().is_none_or(|t| t.kind() != TokenKind::Eof) {
            let span = kept.last().map_or_else(Span::default, |t| Span::at(t.span().end()));
            kept.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens: kept,
            current: 0,
            diagnostics,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    ///
    /// `new` guarantees a trailing EOF and `advance` never moves past it.
    pub(super) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> TokenKind {
        self.current_token().kind()
    }

    /// Returns the span of the current token.
    pub(super) fn current_span(&self) -> Span {
        self.current_token().span()
    }

    /// Peeks `n` tokens past the current one.
    pub(super) fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    /// Peeks at the next token kind.
    pub(super) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_at(1).map(Token::kind)
    }

    /// Returns the span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        if self.current == 0 {
            Span::at(self.current_span().start())
        } else {
            self.tokens[self.current - 1].span()
        }
    }

    /// Checks if we're at the end of input.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Advances to the next token and returns the consumed one.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Checks if the current token matches the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it matches the given kind.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind, advancing if it does.
    ///
    /// If the token doesn't match, reports an error and returns `None`.
    pub(super) fn expect(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            let found = self.current_token().to_string();
            let span = self.current_span();
            self.diagnostics
                .push(Diagnostic::error(format!("{message}, found {found}"), span));
            None
        }
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Reports an error at the current token.
    pub(super) fn error(&mut self, message: impl Into<EcoString>) {
        let span = self.current_span();
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    /// Reports an error at `span`.
    pub(super) fn error_at(&mut self, message: impl Into<EcoString>, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    /// Increments the nesting depth, reporting an error when it exceeds
    /// [`MAX_NESTING_DEPTH`]. Call [`Self::leave_nesting`] on every exit
    /// path when this returns `true`.
    pub(super) fn enter_nesting(&mut self) -> bool {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            self.error(format!(
                "expression nesting is too deep (maximum {MAX_NESTING_DEPTH} levels)"
            ));
            return false;
        }
        self.nesting_depth += 1;
        true
    }

    /// Decrements the nesting depth (pair with [`Self::enter_nesting`]).
    pub(super) fn leave_nesting(&mut self) {
        debug_assert!(
            self.nesting_depth > 0,
            "leave_nesting called without matching enter_nesting"
        );
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    // ========================================================================
    // Statement Lists
    // ========================================================================

    /// Parses period-separated statements until EOF or `closer`.
    ///
    /// Extra periods are skipped. A statement after a `^` return is reported
    /// once per list. A missing period is reported and parsing resumes with
    /// the next token. Stray closing delimiters that do not match `closer`
    /// are reported and skipped.
    pub(super) fn parse_statements(&mut self, closer: Option<TokenKind>) -> Vec<Statement> {
        let mut statements = Vec::new();
        let mut after_return = false;
        let mut reported_unreachable = false;

        loop {
            while self.match_token(TokenKind::Period) {}
            if self.is_at_end() || closer.is_some_and(|c| self.check(c)) {
                break;
            }
            if self.current_kind().is_closer() {
                let found = self.current_token().to_string();
                self.error(format!("unexpected {found}"));
                self.advance();
                continue;
            }

            let start = self.current;
            let statement = self.parse_statement();
            if self.current == start {
                // parse_primary already reported the token; skip it
                self.advance();
                continue;
            }

            if after_return && !reported_unreachable {
                self.error_at("statements after a return are unreachable", statement.span());
                reported_unreachable = true;
            }
            after_return |= matches!(statement, Statement::Return(_));
            statements.push(statement);

            if self.match_token(TokenKind::Period)
                || self.is_at_end()
                || self.current_kind().is_closer()
            {
                continue;
            }
            let found = self.current_token().to_string();
            self.error(format!("expected '.' between statements, found {found}"));
        }
        statements
    }
}

#[cfg(test)]
mod tests {
    //! Tests for the GemStone Smalltalk recursive descent parser.
    use super::*;
    use crate::ast::{
        Literal, Message, MessagePattern, NumberKind, Primary, Protection, SpecialLiteral,
    };
    use crate::source_analysis::tokenize;

    /// Helper to parse a method and check for errors.
    fn parse_ok(source: &str) -> Method {
        let (method, diagnostics) = parse(tokenize(source));
        assert!(diagnostics.is_empty(), "Expected no errors, got: {diagnostics:?}");
        method.expect("expected a method")
    }

    /// Helper to parse a method expecting errors.
    fn parse_err(source: &str) -> Vec<Diagnostic> {
        let (_method, diagnostics) = parse(tokenize(source));
        assert!(!diagnostics.is_empty(), "Expected errors for {source:?}");
        diagnostics
    }

    /// Parses `foo <statement>` and returns the single statement.
    fn statement(source: &str) -> Statement {
        let mut method = parse_ok(&format!("foo {source}"));
        assert_eq!(method.body.statements.len(), 1, "{source}");
        method.body.statements.remove(0)
    }

    /// Parses `foo <expression>` and returns the expression.
    fn expression(source: &str) -> crate::ast::Expression {
        match statement(source) {
            Statement::Expression(expr) => expr,
            other => panic!("Expected expression, got {other:?}"),
        }
    }

    fn selectors(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.selector().as_str()).collect()
    }

    // --- Patterns ---

    #[test]
    fn parse_unary_method_with_return() {
        let method = parse_ok("foo ^self size");
        match &method.pattern {
            MessagePattern::Unary(p) => assert_eq!(p.selector.name, "foo"),
            other => panic!("Expected unary pattern, got {other:?}"),
        }
        match &method.body.statements[0] {
            Statement::Return(ret) => match ret.expression.as_ref() {
                Statement::Expression(expr) => {
                    assert!(matches!(&expr.receiver, Primary::Variable(v) if v.name == "self"));
                    assert_eq!(selectors(&expr.messages), vec!["size"]);
                }
                other => panic!("Expected expression, got {other:?}"),
            },
            other => panic!("Expected return, got {other:?}"),
        }
    }

    #[test]
    fn parse_keyword_pattern() {
        let method = parse_ok("at: index put: value ^self");
        match &method.pattern {
            MessagePattern::Keyword(p) => {
                assert_eq!(p.selector, "at:put:");
                let names: Vec<_> = p.parameters.iter().map(|i| i.name.as_str()).collect();
                assert_eq!(names, vec!["index", "value"]);
            }
            other => panic!("Expected keyword pattern, got {other:?}"),
        }
    }

    #[test]
    fn parse_binary_patterns() {
        for (source, selector) in [
            ("+ other ^self", "+"),
            ("- other ^self", "-"),
            ("< other ^self", "<"),
            ("<= other ^self", "<="),
            (">> other ^self", ">>"),
            ("| other ^self", "|"),
            ("-> other ^self", "->"),
        ] {
            let method = parse_ok(source);
            match &method.pattern {
                MessagePattern::Binary(p) => {
                    assert_eq!(p.selector, selector, "{source}");
                    assert_eq!(p.parameter.name, "other");
                }
                other => panic!("Expected binary pattern for {source}, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_pattern_reports_error() {
        let diagnostics = parse_err("^3");
        assert!(diagnostics[0].message.contains("expected method pattern"));
    }

    #[test]
    fn keyword_pattern_missing_argument() {
        let (method, diagnostics) = parse(tokenize("at: ^self"));
        assert!(diagnostics[0].message.contains("expected argument name"));
        let method = method.unwrap();
        assert!(method.pattern.parameters()[0].is_placeholder());
    }

    #[test]
    fn empty_input_has_no_method() {
        let (method, diagnostics) = parse(tokenize("  \n\"comment\"\n"));
        assert!(method.is_none());
        assert!(diagnostics.is_empty());
    }

    // --- Primitives, pragmas, temporaries ---

    #[test]
    fn parse_primitive_declarations() {
        let method = parse_ok("size <primitive: 62> ^self error");
        let primitive = method.primitive.unwrap();
        assert_eq!(primitive.number, Some(62));
        assert_eq!(primitive.protection, None);

        let method = parse_ok("at: i <protected primitive: 33> ^nil");
        let primitive = method.primitive.unwrap();
        assert_eq!(primitive.protection, Some(Protection::Protected));
        assert_eq!(primitive.number, Some(33));

        let method = parse_ok("foo <unprotected primitive: 1> ^nil");
        assert_eq!(
            method.primitive.unwrap().protection,
            Some(Protection::Unprotected)
        );

        let method = parse_ok("foo <protected> ^nil");
        let primitive = method.primitive.unwrap();
        assert_eq!(primitive.protection, Some(Protection::Protected));
        assert_eq!(primitive.number, None);
    }

    #[test]
    fn non_primitive_angle_falls_back_to_pragma() {
        let method = parse_ok("foo <category: 'accessing'> <inline> ^1");
        assert!(method.primitive.is_none());
        assert_eq!(method.body.pragmas.len(), 2);
        assert_eq!(method.body.pragmas[0].selector(), "category:");
        assert_eq!(method.body.pragmas[1].selector(), "inline");
    }

    #[test]
    fn protected_identifier_pragma_is_not_primitive() {
        let method = parse_ok("foo <protectedMode: true> ^1");
        assert!(method.primitive.is_none());
        assert_eq!(method.body.pragmas[0].selector(), "protectedMode:");
    }

    #[test]
    fn primitive_number_must_be_integer() {
        let diagnostics = parse_err("foo <primitive: abc> ^1");
        assert!(diagnostics[0].message.contains("primitive number"));
    }

    #[test]
    fn unclosed_pragma_reports_error() {
        let diagnostics = parse_err("foo <category: 'x' ^1");
        assert!(diagnostics[0].message.contains("'>'"));
    }

    #[test]
    fn parse_temporaries() {
        let method = parse_ok("foo | a b c | a := 1. ^a");
        let names: Vec<_> = method.body.temporaries.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(method.body.temporaries_span.is_some());
        assert_eq!(method.body.statements.len(), 2);
    }

    #[test]
    fn empty_temporaries() {
        let method = parse_ok("foo || ^1");
        assert!(method.body.temporaries.is_empty());
        assert!(method.body.temporaries_span.is_some());
    }

    #[test]
    fn pragma_after_temporaries() {
        let method = parse_ok("foo | a | <category: 'x'> ^a");
        assert_eq!(method.body.temporaries.len(), 1);
        assert_eq!(method.body.pragmas.len(), 1);
    }

    // --- Statements ---

    #[test]
    fn parse_chained_assignment() {
        match statement("a := b := 3") {
            Statement::Assignment(outer) => {
                assert_eq!(outer.variable.name, "a");
                match outer.value.as_ref() {
                    Statement::Assignment(inner) => assert_eq!(inner.variable.name, "b"),
                    other => panic!("Expected nested assignment, got {other:?}"),
                }
            }
            other => panic!("Expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn parse_legacy_underscore_assignment() {
        assert!(matches!(statement("a _ 3"), Statement::Assignment(_)));
    }

    #[test]
    fn return_of_assignment() {
        match statement("^a := 3") {
            Statement::Return(ret) => {
                assert!(matches!(ret.expression.as_ref(), Statement::Assignment(_)));
            }
            other => panic!("Expected return, got {other:?}"),
        }
    }

    #[test]
    fn statements_after_return_are_reported() {
        let diagnostics = parse_err("foo ^1. 2. 3");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unreachable"));
    }

    #[test]
    fn missing_period_between_statements() {
        let (method, diagnostics) = parse(tokenize("foo x := 3 ^x"));
        assert!(diagnostics[0].message.contains("expected '.'"));
        // Both statements survive recovery
        assert_eq!(method.unwrap().body.statements.len(), 2);
    }

    #[test]
    fn extra_periods_are_skipped() {
        let method = parse_ok("foo . 1. . 2..");
        assert_eq!(method.body.statements.len(), 2);
    }

    #[test]
    fn stray_closer_is_reported_and_skipped() {
        let (method, diagnostics) = parse(tokenize("foo 1. ]. 2"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unexpected"));
        assert_eq!(method.unwrap().body.statements.len(), 2);
    }

    // --- Message precedence ---

    #[test]
    fn binary_messages_are_flat_left_to_right() {
        let expr = expression("a + b * c");
        assert!(matches!(&expr.receiver, Primary::Variable(v) if v.name == "a"));
        assert_eq!(selectors(&expr.messages), vec!["+", "*"]);
    }

    #[test]
    fn keyword_message_is_one_send() {
        let expr = expression("self at: 1 put: 2");
        assert_eq!(expr.messages.len(), 1);
        match &expr.messages[0] {
            Message::Keyword(k) => {
                assert_eq!(k.selector, "at:put:");
                assert_eq!(k.parts.len(), 2);
            }
            other => panic!("Expected keyword message, got {other:?}"),
        }
    }

    #[test]
    fn precedence_tiers() {
        let expr = expression("x foo bar + y baz - 1 at: z size + 2 put: 3");
        assert_eq!(selectors(&expr.messages), vec!["foo", "bar", "+", "-", "at:put:"]);
        match &expr.messages[2] {
            Message::Binary(b) => assert_eq!(selectors(&b.argument.messages), vec!["baz"]),
            other => panic!("Expected binary, got {other:?}"),
        }
        match &expr.messages[4] {
            Message::Keyword(k) => {
                assert_eq!(selectors(&k.parts[0].value.messages), vec!["size", "+"]);
            }
            other => panic!("Expected keyword, got {other:?}"),
        }
    }

    #[test]
    fn keyword_argument_cannot_hold_keyword_message() {
        let expr = expression("x at: y at: z");
        // One keyword message `at:at:`
        assert_eq!(selectors(&expr.messages), vec!["at:at:"]);
    }

    #[test]
    fn glued_angle_selectors() {
        let expr = expression("a >> b << c");
        assert_eq!(selectors(&expr.messages), vec![">>", "<<"]);
        let expr = expression("a < b");
        assert_eq!(selectors(&expr.messages), vec!["<"]);
    }

    #[test]
    fn pipe_and_minus_are_binary_operators() {
        let expr = expression("a | b - c");
        assert_eq!(selectors(&expr.messages), vec!["|", "-"]);
    }

    #[test]
    fn parse_cascade() {
        let expr = expression("Transcript show: 'a'; cr; show: 'b' , 'c'; yourself");
        assert_eq!(selectors(&expr.messages), vec!["show:"]);
        assert_eq!(selectors(&expr.cascades), vec!["cr", "show:", "yourself"]);
        match &expr.cascades[1] {
            Message::Keyword(k) => assert_eq!(selectors(&k.parts[0].value.messages), vec![","]),
            other => panic!("Expected keyword cascade, got {other:?}"),
        }
    }

    #[test]
    fn cascade_without_message_reports_error() {
        let diagnostics = parse_err("foo x bar; . 3");
        assert!(diagnostics[0].message.contains("cascade"));
    }

    #[test]
    fn env_specifiers() {
        let expr = expression("x @env1:foo @env2:+ 3 @env0:at: 1 put: 2");
        assert_eq!(selectors(&expr.messages), vec!["foo", "+", "at:put:"]);
        let envs: Vec<_> = expr.messages.iter().map(|m| m.env().map(|e| e.env)).collect();
        assert_eq!(envs, vec![Some(1), Some(2), Some(0)]);
    }

    // --- Primaries ---

    #[test]
    fn parse_path_only_when_adjacent() {
        let expr = expression("Globals.Foo.Bar new");
        match &expr.receiver {
            Primary::Path(path) => {
                let names: Vec<_> = path.segments.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["Globals", "Foo", "Bar"]);
            }
            other => panic!("Expected path, got {other:?}"),
        }
        let method = parse_ok("foo a. b");
        assert_eq!(method.body.statements.len(), 2);
    }

    #[test]
    fn parse_negative_number() {
        match statement("x := -5") {
            Statement::Assignment(a) => match a.value.as_ref() {
                Statement::Expression(e) => match &e.receiver {
                    Primary::Literal(l) => match &l.value {
                        Literal::Number(n) => {
                            assert_eq!(n.text, "-5");
                            assert_eq!(n.kind, NumberKind::Integer);
                        }
                        other => panic!("Expected number, got {other:?}"),
                    },
                    other => panic!("Expected literal, got {other:?}"),
                },
                other => panic!("Expected expression, got {other:?}"),
            },
            other => panic!("Expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn minus_with_space_is_binary() {
        let expr = expression("3 - 4");
        assert_eq!(selectors(&expr.messages), vec!["-"]);
        let expr = expression("3 - -4");
        assert_eq!(selectors(&expr.messages), vec!["-"]);
    }

    #[test]
    fn parse_block_with_params_and_temps() {
        let expr = expression("[:a :b | | t | t := a + b. t]");
        match &expr.receiver {
            Primary::Block(block) => {
                assert_eq!(block.parameters.len(), 2);
                assert_eq!(block.temporaries.len(), 1);
                assert_eq!(block.statements.len(), 2);
            }
            other => panic!("Expected block, got {other:?}"),
        }
    }

    #[test]
    fn parse_block_params_then_empty_temps() {
        let expr = expression("[:a || a]");
        match &expr.receiver {
            Primary::Block(block) => {
                assert_eq!(block.parameters.len(), 1);
                assert!(block.temporaries.is_empty());
                assert!(block.temporaries_span.is_some());
            }
            other => panic!("Expected block, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_block_reports_error() {
        let diagnostics = parse_err("foo [:a | a");
        assert!(diagnostics.iter().any(|d| d.message.contains("']'")));
    }

    #[test]
    fn parse_selection_block() {
        let expr = expression("people select: {:p | p.age > 30}");
        match &expr.messages[0] {
            Message::Keyword(k) => match &k.parts[0].value.receiver {
                Primary::SelectionBlock(sel) => {
                    assert_eq!(sel.parameter.name, "p");
                    assert!(matches!(&sel.predicate.receiver, Primary::Path(_)));
                }
                other => panic!("Expected selection block, got {other:?}"),
            },
            other => panic!("Expected keyword, got {other:?}"),
        }
    }

    #[test]
    fn parse_curly_array() {
        let expr = expression("{1. x foo. 3}");
        match &expr.receiver {
            Primary::CurlyArray(curly) => assert_eq!(curly.expressions.len(), 3),
            other => panic!("Expected curly array, got {other:?}"),
        }
    }

    #[test]
    fn parse_paren_assignment() {
        let expr = expression("(x := 3) + 1");
        match &expr.receiver {
            Primary::Paren(paren) => {
                assert!(matches!(paren.expression.as_ref(), Statement::Assignment(_)));
            }
            other => panic!("Expected paren, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_paren_reports_error() {
        let diagnostics = parse_err("foo (1 + 2");
        assert!(diagnostics[0].message.contains("')'"));
    }

    #[test]
    fn special_literals() {
        for (source, expected) in [
            ("true", SpecialLiteral::True),
            ("false", SpecialLiteral::False),
            ("nil", SpecialLiteral::Nil),
            ("_remoteNil", SpecialLiteral::RemoteNil),
        ] {
            match expression(source).receiver {
                Primary::Literal(l) => assert_eq!(l.value, Literal::Special(expected)),
                other => panic!("Expected literal, got {other:?}"),
            }
        }
    }

    #[test]
    fn unexpected_token_gets_placeholder() {
        let (method, diagnostics) = parse(tokenize("foo x := ."));
        assert!(diagnostics[0].message.contains("expected expression"));
        match &method.unwrap().body.statements[0] {
            Statement::Assignment(a) => match a.value.as_ref() {
                Statement::Expression(e) => {
                    assert!(matches!(&e.receiver, Primary::Variable(v) if v.is_placeholder()));
                }
                other => panic!("Expected expression, got {other:?}"),
            },
            other => panic!("Expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn lexical_errors_become_diagnostics() {
        let diagnostics = parse_err("foo ^1 ` 2");
        assert!(diagnostics[0].message.contains("unexpected character"));

        let diagnostics = parse_err("foo ^'abc");
        assert!(diagnostics[0].message.contains("unterminated string"));

        let diagnostics = parse_err("foo ^1 \"open comment");
        assert!(diagnostics[0].message.contains("unterminated comment"));
    }

    #[test]
    fn deeply_nested_input_does_not_overflow() {
        let source = format!("foo ^{}1{}", "(".repeat(500), ")".repeat(500));
        let (method, diagnostics) = parse(tokenize(&source));
        assert!(method.is_some());
        assert!(diagnostics.iter().any(|d| d.message.contains("too deep")));
    }

    // --- Spans ---

    #[test]
    fn spans_enclose_children() {
        let method = parse_ok("foo\n\t^self at: 1 put: [:x | x + 2]");
        let stmt = &method.body.statements[0];
        assert!(method.span.encloses(stmt.span()));
        let expr = stmt.innermost_expression().unwrap();
        assert!(stmt.span().encloses(expr.span));
        for message in &expr.messages {
            assert!(expr.span.encloses(message.span()));
        }
        assert_eq!(stmt.span().start().line, 1);
        assert_eq!(stmt.span().start().column, 1);
    }

    // --- Bare code ---

    #[test]
    fn parse_code_allows_temporaries_and_statements() {
        let (body, diagnostics) = parse_code(tokenize("| a | a := 3. a printString"));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(body.temporaries.len(), 1);
        assert_eq!(body.statements.len(), 2);
    }

    #[test]
    fn parse_code_empty() {
        let (body, diagnostics) = parse_code(tokenize("\n\n"));
        assert!(diagnostics.is_empty());
        assert!(body.statements.is_empty());
    }

    #[test]
    fn parse_code_keyword_first_statement_is_expression() {
        let (body, diagnostics) =
            parse_code(tokenize("Object subclass: 'Foo' instVarNames: #(a b)"));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(body.statements.len(), 1);
    }
}
