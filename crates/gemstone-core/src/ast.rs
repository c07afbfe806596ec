// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for GemStone Smalltalk methods.
//!
//! **DDD Context:** Source Analysis
//!
//! The AST represents one method (or one bare statement list) after parsing.
//! Every node carries a [`Span`] in whole-document coordinates, and every
//! node's span encloses the spans of its children.
//!
//! # Design Philosophy
//!
//! - **Closed variants** - Every node family is an enum; consumers match on it
//! - **All nodes have spans** - Required for hover, definition and folding
//! - **Error recovery** - Missing names become [`Identifier::placeholder`]
//!
//! # Message Sending
//!
//! An [`Expression`] is a primary receiver followed by messages in strict
//! precedence order:
//!
//! 1. **Unary messages**: `object size` (tightest, left-to-right)
//! 2. **Binary messages**: `3 + 4 * 2` (left-to-right, no operator precedence)
//! 3. **At most one keyword message**: `array at: 1 put: 'x'`
//!
//! Cascades (`;`) are further messages sent to the receiver of the last
//! message in [`Expression::messages`].
//!
//! # Example
//!
//! ```
//! use gemstone_core::ast::{Message, MessagePattern, Statement};
//! use gemstone_core::source_analysis::{parse, tokenize};
//!
//! let (method, diagnostics) = parse(tokenize("foo ^self size"));
//! assert!(diagnostics.is_empty());
//! let method = method.unwrap();
//! assert!(matches!(method.pattern, MessagePattern::Unary(_)));
//! match &method.body.statements[0] {
//!     Statement::Return(ret) => match ret.expression.as_ref() {
//!         Statement::Expression(expr) => {
//!             assert!(matches!(&expr.messages[0], Message::Unary(m) if m.selector.name == "size"));
//!         }
//!         other => panic!("expected expression, got {other:?}"),
//!     },
//!     other => panic!("expected return, got {other:?}"),
//! }
//! ```

use crate::source_analysis::Span;
use ecow::EcoString;

// ============================================================================
// Methods
// ============================================================================

/// A parsed method: pattern, optional primitive declaration and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// The message pattern naming the method and its arguments.
    pub pattern: MessagePattern,
    /// `<primitive: N>` and friends, when present.
    pub primitive: Option<Primitive>,
    /// Pragmas, temporaries and statements.
    pub body: MethodBody,
    /// Source location of the whole method.
    pub span: Span,
}

impl Method {
    /// Returns the method's selector, e.g. `at:put:`.
    #[must_use]
    pub fn selector(&self) -> &EcoString {
        self.pattern.selector()
    }
}

/// The message pattern at the head of a method.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePattern {
    /// `size`
    Unary(UnaryPattern),
    /// `+ other`
    Binary(BinaryPattern),
    /// `at: index put: value`
    Keyword(KeywordPattern),
}

impl MessagePattern {
    /// Returns the selector this pattern declares.
    #[must_use]
    pub fn selector(&self) -> &EcoString {
        match self {
            Self::Unary(p) => &p.selector.name,
            Self::Binary(p) => &p.selector,
            Self::Keyword(p) => &p.selector,
        }
    }

    /// Returns the declared argument names in order.
    #[must_use]
    pub fn parameters(&self) -> &[Identifier] {
        match self {
            Self::Unary(_) => &[],
            Self::Binary(p) => std::slice::from_ref(&p.parameter),
            Self::Keyword(p) => &p.parameters,
        }
    }

    /// Returns the source span of the pattern.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Unary(p) => p.span,
            Self::Binary(p) => p.span,
            Self::Keyword(p) => p.span,
        }
    }
}

/// A unary method pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryPattern {
    /// The selector name.
    pub selector: Identifier,
    /// Source location.
    pub span: Span,
}

/// A binary method pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPattern {
    /// The operator, e.g. `+` or `->`.
    pub selector: EcoString,
    /// Location of the operator itself.
    pub selector_span: Span,
    /// The single argument.
    pub parameter: Identifier,
    /// Source location.
    pub span: Span,
}

/// A keyword method pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordPattern {
    /// Keyword parts in source order, each ending in `:`.
    pub keywords: Vec<Identifier>,
    /// One argument per keyword.
    pub parameters: Vec<Identifier>,
    /// The keywords concatenated: `at:put:`.
    pub selector: EcoString,
    /// Source location.
    pub span: Span,
}

/// Primitive protection marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protection {
    /// `<protected primitive: N>`
    Protected,
    /// `<unprotected primitive: N>`
    Unprotected,
}

impl Protection {
    /// Returns the source keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Unprotected => "unprotected",
        }
    }
}

/// A primitive declaration such as `<primitive: 60>` or `<protected>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    /// Protection marker, when present.
    pub protection: Option<Protection>,
    /// The primitive number; absent for a bare `<protected>`.
    pub number: Option<u32>,
    /// Source location including the angle brackets.
    pub span: Span,
}

/// A method body: pragmas, temporaries and statements.
///
/// Also used on its own for bare code regions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// `<category: 'x'>` style annotations.
    pub pragmas: Vec<Pragma>,
    /// Temporary variable names declared between `|` bars.
    pub temporaries: Vec<Identifier>,
    /// Location of the `| ... |` declaration, when present.
    pub temporaries_span: Option<Span>,
    /// The statements in order.
    pub statements: Vec<Statement>,
    /// Source location of the body.
    pub span: Span,
}

// ============================================================================
// Pragmas
// ============================================================================

/// A method pragma.
#[derive(Debug, Clone, PartialEq)]
pub enum Pragma {
    /// `<foo>`
    Unary {
        /// The pragma name.
        selector: Identifier,
        /// Source location including the angle brackets.
        span: Span,
    },
    /// `<category: 'accessing'>`
    Keyword {
        /// Keyword/literal pairs in order.
        pairs: Vec<PragmaPair>,
        /// Source location including the angle brackets.
        span: Span,
    },
}

impl Pragma {
    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Unary { span, .. } | Self::Keyword { span, .. } => *span,
        }
    }

    /// Returns the pragma selector, e.g. `category:`.
    #[must_use]
    pub fn selector(&self) -> EcoString {
        match self {
            Self::Unary { selector, .. } => selector.name.clone(),
            Self::Keyword { pairs, .. } => {
                let mut selector = EcoString::new();
                for pair in pairs {
                    selector.push_str(&pair.keyword.name);
                }
                selector
            }
        }
    }
}

/// One `keyword: literal` pair of a keyword pragma.
#[derive(Debug, Clone, PartialEq)]
pub struct PragmaPair {
    /// The keyword including its colon.
    pub keyword: Identifier,
    /// The literal argument.
    pub literal: LiteralNode,
}

// ============================================================================
// Statements
// ============================================================================

/// A statement in a method body or block.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `x := expr` (or the legacy `x _ expr`)
    Assignment(Assignment),
    /// `^expr`
    Return(Return),
    /// A bare expression.
    Expression(Expression),
}

impl Statement {
    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Assignment(a) => a.span,
            Self::Return(r) => r.span,
            Self::Expression(e) => e.span,
        }
    }

    /// Returns the expression at the bottom of any assignment chain.
    #[must_use]
    pub fn innermost_expression(&self) -> Option<&Expression> {
        match self {
            Self::Assignment(a) => a.value.innermost_expression(),
            Self::Return(r) => r.expression.innermost_expression(),
            Self::Expression(e) => Some(e),
        }
    }
}

/// An assignment. Chains nest through `value`: `a := b := 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// The assigned variable.
    pub variable: Identifier,
    /// The assigned value.
    pub value: Box<Statement>,
    /// Source location.
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    /// The returned value (an expression or an assignment).
    pub expression: Box<Statement>,
    /// Source location including the caret.
    pub span: Span,
}

// ============================================================================
// Expressions and messages
// ============================================================================

/// A receiver followed by messages and cascades.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The primary receiver.
    pub receiver: Primary,
    /// Unary messages, then binary messages, then at most one keyword message.
    pub messages: Vec<Message>,
    /// Cascaded messages (`; foo`), sent to the receiver of the last message.
    pub cascades: Vec<Message>,
    /// Source location.
    pub span: Span,
}

impl Expression {
    /// Wraps a primary with no messages.
    #[must_use]
    pub fn primary(receiver: Primary) -> Self {
        let span = receiver.span();
        Self {
            receiver,
            messages: Vec::new(),
            cascades: Vec::new(),
            span,
        }
    }

    /// Returns true if this is a bare primary with no messages.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.messages.is_empty() && self.cascades.is_empty()
    }

    /// Returns the trailing keyword message, if any.
    #[must_use]
    pub fn keyword_message(&self) -> Option<&KeywordMessage> {
        match self.messages.last() {
            Some(Message::Keyword(k)) => Some(k),
            _ => None,
        }
    }
}

/// A message send.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// `foo`
    Unary(UnaryMessage),
    /// `+ 3`
    Binary(BinaryMessage),
    /// `at: 1 put: 2`
    Keyword(KeywordMessage),
}

impl Message {
    /// Returns the message selector.
    #[must_use]
    pub fn selector(&self) -> &EcoString {
        match self {
            Self::Unary(m) => &m.selector.name,
            Self::Binary(m) => &m.selector,
            Self::Keyword(m) => &m.selector,
        }
    }

    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Unary(m) => m.span,
            Self::Binary(m) => m.span,
            Self::Keyword(m) => m.span,
        }
    }

    /// Returns the environment specifier, if any.
    #[must_use]
    pub const fn env(&self) -> Option<EnvSpecifier> {
        match self {
            Self::Unary(m) => m.env,
            Self::Binary(m) => m.env,
            Self::Keyword(m) => m.env,
        }
    }
}

/// An `@envN:` prefix pinning a send to an execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvSpecifier {
    /// The environment number.
    pub env: u32,
    /// Source location.
    pub span: Span,
}

/// A unary message.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryMessage {
    /// The selector.
    pub selector: Identifier,
    /// Environment specifier, when present.
    pub env: Option<EnvSpecifier>,
    /// Source location.
    pub span: Span,
}

/// A binary message.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMessage {
    /// The operator.
    pub selector: EcoString,
    /// Location of the operator.
    pub selector_span: Span,
    /// The argument: a primary with unary messages only.
    pub argument: Box<Expression>,
    /// Environment specifier, when present.
    pub env: Option<EnvSpecifier>,
    /// Source location.
    pub span: Span,
}

/// A keyword message.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMessage {
    /// Keyword/argument pairs in order.
    pub parts: Vec<KeywordPart>,
    /// The keywords concatenated.
    pub selector: EcoString,
    /// Environment specifier, when present.
    pub env: Option<EnvSpecifier>,
    /// Source location.
    pub span: Span,
}

/// One keyword/argument pair.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordPart {
    /// The keyword including its colon.
    pub keyword: Identifier,
    /// The argument: a primary with unary and binary messages.
    pub value: Expression,
}

// ============================================================================
// Primaries
// ============================================================================

/// A primary: the receiver position of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// A variable reference.
    Variable(Identifier),
    /// A dotted global path: `Globals.Foo`.
    Path(Path),
    /// A block literal.
    Block(Block),
    /// A selection block: `{:e | e.age > 30}`.
    SelectionBlock(SelectionBlock),
    /// A parenthesized statement.
    Paren(ParenExpression),
    /// A curly-brace array builder: `{1. 2. x}`.
    CurlyArray(CurlyArrayBuilder),
    /// A literal.
    Literal(LiteralNode),
}

impl Primary {
    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Variable(i) => i.span,
            Self::Path(p) => p.span,
            Self::Block(b) => b.span,
            Self::SelectionBlock(b) => b.span,
            Self::Paren(p) => p.span,
            Self::CurlyArray(c) => c.span,
            Self::Literal(l) => l.span,
        }
    }
}

/// A dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// The identifiers between the dots.
    pub segments: Vec<Identifier>,
    /// Source location.
    pub span: Span,
}

/// A block literal: `[:a :b | | t | a + b]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block parameters (without the leading colon).
    pub parameters: Vec<Identifier>,
    /// Block temporaries.
    pub temporaries: Vec<Identifier>,
    /// Location of the `| ... |` declaration, when present.
    pub temporaries_span: Option<Span>,
    /// The statements in order.
    pub statements: Vec<Statement>,
    /// Source location including the brackets.
    pub span: Span,
}

/// A selection block: a single parameter and a predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionBlock {
    /// The element parameter.
    pub parameter: Identifier,
    /// The predicate.
    pub predicate: Box<Expression>,
    /// Source location including the braces.
    pub span: Span,
}

/// A parenthesized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpression {
    /// The enclosed statement (an expression or an assignment).
    pub expression: Box<Statement>,
    /// Source location including the parentheses.
    pub span: Span,
}

/// A curly-brace array builder.
#[derive(Debug, Clone, PartialEq)]
pub struct CurlyArrayBuilder {
    /// The element statements.
    pub expressions: Vec<Statement>,
    /// Source location including the braces.
    pub span: Span,
}

// ============================================================================
// Literals
// ============================================================================

/// A literal value with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    /// The literal value.
    pub value: Literal,
    /// Source location.
    pub span: Span,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A number, kept as source text.
    Number(NumberLiteral),
    /// A string with `''` escapes resolved.
    String(EcoString),
    /// A symbol without the leading `#` (and without quotes).
    Symbol(EcoString),
    /// A character.
    Character(char),
    /// `true`, `false`, `nil` or `_remoteNil`.
    Special(SpecialLiteral),
    /// A literal array: `#(1 $a foo)`.
    Array(Vec<LiteralNode>),
    /// A byte array: `#[1 2 255]`.
    ByteArray(Vec<u8>),
}

/// A number literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
    /// Source text, including any leading minus.
    pub text: EcoString,
    /// Number class.
    pub kind: NumberKind,
}

/// Number literal classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// Integers, including radix integers.
    Integer,
    /// Floats and fixed-point numbers.
    Float,
    /// Scaled decimals: `3.14s2`.
    ScaledDecimal,
}

/// Special literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialLiteral {
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,
    /// `_remoteNil`
    RemoteNil,
}

impl SpecialLiteral {
    /// Parses a special literal name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "nil" => Some(Self::Nil),
            "_remoteNil" => Some(Self::RemoteNil),
            _ => None,
        }
    }

    /// Returns the source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Nil => "nil",
            Self::RemoteNil => "_remoteNil",
        }
    }
}

/// An identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// The name. Keyword identifiers include the trailing colon.
    pub name: EcoString,
    /// Source location.
    pub span: Span,
}

impl Identifier {
    /// Name given to identifiers synthesized during error recovery.
    pub const PLACEHOLDER: &'static str = "<unknown>";

    /// Creates a new identifier.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Creates an error-recovery placeholder at `span`.
    #[must_use]
    pub fn placeholder(span: Span) -> Self {
        Self::new(Self::PLACEHOLDER, span)
    }

    /// Returns true for error-recovery placeholders.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name == Self::PLACEHOLDER
    }
}
