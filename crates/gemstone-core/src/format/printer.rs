// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST to layout document.
//!
//! **DDD Context:** Formatting
//!
//! The printer re-emits a region from its AST. Literals, paths and
//! statements that carry comments are copied from the region text so their
//! spelling survives; everything else is rebuilt under the active
//! [`FormatterSettings`].

use crate::ast::{
    Block, BinaryMessage, EnvSpecifier, Expression, Identifier, KeywordMessage, KeywordPart,
    Message, MessagePattern, Method, MethodBody, Pragma, Primary, Primitive, Statement,
};
use crate::docvec;
use crate::document::ParsedRegion;
use crate::source_analysis::{Span, Token, TokenKind, is_binary_selector_char};

use super::FormatterSettings;
use super::blocks::{BlockTier, block_arguments, classify};
use super::document::{Document, concat, join, line, nest, nil};
use super::parens::{Slot, is_removable};

/// Widest cascade kept on one line inside parentheses.
const INLINE_CASCADE_WIDTH: usize = 80;

/// Lays out the statements of one region.
pub(crate) struct Printer<'a> {
    settings: &'a FormatterSettings,
    unit: String,
    continuation: String,
    /// The region parse text, starting at document offset `base`.
    code: &'a str,
    base: u32,
    /// Comment token spans in source order.
    comments: Vec<Span>,
}

/// A body split into lines, plus comments that precede the pattern.
struct BodyLayout<'a> {
    before_pattern: Vec<Document<'a>>,
    items: Vec<Document<'a>>,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(settings: &'a FormatterSettings, region: &'a ParsedRegion) -> Self {
        Self {
            settings,
            unit: settings.indent_unit(),
            continuation: settings.continuation(),
            code: &region.region.code,
            base: region.region.span.start().offset,
            comments: region
                .tokens
                .iter()
                .filter(|t| t.kind() == TokenKind::Comment)
                .map(Token::span)
                .collect(),
        }
    }

    fn slice(&self, start: u32, end: u32) -> &'a str {
        let end = (end.saturating_sub(self.base) as usize).min(self.code.len());
        let start = (start.saturating_sub(self.base) as usize).min(end);
        self.code.get(start..end).unwrap_or_default()
    }

    fn source(&self, span: Span) -> &'a str {
        self.slice(span.start().offset, span.end().offset)
    }

    // ========================================================================
    // Regions
    // ========================================================================

    /// Lays out a method with its pattern at column 0 and the body indented.
    ///
    /// Returns `None` when a comment sits where it cannot be kept in place
    /// (inside the pattern or between declarations).
    pub(crate) fn method(&'a self, method: &'a Method) -> Option<Document<'a>> {
        let layout = self.body(
            &method.body,
            Some(method.pattern.span()),
            method.primitive.as_ref(),
        )?;
        let mut doc = Vec::new();
        for comment in layout.before_pattern {
            doc.push(comment);
            doc.push(line());
        }
        doc.push(self.pattern(&method.pattern));
        if !layout.items.is_empty() {
            let blank = if self.settings.blank_line_after_pattern {
                line()
            } else {
                nil()
            };
            doc.push(nest(
                &self.unit,
                docvec![line(), blank, join(layout.items, &line())],
            ));
        }
        Some(Document::Vec(doc))
    }

    /// Lays out a Tonel method: `Class >> pattern [`, the indented body, `]`.
    pub(crate) fn tonel_method(
        &'a self,
        class_prefix: String,
        method: &'a Method,
    ) -> Option<Document<'a>> {
        let layout = self.body(
            &method.body,
            Some(method.pattern.span()),
            method.primitive.as_ref(),
        )?;
        if !layout.before_pattern.is_empty() {
            return None;
        }
        let body = if layout.items.is_empty() {
            nil()
        } else {
            nest(&self.unit, docvec![line(), join(layout.items, &line())])
        };
        Some(docvec![
            class_prefix,
            self.pattern(&method.pattern),
            " [",
            body,
            line(),
            "]"
        ])
    }

    /// Lays out a bare statement list at column 0.
    pub(crate) fn code(&'a self, body: &'a MethodBody) -> Option<Document<'a>> {
        let layout = self.body(body, None, None)?;
        Some(join(layout.items, &line()))
    }

    fn pattern(&'a self, pattern: &'a MessagePattern) -> Document<'a> {
        match pattern {
            MessagePattern::Unary(p) => Document::Str(p.selector.name.as_str()),
            MessagePattern::Binary(p) => {
                docvec![p.selector.as_str(), " ", p.parameter.name.as_str()]
            }
            MessagePattern::Keyword(p) => join(
                p.keywords
                    .iter()
                    .zip(&p.parameters)
                    .map(|(keyword, parameter)| {
                        docvec![keyword.name.as_str(), " ", parameter.name.as_str()]
                    }),
                &Document::Str(" "),
            ),
        }
    }

    fn body(
        &'a self,
        body: &'a MethodBody,
        pattern: Option<Span>,
        primitive: Option<&'a Primitive>,
    ) -> Option<BodyLayout<'a>> {
        let mut declarations: Vec<(Span, Option<Document<'a>>)> = Vec::new();
        if let Some(primitive) = primitive {
            declarations.push((primitive.span, Some(self.primitive(primitive))));
        }
        for pragma in &body.pragmas {
            declarations.push((pragma.span(), Some(self.pragma(pragma))));
        }
        if let Some(span) = body.temporaries_span {
            declarations.push((span, self.temporaries(&body.temporaries)));
        }
        let declared = declarations
            .iter()
            .map(|(span, _)| *span)
            .reduce(Span::merge);

        let mut before_pattern = Vec::new();
        let mut items = Vec::new();
        for &comment in &self.comments {
            let (start, end) = (comment.start().offset, comment.end().offset);
            if let Some(pattern) = pattern {
                if end <= pattern.start().offset {
                    before_pattern.push(Document::Str(self.source(comment)));
                    continue;
                }
                if start < pattern.end().offset {
                    return None;
                }
            }
            if let Some(declared) = declared {
                if end <= declared.start().offset {
                    items.push(Document::Str(self.source(comment)));
                    continue;
                }
                if start < declared.end().offset {
                    return None;
                }
            }
        }

        items.extend(declarations.into_iter().filter_map(|(_, doc)| doc));
        let start = declared
            .map(|span| span.end().offset)
            .or_else(|| pattern.map(|span| span.end().offset))
            .unwrap_or(self.base);
        self.statement_lines(&body.statements, start, &mut items);
        Some(BodyLayout {
            before_pattern,
            items,
        })
    }

    /// Appends one line per top-level statement and comment after `start`.
    ///
    /// A `Nil` item marks a preserved blank line.
    fn statement_lines(
        &'a self,
        statements: &'a [Statement],
        start: u32,
        items: &mut Vec<Document<'a>>,
    ) {
        let mut previous_end = start;
        for (index, statement) in statements.iter().enumerate() {
            let span = statement.span();
            self.comment_lines(previous_end, span.start().offset, items);

            let commented = self.comments.iter().any(|c| span.encloses(*c));
            let doc = if commented {
                Document::Str(self.source(span))
            } else {
                self.statement(statement)
            };
            let final_return =
                index + 1 == statements.len() && matches!(statement, Statement::Return(_));
            items.push(if final_return { doc } else { docvec![doc, "."] });
            previous_end = span.end().offset;
        }
        self.comment_lines(previous_end, u32::MAX, items);
    }

    /// Appends the comments lying between `from` and `to`, preceded by a
    /// blank line if the source had one.
    fn comment_lines(&'a self, from: u32, to: u32, items: &mut Vec<Document<'a>>) {
        let gap: Vec<Span> = self
            .comments
            .iter()
            .copied()
            .filter(|c| c.start().offset >= from && c.end().offset <= to)
            .collect();
        let next = gap.first().map_or(to, |c| c.start().offset);
        let has_next = !gap.is_empty() || to != u32::MAX;
        if has_next && !items.is_empty() && self.has_blank_line(from, next) {
            items.push(nil());
        }
        items.extend(gap.into_iter().map(|c| Document::Str(self.source(c))));
    }

    fn has_blank_line(&self, from: u32, to: u32) -> bool {
        self.slice(from, to).bytes().filter(|&b| b == b'\n').count() >= 2
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn primitive(&self, primitive: &Primitive) -> Document<'a> {
        let mut text = String::from("<");
        if let Some(protection) = primitive.protection {
            text.push_str(protection.as_str());
        }
        if let Some(number) = primitive.number {
            if primitive.protection.is_some() {
                text.push(' ');
            }
            text.push_str("primitive: ");
            text.push_str(&number.to_string());
        }
        text.push('>');
        Document::String(text)
    }

    fn pragma(&'a self, pragma: &'a Pragma) -> Document<'a> {
        match pragma {
            Pragma::Unary { selector, .. } => docvec!["<", selector.name.as_str(), ">"],
            Pragma::Keyword { pairs, .. } => docvec![
                "<",
                join(
                    pairs.iter().map(|pair| {
                        docvec![
                            pair.keyword.name.as_str(),
                            " ",
                            self.source(pair.literal.span)
                        ]
                    }),
                    &Document::Str(" "),
                ),
                ">"
            ],
        }
    }

    fn temporaries(&self, temporaries: &'a [Identifier]) -> Option<Document<'a>> {
        if temporaries.is_empty() {
            return None;
        }
        Some(docvec![
            "| ",
            join(
                temporaries.iter().map(|t| Document::Str(t.name.as_str())),
                &Document::Str(" ")
            ),
            " |"
        ])
    }

    // ========================================================================
    // Statements and expressions
    // ========================================================================

    fn statement(&'a self, statement: &'a Statement) -> Document<'a> {
        match statement {
            Statement::Assignment(assignment) => {
                let operator = if self.settings.spaces_around_assignment {
                    " := "
                } else {
                    ":="
                };
                docvec![
                    assignment.variable.name.as_str(),
                    operator,
                    self.statement(&assignment.value)
                ]
            }
            Statement::Return(ret) => {
                let caret = if self.settings.space_after_caret { "^ " } else { "^" };
                docvec![caret, self.statement(&ret.expression)]
            }
            Statement::Expression(expression) => self.expression(expression, Slot::Standalone),
        }
    }

    fn expression(&'a self, expression: &'a Expression, slot: Slot) -> Document<'a> {
        let receiver_slot = Slot::receiver_of(expression).unwrap_or(slot);
        let receiver = self.primary(&expression.receiver, receiver_slot);
        let Some((last, head)) = expression
            .messages
            .split_last()
            .filter(|_| !expression.cascades.is_empty())
        else {
            return self.messages(receiver, &expression.messages);
        };

        let mut parts = Vec::new();
        for (index, message) in std::iter::once(last)
            .chain(&expression.cascades)
            .enumerate()
        {
            if index > 0 {
                parts.push(Document::Str(";"));
            }
            parts.push(line());
            parts.push(self.cascade_message(message));
        }
        docvec![
            self.messages(receiver, head),
            nest(&self.continuation, Document::Vec(parts))
        ]
    }

    /// A cascade on one line, `a foo; bar`, when it fits.
    fn inline_cascade(&'a self, expression: &'a Expression, slot: Slot) -> Option<Document<'a>> {
        let (last, head) = expression
            .messages
            .split_last()
            .filter(|_| !expression.cascades.is_empty())?;
        let receiver_slot = Slot::receiver_of(expression).unwrap_or(slot);
        let receiver = self.primary(&expression.receiver, receiver_slot);
        let parts = std::iter::once(last)
            .chain(&expression.cascades)
            .map(|message| self.cascade_message(message));
        let doc = docvec![
            self.messages(receiver, head),
            " ",
            join(parts, &Document::Str("; "))
        ];
        (doc.is_single_line() && doc.to_pretty_string().len() <= INLINE_CASCADE_WIDTH)
            .then_some(doc)
    }

    fn messages(&'a self, receiver: Document<'a>, messages: &'a [Message]) -> Document<'a> {
        let mut doc = vec![receiver];
        for message in messages {
            match message {
                Message::Unary(unary) => {
                    doc.push(Document::Str(" "));
                    doc.push(env(unary.env));
                    doc.push(Document::Str(unary.selector.name.as_str()));
                }
                Message::Binary(binary) => {
                    let tight = !self.settings.spaces_around_binary_selectors
                        && !ends_with_selector_char(&doc);
                    doc.push(if tight { nil() } else { Document::Str(" ") });
                    doc.push(self.binary(binary));
                }
                Message::Keyword(keyword) => {
                    return self.keyword_send(Document::Vec(doc), keyword);
                }
            }
        }
        Document::Vec(doc)
    }

    /// The selector and argument of a binary send, without leading space.
    fn binary(&'a self, binary: &'a BinaryMessage) -> Document<'a> {
        let argument = self.expression(&binary.argument, Slot::BinaryArgument);
        let gap = if self.settings.spaces_around_binary_selectors
            || argument.to_pretty_string().starts_with('-')
        {
            " "
        } else {
            ""
        };
        docvec![env(binary.env), binary.selector.as_str(), gap, argument]
    }

    fn keyword_part(&'a self, part: &'a KeywordPart) -> Document<'a> {
        docvec![
            part.keyword.name.as_str(),
            " ",
            self.expression(&part.value, Slot::KeywordArgument)
        ]
    }

    fn inline_parts(&'a self, keyword: &'a KeywordMessage) -> Document<'a> {
        join(
            keyword.parts.iter().map(|part| self.keyword_part(part)),
            &Document::Str(" "),
        )
    }

    fn keyword_send(&'a self, head: Document<'a>, keyword: &'a KeywordMessage) -> Document<'a> {
        if let Some(blocks) = block_arguments(keyword) {
            let tier = classify(&blocks, |block| {
                self.inline_block(block)
                    .is_some_and(|doc| doc.is_single_line())
            });
            return match tier {
                BlockTier::Inline => {
                    docvec![head, " ", env(keyword.env), self.inline_parts(keyword)]
                }
                BlockTier::Stacked => docvec![head, self.stacked_parts(keyword)],
                BlockTier::Flow => {
                    let parts = keyword.parts.iter().zip(blocks).map(|(part, block)| {
                        docvec![part.keyword.name.as_str(), " ", self.flow_block(block)]
                    });
                    docvec![head, " ", env(keyword.env), join(parts, &Document::Str(" "))]
                }
            };
        }
        if keyword.parts.len() >= self.settings.multiline_keyword_threshold.max(1) {
            return docvec![head, self.stacked_parts(keyword)];
        }
        docvec![head, " ", env(keyword.env), self.inline_parts(keyword)]
    }

    /// One continuation line per keyword part.
    fn stacked_parts(&'a self, keyword: &'a KeywordMessage) -> Document<'a> {
        let lines = keyword.parts.iter().enumerate().map(|(index, part)| {
            let prefix = if index == 0 { env(keyword.env) } else { nil() };
            docvec![line(), prefix, self.keyword_part(part)]
        });
        nest(&self.continuation, concat(lines))
    }

    fn cascade_message(&'a self, message: &'a Message) -> Document<'a> {
        match message {
            Message::Unary(unary) => docvec![env(unary.env), unary.selector.name.as_str()],
            Message::Binary(binary) => self.binary(binary),
            Message::Keyword(keyword) => docvec![env(keyword.env), self.inline_parts(keyword)],
        }
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    fn primary(&'a self, primary: &'a Primary, slot: Slot) -> Document<'a> {
        match primary {
            Primary::Variable(identifier) => Document::Str(identifier.name.as_str()),
            Primary::Path(path) => Document::Str(self.source(path.span)),
            Primary::Literal(literal) => Document::Str(self.source(literal.span)),
            Primary::Block(block) => self.block(block),
            Primary::SelectionBlock(selection) => {
                let (open, close) = self.braces();
                docvec![
                    open,
                    ":",
                    selection.parameter.name.as_str(),
                    " | ",
                    self.expression(&selection.predicate, Slot::Standalone),
                    close
                ]
            }
            Primary::Paren(paren) => {
                if let Statement::Expression(inner) = paren.expression.as_ref() {
                    if self.settings.remove_unnecessary_parens
                        && is_removable(&paren.expression, slot)
                    {
                        return self.expression(inner, slot);
                    }
                }
                let (open, close) = if self.settings.spaces_inside_parens {
                    ("( ", " )")
                } else {
                    ("(", ")")
                };
                let inner = match paren.expression.as_ref() {
                    Statement::Expression(inner) => self.inline_cascade(inner, Slot::Standalone),
                    _ => None,
                };
                let inner = inner.unwrap_or_else(|| self.statement(&paren.expression));
                docvec![open, inner, close]
            }
            Primary::CurlyArray(array) => {
                if array.expressions.is_empty() {
                    return Document::Str("{}");
                }
                let elements: Vec<_> = array
                    .expressions
                    .iter()
                    .map(|e| self.statement(e))
                    .collect();
                if elements.iter().all(Document::is_single_line) {
                    let (open, close) = self.braces();
                    docvec![open, join(elements, &Document::Str(". ")), close]
                } else {
                    docvec![
                        "{",
                        nest(
                            &self.unit,
                            docvec![line(), join(elements, &docvec![".", line()])]
                        ),
                        line(),
                        "}"
                    ]
                }
            }
        }
    }

    fn braces(&self) -> (&'static str, &'static str) {
        if self.settings.spaces_inside_braces {
            ("{ ", " }")
        } else {
            ("{", "}")
        }
    }

    fn block(&'a self, block: &'a Block) -> Document<'a> {
        match self.inline_block(block) {
            Some(doc) if doc.is_single_line() => doc,
            _ => self.flow_block(block),
        }
    }

    fn block_parameters(block: &'a Block) -> Document<'a> {
        join(
            block
                .parameters
                .iter()
                .map(|p| docvec![":", p.name.as_str()]),
            &Document::Str(" "),
        )
    }

    /// `[:a | | t | a + t]` on one line; `None` for several statements.
    fn inline_block(&'a self, block: &'a Block) -> Option<Document<'a>> {
        if block.statements.len() > 1 {
            return None;
        }
        let mut parts = Vec::new();
        if !block.parameters.is_empty() {
            parts.push(docvec![Self::block_parameters(block), " |"]);
        }
        if let Some(temporaries) = self.temporaries(&block.temporaries) {
            parts.push(temporaries);
        }
        if let Some(statement) = block.statements.first() {
            parts.push(self.statement(statement));
        }
        if parts.is_empty() {
            return Some(Document::Str("[]"));
        }
        let (open, close) = if self.settings.spaces_inside_brackets {
            ("[ ", " ]")
        } else {
            ("[", "]")
        };
        Some(docvec![open, join(parts, &Document::Str(" ")), close])
    }

    /// The opening bracket ends the current line, the body is indented and
    /// the closing bracket starts a line of its own.
    fn flow_block(&'a self, block: &'a Block) -> Document<'a> {
        let header = if block.parameters.is_empty() {
            Document::Str("[")
        } else {
            docvec!["[", Self::block_parameters(block), " |"]
        };
        let mut body = Vec::new();
        if let Some(temporaries) = self.temporaries(&block.temporaries) {
            body.push(temporaries);
        }
        if !block.statements.is_empty() {
            body.push(join(
                block.statements.iter().map(|s| self.statement(s)),
                &docvec![".", line()],
            ));
        }
        if body.is_empty() {
            return docvec![header, line(), "]"];
        }
        docvec![
            header,
            nest(&self.unit, docvec![line(), join(body, &line())]),
            line(),
            "]"
        ]
    }
}

fn env(env: Option<EnvSpecifier>) -> Document<'static> {
    env.map_or(Document::Nil, |e| Document::String(format!("@env{}:", e.env)))
}

/// True when the rendered text so far ends in a character that would glue
/// onto an unspaced binary selector.
fn ends_with_selector_char(doc: &[Document<'_>]) -> bool {
    Document::Vec(doc.to_vec())
        .to_pretty_string()
        .chars()
        .next_back()
        .is_some_and(is_binary_selector_char)
}
