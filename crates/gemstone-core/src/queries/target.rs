// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Resolving what sits under the cursor.
//!
//! **DDD Context:** Language Service
//!
//! Every position query starts here. [`target_at`] looks at the token under
//! the cursor and classifies it as a selector (in a message send, a method
//! pattern or a symbol literal), a local variable resolved through the
//! region's [`ScopeTree`], a pseudo-variable, a global name, or a literal.

use ecow::EcoString;

use crate::analyse::{ScopeTree, VariableInfo};
use crate::ast::{Expression, Message, MessagePattern, MethodBody};
use crate::ast_walker::walk_body;
use crate::document::ParsedRegion;
use crate::source_analysis::{Span, TokenKind};

/// Names bound by the runtime rather than declared.
pub const PSEUDO_VARIABLES: &[&str] = &["self", "super", "thisContext"];

/// What the cursor is on.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    /// A message selector.
    Selector(EcoString),
    /// A declared argument, temporary or block parameter.
    Variable(VariableInfo),
    /// `self`, `super` or `thisContext`.
    PseudoVariable(EcoString),
    /// A name with no local declaration: a global, class or instance variable.
    Global(EcoString),
    /// A literal token.
    Literal(TokenKind, EcoString),
}

/// A resolved cursor target and the token range it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// What the cursor is on.
    pub kind: TargetKind,
    /// The token under the cursor.
    pub span: Span,
}

/// Builds the scope tree of a region's method or code body.
#[must_use]
pub fn scope_tree(region: &ParsedRegion) -> Option<ScopeTree> {
    if let Some(method) = &region.method {
        return Some(ScopeTree::analyze(method));
    }
    region.statements.as_ref().map(ScopeTree::analyze_body)
}

/// Classifies the token at `offset`.
#[must_use]
pub fn target_at(region: &ParsedRegion, offset: u32) -> Option<Target> {
    let token = region.token_at(offset)?;
    let span = token.span();
    if let Some(selector) = selector_at_span(region, span) {
        return Some(Target {
            kind: TargetKind::Selector(selector),
            span,
        });
    }
    let kind = match token.kind() {
        TokenKind::Identifier => {
            let name = token.text().clone();
            let scopes = scope_tree(region);
            let local = scopes.as_ref().and_then(|tree| {
                tree.declaration_at(span.start().offset)
                    .or_else(|| tree.variable_at(&name, span.start().offset))
                    .cloned()
            });
            match local {
                Some(info) => TargetKind::Variable(info),
                None if PSEUDO_VARIABLES.contains(&name.as_str()) => {
                    TargetKind::PseudoVariable(name)
                }
                None => TargetKind::Global(name),
            }
        }
        TokenKind::Symbol => match symbol_selector(token.text()) {
            Some(selector) => TargetKind::Selector(selector),
            None => TargetKind::Literal(TokenKind::Symbol, token.text().clone()),
        },
        kind if kind.is_literal() => TargetKind::Literal(kind, token.text().clone()),
        _ => return None,
    };
    Some(Target { kind, span })
}

/// Returns the selector whose name (or one of whose keywords) occupies
/// exactly `span`, looking at the method pattern and every send.
#[must_use]
pub fn selector_at_span(region: &ParsedRegion, span: Span) -> Option<EcoString> {
    if let Some(method) = &region.method {
        let hit = match &method.pattern {
            MessagePattern::Unary(p) => p.selector.span == span,
            MessagePattern::Binary(p) => p.selector_span == span,
            MessagePattern::Keyword(p) => p.keywords.iter().any(|k| k.span == span),
        };
        if hit {
            return Some(method.selector().clone());
        }
    }
    let body = region.body()?;
    let mut found = None;
    walk_body(body, &mut |expr: &Expression| {
        if found.is_some() {
            return;
        }
        found = expr
            .messages
            .iter()
            .chain(&expr.cascades)
            .find(|message| selector_spans(message).contains(&span))
            .map(|message| message.selector().clone());
    });
    found
}

/// The source ranges naming a message's selector: one per keyword for
/// keyword messages.
#[must_use]
pub fn selector_spans(message: &Message) -> Vec<Span> {
    match message {
        Message::Unary(m) => vec![m.selector.span],
        Message::Binary(m) => vec![m.selector_span],
        Message::Keyword(m) => m.parts.iter().map(|p| p.keyword.span).collect(),
    }
}

/// Collects the first selector range of every send of `selector` in `body`.
#[must_use]
pub fn send_spans(body: &MethodBody, selector: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    walk_body(body, &mut |expr: &Expression| {
        for message in expr.messages.iter().chain(&expr.cascades) {
            if message.selector() == selector {
                spans.extend(selector_spans(message).first());
            }
        }
    });
    spans
}

/// `#at:put:` names a selector; `#'hello world'` does not.
fn symbol_selector(text: &str) -> Option<EcoString> {
    let name = text.strip_prefix('#')?;
    let first = name.chars().next()?;
    let word = (first.is_ascii_alphabetic() || first == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':');
    let binary = name.chars().all(crate::source_analysis::is_binary_selector_char);
    (word || binary).then(|| name.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyse::VariableKind;
    use crate::document::{DocumentFormat, ParsedDocument};

    fn target(source: &str, needle: &str) -> Option<TargetKind> {
        let text = format!("method: Foo\n{source}\n%\n");
        let document = ParsedDocument::parse("file:///a.gs", 1, &text, DocumentFormat::Topaz);
        let offset = u32::try_from(text.find(needle).unwrap()).unwrap();
        let region = document.region_at(offset).unwrap();
        target_at(region, offset).map(|t| t.kind)
    }

    #[test]
    fn selectors_in_sends_and_patterns() {
        let src = "at: i put: v\n  ^self basicAt: i put: v";
        assert_eq!(target(src, "put: v\n"), Some(TargetKind::Selector("at:put:".into())));
        assert_eq!(target(src, "basicAt"), Some(TargetKind::Selector("basicAt:put:".into())));
        assert_eq!(target("foo\n  ^1 + 2", "+"), Some(TargetKind::Selector("+".into())));
        assert_eq!(target("foo\n  ^x size", "size"), Some(TargetKind::Selector("size".into())));
    }

    #[test]
    fn symbols_name_selectors() {
        assert_eq!(
            target("foo\n  ^self perform: #bar:", "#bar"),
            Some(TargetKind::Selector("bar:".into()))
        );
        assert!(matches!(
            target("foo\n  ^#'a b'", "#'"),
            Some(TargetKind::Literal(TokenKind::Symbol, _))
        ));
    }

    #[test]
    fn variables_resolve_through_scopes() {
        let src = "foo: a\n  | t |\n  t := a.\n  ^[:b | b + t]";
        match target(src, "a.") {
            Some(TargetKind::Variable(info)) => assert_eq!(info.kind, VariableKind::Argument),
            other => panic!("unexpected {other:?}"),
        }
        match target(src, "b + t") {
            Some(TargetKind::Variable(info)) => assert_eq!(info.kind, VariableKind::BlockParameter),
            other => panic!("unexpected {other:?}"),
        }
        match target(src, "t |") {
            Some(TargetKind::Variable(info)) => assert_eq!(info.kind, VariableKind::Temporary),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn globals_pseudo_variables_and_literals() {
        assert_eq!(
            target("foo\n  ^Account new", "Account"),
            Some(TargetKind::Global("Account".into()))
        );
        assert_eq!(
            target("foo\n  ^self", "self"),
            Some(TargetKind::PseudoVariable("self".into()))
        );
        assert_eq!(
            target("foo\n  ^42", "42"),
            Some(TargetKind::Literal(TokenKind::Integer, "42".into()))
        );
        assert_eq!(target("foo\n  ^42", "^"), None);
    }

    #[test]
    fn send_spans_point_at_first_keyword() {
        let text = "run\nx at: 1 put: 2. y at: 3 put: 4; size\n%\n";
        let document = ParsedDocument::parse("file:///a.gs", 1, text, DocumentFormat::Topaz);
        let region = document.smalltalk_regions().next().unwrap();
        let spans = send_spans(region.body().unwrap(), "at:put:");
        let starts: Vec<_> = spans.iter().map(|s| &text[s.as_range()]).collect();
        assert_eq!(starts, vec!["at:", "at:"]);
        assert_eq!(send_spans(region.body().unwrap(), "size").len(), 1);
    }
}
