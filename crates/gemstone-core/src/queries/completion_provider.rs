// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Completion provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! This domain service implements the `CompletionProvider`. It suggests
//! completions at the cursor based on the token before the word being typed:
//!
//! - after a receiver (a name, a literal or a closing bracket) the cursor is
//!   in message position, so selectors are offered: every implemented
//!   selector in the [`WorkspaceIndex`] plus the selectors this document
//!   declares and sends
//! - anywhere else the cursor is in expression position, so variables in
//!   scope, pseudo-variables, reserved literals and known class names are
//!   offered
//!
//! Suggestions are filtered by the partially typed word.

use std::collections::BTreeSet;

use ecow::EcoString;

use crate::ast::Expression;
use crate::ast_walker::walk_body;
use crate::document::{ParsedDocument, ParsedRegion};
use crate::language_service::{Completion, CompletionKind, WorkspaceIndex};
use crate::source_analysis::{Span, Token, TokenKind};

use super::target::{PSEUDO_VARIABLES, scope_tree, selector_spans};

/// Reserved literal names offered in expression position.
const RESERVED_LITERALS: &[&str] = &["true", "false", "nil"];

/// Computes completions at `offset`.
///
/// # Examples
///
/// ```
/// use gemstone_core::document::{DocumentFormat, ParsedDocument};
/// use gemstone_core::language_service::WorkspaceIndex;
/// use gemstone_core::queries::completion_provider::compute_completions;
///
/// let text = "run\n| total |\nto\n%\n";
/// let document = ParsedDocument::parse("file:///a.gs", 1, text, DocumentFormat::Topaz);
/// let offset = text.find("to\n").unwrap() as u32 + 2;
/// let completions = compute_completions(&document, offset, &WorkspaceIndex::new());
/// assert_eq!(completions[0].label, "total");
/// ```
#[must_use]
pub fn compute_completions(
    document: &ParsedDocument,
    offset: u32,
    index: &WorkspaceIndex,
) -> Vec<Completion> {
    let Some(region) = document.region_at(offset) else {
        return Vec::new();
    };
    let (typed, before) = word_before(region, offset);
    let (prefix, typed_span) = match typed {
        Some(token) => (token.text().clone(), Some(token.span())),
        None => (EcoString::new(), None),
    };
    let mut completions = if in_message_position(before) {
        selector_completions(document, index, typed_span)
    } else {
        expression_completions(region, offset, index)
    };
    completions.retain(|c| c.label.starts_with(prefix.as_str()));
    completions
}

/// Returns the word token ending exactly at `offset`, if any, and the
/// significant token before it.
fn word_before(region: &ParsedRegion, offset: u32) -> (Option<&Token>, Option<&Token>) {
    let significant = region
        .tokens
        .iter()
        .filter(|t| !t.is_trivia() && t.kind() != TokenKind::Eof && t.span().start().offset < offset);
    let mut previous = None;
    let mut last = None;
    for token in significant {
        previous = last;
        last = Some(token);
    }
    match last {
        Some(token)
            if token.span().end().offset == offset
                && matches!(token.kind(), TokenKind::Identifier | TokenKind::Keyword) =>
        {
            (Some(token), previous)
        }
        _ => (None, last),
    }
}

fn in_message_position(before: Option<&Token>) -> bool {
    before.is_some_and(|token| {
        let kind = token.kind();
        kind == TokenKind::Identifier
            || kind.is_literal()
            || matches!(
                kind,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace
            )
    })
}

/// `typed` is the word being edited; a send whose selector is that word is
/// not a suggestion.
fn selector_completions(
    document: &ParsedDocument,
    index: &WorkspaceIndex,
    typed: Option<Span>,
) -> Vec<Completion> {
    let mut selectors: BTreeSet<EcoString> =
        index.implemented_selectors().into_iter().cloned().collect();
    for region in document.smalltalk_regions() {
        if let Some(method) = &region.method {
            selectors.insert(method.selector().clone());
        }
        if let Some(body) = region.body() {
            walk_body(body, &mut |expr: &Expression| {
                for message in expr.messages.iter().chain(&expr.cascades) {
                    if typed.is_some_and(|span| selector_spans(message).contains(&span)) {
                        continue;
                    }
                    selectors.insert(message.selector().clone());
                }
            });
        }
    }
    selectors
        .into_iter()
        .map(|selector| {
            let implementors = index.find_implementors(&selector).len();
            let completion = Completion::new(selector, CompletionKind::Method);
            match implementors {
                0 => completion,
                1 => completion.with_detail("1 implementor"),
                n => completion.with_detail(format!("{n} implementors")),
            }
        })
        .collect()
}

fn expression_completions(
    region: &ParsedRegion,
    offset: u32,
    index: &WorkspaceIndex,
) -> Vec<Completion> {
    let mut completions: Vec<Completion> = Vec::new();
    if let Some(tree) = scope_tree(region) {
        completions.extend(tree.visible_at(offset).into_iter().map(|variable| {
            Completion::new(variable.name.clone(), CompletionKind::Variable)
                .with_detail(variable.kind.describe())
        }));
    }
    completions.extend(
        PSEUDO_VARIABLES
            .iter()
            .chain(RESERVED_LITERALS)
            .map(|name| Completion::new(*name, CompletionKind::Keyword)),
    );
    if let Some(class_name) = &region.region.class_name {
        completions.push(Completion::new(class_name.clone(), CompletionKind::Class));
    }
    completions.extend(
        index
            .class_names()
            .into_iter()
            .map(|name| Completion::new(name.clone(), CompletionKind::Class)),
    );
    let mut seen = BTreeSet::new();
    completions.retain(|c| seen.insert(c.label.clone()));
    completions
}
