// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! References provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! This domain service implements the `ReferencesProvider`.
//!
//! - Local variables: every read and assignment in the declaring region
//!   that resolves to the same declaration.
//! - Selectors: exact send ranges in every open document, plus the pattern
//!   of each indexed sender in files that are not open.
//! - Global names: every unresolved use of the name in open documents.
//!
//! Results are sorted by URI and position.

use std::collections::HashSet;

use ecow::EcoString;

use crate::analyse::VariableInfo;
use crate::ast::Identifier;
use crate::ast_walker::walk_variables;
use crate::document::{ParsedDocument, ParsedRegion};
use crate::language_service::{Location, WorkspaceIndex};

use super::target::{TargetKind, scope_tree, send_spans, target_at};

/// Finds every reference to the symbol at `offset`.
///
/// `open_documents` must include `document`. With `include_declaration`,
/// variable declarations and selector implementors are part of the result.
#[must_use]
pub fn find_references<'a>(
    document: &ParsedDocument,
    offset: u32,
    index: &WorkspaceIndex,
    open_documents: impl IntoIterator<Item = &'a ParsedDocument>,
    include_declaration: bool,
) -> Vec<Location> {
    let Some(region) = document.region_at(offset) else {
        return Vec::new();
    };
    let Some(target) = target_at(region, offset) else {
        return Vec::new();
    };
    let mut locations = match &target.kind {
        TargetKind::Variable(info) => variable_references(document, region, info, include_declaration),
        TargetKind::Selector(selector) => {
            selector_references(selector, index, open_documents, include_declaration)
        }
        TargetKind::Global(name) => global_references(name, open_documents),
        TargetKind::PseudoVariable(_) | TargetKind::Literal(..) => Vec::new(),
    };
    locations.sort_by(|a, b| (&a.uri, a.range.start).cmp(&(&b.uri, b.range.start)));
    locations.dedup();
    locations
}

fn variable_references(
    document: &ParsedDocument,
    region: &ParsedRegion,
    info: &VariableInfo,
    include_declaration: bool,
) -> Vec<Location> {
    let (Some(tree), Some(body)) = (scope_tree(region), region.body()) else {
        return Vec::new();
    };
    let mut locations = Vec::new();
    if include_declaration {
        locations.push(Location::new(document.uri.clone(), info.definition));
    }
    walk_variables(body, &mut |identifier: &Identifier| {
        if identifier.name != info.name {
            return;
        }
        let resolved = tree.variable_at(&identifier.name, identifier.span.start().offset);
        if resolved.is_some_and(|v| v.definition == info.definition) {
            locations.push(Location::new(document.uri.clone(), identifier.span));
        }
    });
    locations
}

fn selector_references<'a>(
    selector: &str,
    index: &WorkspaceIndex,
    open_documents: impl IntoIterator<Item = &'a ParsedDocument>,
    include_declaration: bool,
) -> Vec<Location> {
    let mut locations = Vec::new();
    let mut open: HashSet<EcoString> = HashSet::new();
    for document in open_documents {
        open.insert(document.uri.clone());
        for region in document.smalltalk_regions() {
            if let Some(body) = region.body() {
                locations.extend(
                    send_spans(body, selector)
                        .into_iter()
                        .map(|span| Location::new(document.uri.clone(), span)),
                );
            }
            if include_declaration {
                if let Some(method) = region.method.as_ref().filter(|m| m.selector() == selector) {
                    locations.push(Location::new(document.uri.clone(), method.pattern.span()));
                }
            }
        }
    }
    locations.extend(
        index
            .find_senders(selector)
            .into_iter()
            .filter(|entry| !open.contains(&entry.uri))
            .map(|entry| Location::new(entry.uri.clone(), entry.pattern)),
    );
    if include_declaration {
        locations.extend(
            index
                .find_implementors(selector)
                .into_iter()
                .filter(|entry| !open.contains(&entry.uri))
                .map(|entry| Location::new(entry.uri.clone(), entry.pattern)),
        );
    }
    locations
}

fn global_references<'a>(
    name: &str,
    open_documents: impl IntoIterator<Item = &'a ParsedDocument>,
) -> Vec<Location> {
    let mut locations = Vec::new();
    for document in open_documents {
        for region in document.smalltalk_regions() {
            let (Some(tree), Some(body)) = (scope_tree(region), region.body()) else {
                continue;
            };
            walk_variables(body, &mut |identifier: &Identifier| {
                if identifier.name == name
                    && tree
                        .variable_at(name, identifier.span.start().offset)
                        .is_none()
                {
                    locations.push(Location::new(document.uri.clone(), identifier.span));
                }
            });
        }
    }
    locations
}
