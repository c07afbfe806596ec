// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! This domain service implements the `DiagnosticProvider`. It reports the
//! lexical and syntax diagnostics recorded while parsing each region, plus
//! unused-temporary warnings for regions that parsed cleanly.
//!
//! # Design
//!
//! Diagnostics come from two sources:
//! - Parse errors, already in document coordinates on each region
//! - Scope analysis of clean regions: declared temporaries that are never
//!   read or assigned

use crate::analyse::{ScopeTree, VariableKind};
use crate::ast::{Identifier, MethodBody};
use crate::ast_walker::walk_variables;
use crate::document::ParsedDocument;
use crate::source_analysis::Diagnostic;

use super::target::scope_tree;

/// Computes every diagnostic of a document, in document order.
///
/// # Examples
///
/// ```
/// use gemstone_core::document::{DocumentFormat, ParsedDocument};
/// use gemstone_core::queries::diagnostic_provider::compute_diagnostics;
///
/// let document = ParsedDocument::parse("file:///a.gs", 1, "run\n| t |\n3 + 4\n%\n", DocumentFormat::Topaz);
/// let diagnostics = compute_diagnostics(&document);
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(diagnostics[0].message, "unused temporary 't'");
/// ```
#[must_use]
pub fn compute_diagnostics(document: &ParsedDocument) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for region in document.smalltalk_regions() {
        diagnostics.extend(region.diagnostics.iter().cloned());
        if !region.is_clean() {
            continue;
        }
        if let (Some(tree), Some(body)) = (scope_tree(region), region.body()) {
            diagnostics.extend(unused_temporaries(&tree, body));
        }
    }
    diagnostics.sort_by_key(|d| d.span.start().offset);
    diagnostics
}

fn unused_temporaries(tree: &ScopeTree, body: &MethodBody) -> Vec<Diagnostic> {
    let mut used = Vec::new();
    walk_variables(body, &mut |identifier: &Identifier| {
        if let Some(variable) = tree.variable_at(&identifier.name, identifier.span.start().offset) {
            used.push(variable.definition);
        }
    });
    tree.scopes()
        .flat_map(|scope| scope.variables.iter())
        .filter(|v| matches!(v.kind, VariableKind::Temporary | VariableKind::BlockTemporary))
        .filter(|v| !used.contains(&v.definition))
        .map(|v| {
            Diagnostic::warning(format!("unused temporary '{}'", v.name), v.definition)
                .with_hint("remove it from the temporaries declaration")
        })
        .collect()
}
