// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Document symbols provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! This domain service implements the `DocumentSymbolProvider`. The outline
//! is flat, one entry per region in document order:
//!
//! - Tonel class and extension headers become class symbols
//! - method regions become method symbols named `Class >> selector`
//! - bare code regions become code symbols named after their command

use ecow::EcoString;

use crate::document::ParsedDocument;
use crate::language_service::{DocumentSymbol, Range, SymbolKind};
use crate::segment::{HeaderKind, RegionKind};

/// Longest code preview shown as a code symbol's detail.
const PREVIEW_LEN: usize = 40;

/// Computes the outline of a document.
#[must_use]
pub fn compute_document_symbols(document: &ParsedDocument) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();
    for parsed in &document.regions {
        let region = &parsed.region;
        let range = Range::lines(region.start_line, region.end_line);
        match region.kind {
            RegionKind::Opaque => {
                let Some(header) = &region.header else {
                    continue;
                };
                if header.kind == HeaderKind::Package {
                    continue;
                }
                symbols.push(DocumentSymbol {
                    name: header.name.clone(),
                    detail: header.superclass.clone(),
                    kind: SymbolKind::Class,
                    range,
                    selection_range: range,
                });
            }
            RegionKind::Method => {
                let (selector, selection_range) = match &parsed.method {
                    Some(method) => (method.selector().clone(), method.pattern.span().into()),
                    None => (first_line(&region.code), range),
                };
                let name = match region.qualified_class() {
                    Some(class) => EcoString::from(format!("{class} >> {selector}")),
                    None => selector,
                };
                symbols.push(DocumentSymbol {
                    name,
                    detail: region.category.clone(),
                    kind: SymbolKind::Method,
                    range,
                    selection_range,
                });
            }
            RegionKind::Code => {
                let preview = first_line(&region.code);
                symbols.push(DocumentSymbol {
                    name: region.command.clone().unwrap_or_else(|| "code".into()),
                    detail: (!preview.is_empty()).then_some(preview),
                    kind: SymbolKind::Code,
                    range,
                    selection_range: range,
                });
            }
        }
    }
    symbols
}

/// The first non-blank line, trimmed and shortened.
fn first_line(text: &str) -> EcoString {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    match line.char_indices().nth(PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &line[..cut]).into(),
        None => line.into(),
    }
}
