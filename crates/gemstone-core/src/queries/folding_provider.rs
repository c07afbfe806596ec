// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Folding range provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! Produces a folding range for every multi-line Smalltalk region, Tonel
//! header, block literal and comment.

use crate::ast::{Expression, Primary};
use crate::ast_walker::walk_body;
use crate::document::ParsedDocument;
use crate::language_service::{FoldingKind, FoldingRange};
use crate::source_analysis::{Span, TokenKind};

/// Computes the folding ranges of a document, sorted by start line.
#[must_use]
pub fn compute_folding_ranges(document: &ParsedDocument) -> Vec<FoldingRange> {
    let mut ranges = Vec::new();
    for parsed in &document.regions {
        let region = &parsed.region;
        if region.is_smalltalk() || region.header.is_some() {
            push_lines(&mut ranges, region.start_line, region.end_line, FoldingKind::Region);
        }
        for token in &parsed.tokens {
            if token.kind() == TokenKind::Comment {
                push_span(&mut ranges, token.span(), FoldingKind::Comment);
            }
        }
        if let Some(body) = parsed.body() {
            walk_body(body, &mut |expr: &Expression| match &expr.receiver {
                Primary::Block(block) => push_span(&mut ranges, block.span, FoldingKind::Region),
                Primary::SelectionBlock(block) => {
                    push_span(&mut ranges, block.span, FoldingKind::Region);
                }
                _ => {}
            });
        }
    }
    ranges.sort_by_key(|r| (r.start_line, std::cmp::Reverse(r.end_line)));
    ranges.dedup();
    ranges
}

fn push_span(ranges: &mut Vec<FoldingRange>, span: Span, kind: FoldingKind) {
    push_lines(ranges, span.start().line, span.end().line, kind);
}

fn push_lines(ranges: &mut Vec<FoldingRange>, start_line: u32, end_line: u32, kind: FoldingKind) {
    if end_line > start_line {
        ranges.push(FoldingRange {
            start_line,
            end_line,
            kind,
        });
    }
}
