// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Region segmentation for Topaz scripts and Tonel files.
//!
//! **DDD Context:** Source Analysis
//!
//! A document is split into an ordered list of [`Region`]s that tile it with
//! no gaps: concatenating every region's `text` reproduces the document byte
//! for byte. Each region is one of:
//!
//! - [`RegionKind::Opaque`] - tool commands, Tonel metadata or anything
//!   unrecognized; never parsed
//! - [`RegionKind::Code`] - a bare statement list (`run`, `doit`, `printit`)
//! - [`RegionKind::Method`] - one method, pattern first
//!
//! Segmenters never fail. Lines they cannot classify fall into the
//! surrounding opaque region.

mod tonel;
mod topaz;


pub use tonel::segment_tonel;
pub use topaz::segment_topaz;

use crate::source_analysis::{Position, Span};
use ecow::EcoString;

/// What a region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Text that is not Smalltalk: commands, metadata, unrecognized lines.
    Opaque,
    /// A bare executable statement list.
    Code,
    /// A method definition.
    Method,
}

/// The header kind of a Tonel file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    /// `Class { ... }`
    Class,
    /// `Extension { ... }`
    Extension,
    /// `Package { ... }`
    Package,
}

/// Metadata read from a Tonel `Class { ... }` style header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TonelHeader {
    /// Which header form was used.
    pub kind: HeaderKind,
    /// The `#name` value.
    pub name: EcoString,
    /// The `#superclass` value, if any.
    pub superclass: Option<EcoString>,
    /// The `#category` value, if any.
    pub category: Option<EcoString>,
}

/// One contiguous slice of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// What the region holds.
    pub kind: RegionKind,
    /// Location in the document; starts at column 0.
    pub span: Span,
    /// First line (0-based).
    pub start_line: u32,
    /// Last line (0-based, inclusive).
    pub end_line: u32,
    /// The verbatim region text.
    pub text: EcoString,
    /// The text handed to the lexer. Same length and line structure as
    /// `text`; Tonel method wrappers are blanked to spaces.
    pub code: EcoString,
    /// Declared or inherited class name for methods.
    pub class_name: Option<EcoString>,
    /// True for class-side methods.
    pub class_side: bool,
    /// Method category, when the format records one.
    pub category: Option<EcoString>,
    /// The Topaz command that opened the region (`run`, `method:` ...).
    pub command: Option<EcoString>,
    /// Tonel header metadata, on the header region only.
    pub header: Option<TonelHeader>,
}

impl Region {
    /// Creates a region whose parse text equals its verbatim text.
    #[must_use]
    pub fn new(kind: RegionKind, span: Span, text: impl Into<EcoString>) -> Self {
        let text = text.into();
        let end_line = last_line(span);
        Self {
            kind,
            span,
            start_line: span.start().line,
            end_line,
            code: text.clone(),
            text,
            class_name: None,
            class_side: false,
            category: None,
            command: None,
            header: None,
        }
    }

    /// Returns true for regions the parser reads.
    #[must_use]
    pub fn is_smalltalk(&self) -> bool {
        matches!(self.kind, RegionKind::Code | RegionKind::Method)
    }

    /// Returns `ClassName` or `ClassName class`, if a class is known.
    #[must_use]
    pub fn qualified_class(&self) -> Option<EcoString> {
        let name = self.class_name.as_ref()?;
        let mut qualified = name.clone();
        if self.class_side {
            qualified.push_str(" class");
        }
        Some(qualified)
    }
}

/// Returns the last line that holds any of the span's text.
fn last_line(span: Span) -> u32 {
    let end = span.end();
    if end.column == 0 && end.line > span.start().line {
        end.line - 1
    } else {
        end.line
    }
}

// ============================================================================
// Line scanning shared by both segmenters
// ============================================================================

/// One physical line of a document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'src> {
    /// Position of the first byte.
    pub start: Position,
    /// The line content without its terminator.
    pub content: &'src str,
    /// The line including its `\n` (or `\r\n`), if any.
    pub full: &'src str,
}

impl Line<'_> {
    /// Position just past the line terminator.
    pub fn end(&self) -> Position {
        let mut end = self.start;
        for c in self.full.chars() {
            end = end.advanced_by(c);
        }
        end
    }
}

/// Splits `source` into lines, keeping terminators.
pub(crate) fn lines(source: &str) -> Vec<Line<'_>> {
    let mut result = Vec::new();
    let mut start = Position::default();
    for full in source.split_inclusive('\n') {
        let content = full.trim_end_matches('\n').trim_end_matches('\r');
        let line = Line {
            start,
            content,
            full,
        };
        start = line.end();
        result.push(line);
    }
    result
}

/// Accumulates consecutive lines into regions, merging adjacent opaque lines.
pub(crate) struct RegionBuilder<'src> {
    source: &'src str,
    regions: Vec<Region>,
    opaque_start: Option<Position>,
    opaque_end: Position,
}

impl<'src> RegionBuilder<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            regions: Vec::new(),
            opaque_start: None,
            opaque_end: Position::default(),
        }
    }

    /// Adds lines `[start, end)` to the pending opaque run.
    pub fn opaque(&mut self, start: Position, end: Position) {
        if start == end {
            return;
        }
        self.opaque_start.get_or_insert(start);
        self.opaque_end = end;
    }

    /// Flushes the opaque run and pushes a region built from `[start, end)`.
    ///
    /// Returns the pushed region for further decoration, or `None` when the
    /// range is empty.
    pub fn push(&mut self, kind: RegionKind, start: Position, end: Position) -> Option<&mut Region> {
        if start == end {
            return None;
        }
        self.flush();
        let text = &self.source[start.offset as usize..end.offset as usize];
        self.regions
            .push(Region::new(kind, Span::new(start, end), text));
        self.regions.last_mut()
    }

    fn flush(&mut self) {
        if let Some(start) = self.opaque_start.take() {
            let end = self.opaque_end;
            let text = &self.source[start.offset as usize..end.offset as usize];
            self.regions
                .push(Region::new(RegionKind::Opaque, Span::new(start, end), text));
        }
    }

    pub fn finish(mut self) -> Vec<Region> {
        self.flush();
        self.regions
    }
}
