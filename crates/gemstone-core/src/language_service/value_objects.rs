// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Value objects for the language service.
//!
//! **DDD Context:** Language Service
//!
//! Value objects are immutable types defined by their attributes:
//!
//! - **`Position`** / **`Range`** - editor coordinates (0-based line, UTF-8 byte column)
//! - **`Location`** - a document URI and range
//! - **`Completion`** - a code completion suggestion
//! - **`HoverInfo`** - markdown shown on hover
//! - **`DocumentSymbol`** - an outline entry
//! - **`FoldingRange`** - a collapsible line range
//! - **`TextEdit`** - a replacement of a document range

use ecow::EcoString;

use crate::source_analysis::{self, Span};

/// A position in a document (line and column, both 0-indexed).
///
/// The `column` is a **byte offset within the line**. Transports that count
/// UTF-16 code units convert at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    /// Line number (0-indexed).
    pub line: u32,
    /// Column offset in bytes from the start of the line (0-indexed).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<source_analysis::Position> for Position {
    fn from(position: source_analysis::Position) -> Self {
        Self::new(position.line, position.column)
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Creates a new range.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A range covering whole lines `start_line..=end_line`.
    #[must_use]
    pub const fn lines(start_line: u32, end_line: u32) -> Self {
        Self::new(Position::new(start_line, 0), Position::new(end_line + 1, 0))
    }
}

impl From<Span> for Range {
    fn from(span: Span) -> Self {
        Self::new(span.start().into(), span.end().into())
    }
}

/// A location in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// The document URI.
    pub uri: EcoString,
    /// The range within the document.
    pub range: Range,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(uri: impl Into<EcoString>, range: impl Into<Range>) -> Self {
        Self {
            uri: uri.into(),
            range: range.into(),
        }
    }
}

/// The kind of a completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// A pseudo-variable or reserved literal (`self`, `nil` ...).
    Keyword,
    /// A variable in scope.
    Variable,
    /// A message selector.
    Method,
    /// A class or global name.
    Class,
}

/// A code completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The text shown in the completion list.
    pub label: EcoString,
    /// What is being completed.
    pub kind: CompletionKind,
    /// A short description shown next to the label.
    pub detail: Option<EcoString>,
}

impl Completion {
    /// Creates a completion with no detail.
    #[must_use]
    pub fn new(label: impl Into<EcoString>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
        }
    }

    /// Adds a detail string.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<EcoString>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Hover content for the symbol under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    /// Markdown content.
    pub contents: String,
    /// The range the hover applies to.
    pub range: Range,
}

/// The kind of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A class definition or Tonel header.
    Class,
    /// A method.
    Method,
    /// A bare code region (`run`, `doit` ...).
    Code,
}

/// An outline entry for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    /// Display name: `Account >> deposit:`, `run` ...
    pub name: EcoString,
    /// Secondary text such as the method category.
    pub detail: Option<EcoString>,
    /// What the entry is.
    pub kind: SymbolKind,
    /// The whole region.
    pub range: Range,
    /// The part to highlight when the entry is selected.
    pub selection_range: Range,
}

/// The kind of a folding range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldingKind {
    /// A region, method or block.
    Region,
    /// A comment.
    Comment,
}

/// A collapsible range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FoldingRange {
    /// First line (0-based).
    pub start_line: u32,
    /// Last line (0-based, inclusive).
    pub end_line: u32,
    /// What is folded.
    pub kind: FoldingKind,
}

/// A replacement of `range` by `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// The range to replace.
    pub range: Range,
    /// The replacement.
    pub new_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_from_span() {
        let span = Span::new(
            source_analysis::Position::new(4, 1, 0),
            source_analysis::Position::new(9, 1, 5),
        );
        let range = Range::from(span);
        assert_eq!(range.start, Position::new(1, 0));
        assert_eq!(range.end, Position::new(1, 5));
    }

    #[test]
    fn line_ranges_end_on_the_following_line() {
        let range = Range::lines(2, 4);
        assert_eq!(range.start, Position::new(2, 0));
        assert_eq!(range.end, Position::new(5, 0));
    }

    #[test]
    fn completion_builder() {
        let completion = Completion::new("size", CompletionKind::Method).with_detail("Array");
        assert_eq!(completion.label, "size");
        assert_eq!(completion.detail.as_deref(), Some("Array"));
    }

    #[test]
    fn location_accepts_spans() {
        let location = Location::new("file:///a.gs", Span::default());
        assert_eq!(location.uri, "file:///a.gs");
        assert_eq!(location.range, Range::default());
    }
}
