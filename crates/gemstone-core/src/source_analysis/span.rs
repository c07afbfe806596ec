// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source positions and ranges.
//!
//! **DDD Context:** Source Analysis
//!
//! Every token and AST node carries a [`Span`]: a start and an end
//! [`Position`], each recording the byte offset, the 0-based line and the
//! 0-based byte column. Keeping line and column next to the offset lets the
//! editor-facing queries answer without rescanning the document.
//!
//! Offsets are whole-document offsets. Regions of a Topaz or Tonel file are
//! lexed with an origin position (see [`crate::source_analysis::tokenize_at`])
//! so that nodes never need to be shifted after parsing.

use std::ops::Range;

/// A point in a source document.
///
/// `column` counts UTF-8 bytes from the start of the line; conversion to
/// editor units (UTF-16) happens at the protocol boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// Byte offset from the start of the document.
    pub offset: u32,
    /// 0-based line number.
    pub line: u32,
    /// 0-based byte column within the line.
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Returns the position immediately after `c`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "char::len_utf8() is always 1 to 4"
    )]
    pub const fn advanced_by(self, c: char) -> Self {
        let width = c.len_utf8() as u32;
        if c == '\n' {
            Self::new(self.offset + width, self.line + 1, 0)
        } else {
            Self::new(self.offset + width, self.line, self.column + width)
        }
    }

    /// Returns the position at the start of this position's line.
    #[must_use]
    pub const fn line_start(self) -> Self {
        Self::new(self.offset - self.column, self.line, 0)
    }
}

/// A half-open range `[start, end)` of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: Position,
    end: Position,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `position`.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Returns the start position.
    #[must_use]
    pub const fn start(self) -> Position {
        self.start
    }

    /// Returns the end position (exclusive).
    #[must_use]
    pub const fn end(self) -> Position {
        self.end
    }

    /// Returns the length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns true if the span covers no text.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Returns true if `offset` lies inside the span (end exclusive).
    #[must_use]
    pub const fn contains(self, offset: u32) -> bool {
        offset >= self.start.offset && offset < self.end.offset
    }

    /// Returns true if `offset` lies inside the span or exactly at its end.
    ///
    /// Used for cursor lookups, where a caret placed right after a word
    /// still refers to that word.
    #[must_use]
    pub const fn touches(self, offset: u32) -> bool {
        offset >= self.start.offset && offset <= self.end.offset
    }

    /// Returns true if `other` lies entirely within this span.
    #[must_use]
    pub const fn encloses(self, other: Self) -> bool {
        other.start.offset >= self.start.offset && other.end.offset <= self.end.offset
    }

    /// Merges two spans into one covering both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        Self::new(start, end)
    }

    /// Returns the byte range, for slicing the document text.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start.offset as usize..self.end.offset as usize
    }

    /// Returns the number of lines the span touches.
    #[must_use]
    pub const fn line_count(self) -> u32 {
        self.end.line - self.start.line + 1
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start.offset as usize, span.len() as usize).into()
    }
}

/// Line-start table for converting `(line, column)` pairs to positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Builds the line table for `text`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        );
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Returns the number of lines (a trailing newline opens a final empty line).
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Resolves a line and byte column, clamping both to the document.
    #[must_use]
    pub fn position(&self, line: u32, column: u32) -> Position {
        let Some(&start) = self.line_starts.get(line as usize) else {
            return self.end();
        };
        let line_end = self
            .line_starts
            .get(line as usize + 1)
            .map_or(self.len, |next| next - 1);
        let offset = (start + column).min(line_end);
        Position::new(offset, line, offset - start)
    }

    /// Resolves a byte offset, clamping it to the document.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "line count bounded by source length"
    )]
    pub fn position_of_offset(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts[line];
        Position::new(offset, line as u32, offset - start)
    }

    /// Returns the position just past the last character.
    #[must_use]
    pub fn end(&self) -> Position {
        self.position_of_offset(self.len)
    }
}
