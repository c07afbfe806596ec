// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Language service API for editor integration.
//!
//! **DDD Context:** Language Service
//!
//! The analysis engine is consumed through request/response operations.
//! [`LanguageService`] names them; [`AnalysisSession`] implements them over
//! an injected [`DocumentManager`], a [`WorkspaceIndex`] and the session's
//! [`FormatterSettings`]. Nothing is process-global, so independent sessions
//! (and tests) never share state.
//!
//! # Architecture
//!
//! ```text
//! AnalysisSession
//! ├── DocumentManager   latest parse of every open document
//! ├── WorkspaceIndex    implementors / senders / classes across files
//! └── FormatterSettings session-wide style, overridable per request
//! ```
//!
//! Every query is a total function: an unknown URI or a position outside
//! any Smalltalk region yields an empty answer, never an error.
//!
//! # Usage
//!
//! ```
//! use gemstone_core::document::DocumentFormat;
//! use gemstone_core::language_service::{AnalysisSession, LanguageService, Position};
//!
//! let mut session = AnalysisSession::new();
//! let uri = "file:///install.gs";
//! let diagnostics = session.update_document(uri, 1, "run\n1 +\n%\n", DocumentFormat::Topaz);
//! assert_eq!(diagnostics.len(), 1);
//!
//! session.update_document(uri, 2, "run\n3 factorial\n%\n", DocumentFormat::Topaz);
//! let selector = session.selector_at_position(uri, Position::new(1, 4));
//! assert_eq!(selector.as_deref(), Some("factorial"));
//! ```

mod value_objects;
mod workspace_index;

pub use value_objects::{
    Completion, CompletionKind, DocumentSymbol, FoldingKind, FoldingRange, HoverInfo, Location,
    Position, Range, SymbolKind, TextEdit,
};
pub use workspace_index::{ClassEntry, MethodEntry, WorkspaceIndex};

/// Diagnostics are the parser's own type.
pub type Diagnostic = crate::source_analysis::Diagnostic;

use ecow::EcoString;
use tracing::{debug, trace};

use crate::document::{DocumentFormat, DocumentManager, ParsedDocument};
use crate::format::{FormatterOverrides, FormatterSettings, format_document};
use crate::queries::target::{TargetKind, target_at};
use crate::queries::{
    completion_provider, definition_provider, diagnostic_provider, document_symbols_provider,
    folding_provider, hover_provider, references_provider,
};

/// The language service operations.
///
/// Positions are 0-based `(line, byte column)` pairs; transports that count
/// columns differently convert at their edge.
pub trait LanguageService {
    /// Re-segments, re-lexes and re-parses a document, re-indexes it and
    /// returns its diagnostics.
    fn update_document(
        &mut self,
        uri: &str,
        version: i32,
        text: &str,
        format: DocumentFormat,
    ) -> Vec<Diagnostic>;

    /// Forgets an open document. Its index entries stay until the file is
    /// re-indexed or removed.
    fn close_document(&mut self, uri: &str);

    /// Returns the current diagnostics of an open document.
    fn diagnostics(&self, uri: &str) -> Vec<Diagnostic>;

    /// Returns hover markdown for the symbol at `position`.
    fn hover(&self, uri: &str, position: Position) -> Option<HoverInfo>;

    /// Returns the definitions of the symbol at `position`.
    fn definition(&self, uri: &str, position: Position) -> Vec<Location>;

    /// Returns the references to the symbol at `position`.
    fn references(&self, uri: &str, position: Position, include_declaration: bool)
    -> Vec<Location>;

    /// Returns completions at `position`.
    fn completions(&self, uri: &str, position: Position) -> Vec<Completion>;

    /// Returns the outline of a document.
    fn document_symbols(&self, uri: &str) -> Vec<DocumentSymbol>;

    /// Returns the folding ranges of a document.
    fn folding_ranges(&self, uri: &str) -> Vec<FoldingRange>;

    /// Formats a whole document. Returns a single whole-document edit, or
    /// nothing when the text is already formatted.
    fn format(&self, uri: &str, overrides: &FormatterOverrides) -> Vec<TextEdit>;

    /// Returns the selector under the cursor.
    fn selector_at_position(&self, uri: &str, position: Position) -> Option<EcoString>;

    /// Indexes a file read from disk. Ignored while the file is open, since
    /// the editor's text is newer.
    fn index_file_from_disk(&mut self, uri: &str, text: &str);

    /// Drops a file from the index and the document store.
    fn remove_file(&mut self, uri: &str);

    /// Case-insensitive substring search over `Class >> selector`.
    fn search_methods(&self, query: &str) -> Vec<MethodEntry>;
}

/// An in-memory analysis session.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    documents: DocumentManager,
    index: WorkspaceIndex,
    settings: FormatterSettings,
}

impl AnalysisSession {
    /// Creates a session with default formatter settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with the given formatter settings.
    #[must_use]
    pub fn with_settings(settings: FormatterSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Returns the session-wide formatter settings.
    #[must_use]
    pub fn settings(&self) -> &FormatterSettings {
        &self.settings
    }

    /// Replaces the session-wide formatter settings.
    pub fn set_settings(&mut self, settings: FormatterSettings) {
        debug!(?settings, "formatter settings changed");
        self.settings = settings;
    }

    /// Returns the current parse of an open document.
    #[must_use]
    pub fn document(&self, uri: &str) -> Option<&ParsedDocument> {
        self.documents.get(uri)
    }

    /// Returns the workspace index.
    #[must_use]
    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }

    /// Returns the implementors of `selector`.
    #[must_use]
    pub fn implementors(&self, selector: &str) -> Vec<MethodEntry> {
        self.index
            .find_implementors(selector)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Returns the senders of `selector`.
    #[must_use]
    pub fn senders(&self, selector: &str) -> Vec<MethodEntry> {
        self.index.find_senders(selector).into_iter().cloned().collect()
    }

    /// Resolves `position` in `uri` to a document and byte offset.
    fn locate(&self, uri: &str, position: Position) -> Option<(&ParsedDocument, u32)> {
        let document = self.documents.get(uri)?;
        let offset = document.position(position.line, position.column).offset;
        trace!(uri, line = position.line, column = position.column, offset, "query");
        Some((document, offset))
    }
}

impl LanguageService for AnalysisSession {
    fn update_document(
        &mut self,
        uri: &str,
        version: i32,
        text: &str,
        format: DocumentFormat,
    ) -> Vec<Diagnostic> {
        let document = self.documents.update(uri, version, text, format);
        self.index.replace_file(document);
        diagnostic_provider::compute_diagnostics(document)
    }

    fn close_document(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        self.documents
            .get(uri)
            .map(diagnostic_provider::compute_diagnostics)
            .unwrap_or_default()
    }

    fn hover(&self, uri: &str, position: Position) -> Option<HoverInfo> {
        let (document, offset) = self.locate(uri, position)?;
        hover_provider::compute_hover(document, offset, &self.index)
    }

    fn definition(&self, uri: &str, position: Position) -> Vec<Location> {
        self.locate(uri, position)
            .map(|(document, offset)| {
                definition_provider::find_definitions(document, offset, &self.index)
            })
            .unwrap_or_default()
    }

    fn references(
        &self,
        uri: &str,
        position: Position,
        include_declaration: bool,
    ) -> Vec<Location> {
        self.locate(uri, position)
            .map(|(document, offset)| {
                references_provider::find_references(
                    document,
                    offset,
                    &self.index,
                    self.documents.iter(),
                    include_declaration,
                )
            })
            .unwrap_or_default()
    }

    fn completions(&self, uri: &str, position: Position) -> Vec<Completion> {
        self.locate(uri, position)
            .map(|(document, offset)| {
                completion_provider::compute_completions(document, offset, &self.index)
            })
            .unwrap_or_default()
    }

    fn document_symbols(&self, uri: &str) -> Vec<DocumentSymbol> {
        self.documents
            .get(uri)
            .map(document_symbols_provider::compute_document_symbols)
            .unwrap_or_default()
    }

    fn folding_ranges(&self, uri: &str) -> Vec<FoldingRange> {
        self.documents
            .get(uri)
            .map(folding_provider::compute_folding_ranges)
            .unwrap_or_default()
    }

    fn format(&self, uri: &str, overrides: &FormatterOverrides) -> Vec<TextEdit> {
        let Some(document) = self.documents.get(uri) else {
            return Vec::new();
        };
        let settings = self.settings.with_overrides(overrides);
        let formatted = format_document(document, &settings);
        if formatted == document.text {
            return Vec::new();
        }
        let end = document.line_index.end();
        vec![TextEdit {
            range: Range::new(Position::default(), end.into()),
            new_text: formatted,
        }]
    }

    fn selector_at_position(&self, uri: &str, position: Position) -> Option<EcoString> {
        let (document, offset) = self.locate(uri, position)?;
        let region = document.region_at(offset)?;
        match target_at(region, offset)?.kind {
            TargetKind::Selector(selector) => Some(selector),
            _ => None,
        }
    }

    fn index_file_from_disk(&mut self, uri: &str, text: &str) {
        if self.documents.get(uri).is_some() {
            trace!(uri, "skipping disk index of open document");
            return;
        }
        self.index.index_text(uri, text);
    }

    fn remove_file(&mut self, uri: &str) {
        self.documents.remove(uri);
        self.index.remove_file(uri);
    }

    fn search_methods(&self, query: &str) -> Vec<MethodEntry> {
        self.index
            .search_methods(query)
            .into_iter()
            .cloned()
            .collect()
    }
}
