// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! LSP server implementation.
//!
//! **DDD Context:** Language Service
//!
//! Delegates all IDE operations to an [`AnalysisSession`]. Maps between LSP
//! protocol types and `gemstone-core` types, and adds the `gemstone/*`
//! custom requests used by the editor integration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use gemstone_core::document::DocumentFormat;
use gemstone_core::format::FormatterSettings;
use gemstone_core::language_service::{AnalysisSession, DocumentSymbol, LanguageService, Location};
use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, DocumentFormattingParams,
    DocumentSymbolParams, DocumentSymbolResponse, FoldingRange, FoldingRangeParams,
    FoldingRangeProviderCapability, GotoDefinitionParams, GotoDefinitionResponse, Hover,
    HoverContents, HoverParams, HoverProviderCapability, InitializeParams, InitializeResult,
    InitializedParams, MarkupContent, MarkupKind, MessageType, OneOf, ReferenceParams,
    ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions, TextDocumentSyncSaveOptions, TextEdit, Url,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use crate::convert::{
    formatting_overrides, to_core_position, to_lsp_completion_kind, to_lsp_diagnostic,
    to_lsp_folding_kind, to_lsp_range, to_lsp_symbol_kind,
};
use crate::protocol::{
    IndexFileParams, MethodInfo, RemoveFileParams, SearchMethodsParams, SelectorAtPositionParams,
    SelectorParams,
};
use crate::workspace;

const DIAGNOSTIC_DEBOUNCE_MS: u64 = 150;

/// LSP backend wrapping an [`AnalysisSession`].
pub struct Backend {
    /// LSP client handle for sending notifications and responses.
    client: Client,
    /// The analysis session, protected by a mutex so index updates serialize.
    session: Mutex<AnalysisSession>,
    /// Workspace folders recorded at `initialize` and scanned at `initialized`.
    roots: Mutex<Vec<PathBuf>>,
    /// Monotonic generation counter used to debounce `didChange` diagnostics per URI.
    diagnostic_generation: Mutex<HashMap<Url, u64>>,
}

impl Backend {
    /// Creates a new `Backend` with the given LSP client handle.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            session: Mutex::new(AnalysisSession::new()),
            roots: Mutex::new(Vec::new()),
            diagnostic_generation: Mutex::new(HashMap::new()),
        }
    }

    fn session(&self) -> MutexGuard<'_, AnalysisSession> {
        self.session.lock().expect("session lock poisoned")
    }

    /// Publishes the current diagnostics of an open document.
    async fn publish_diagnostics(&self, uri: &Url) {
        let published = {
            let session = self.session();
            session.document(uri.as_str()).map(|document| {
                let diagnostics = session
                    .diagnostics(uri.as_str())
                    .iter()
                    .map(|d| to_lsp_diagnostic(d, &document.text))
                    .collect::<Vec<_>>();
                (diagnostics, document.version)
            })
        };
        if let Some((diagnostics, version)) = published {
            self.client
                .publish_diagnostics(uri.clone(), diagnostics, Some(version))
                .await;
        }
    }

    fn update(&self, uri: &Url, version: i32, text: &str) {
        let format = DocumentFormat::from_uri(uri.as_str());
        let mut session = self.session();
        let diagnostics = session.update_document(uri.as_str(), version, text, format);
        debug!(
            uri = %uri,
            version,
            format = format.as_str(),
            diagnostics = diagnostics.len(),
            "document updated"
        );
    }

    /// Converts core locations to LSP locations, translating columns for
    /// documents that are open.
    fn to_lsp_locations(
        session: &AnalysisSession,
        locations: Vec<Location>,
    ) -> Vec<tower_lsp::lsp_types::Location> {
        locations
            .into_iter()
            .filter_map(|location| {
                let uri = Url::parse(&location.uri).ok()?;
                let text = session.document(&location.uri).map(|d| d.text.as_str());
                Some(tower_lsp::lsp_types::Location {
                    uri,
                    range: to_lsp_range(location.range, text),
                })
            })
            .collect()
    }

    fn apply_settings(&self, settings: FormatterSettings) {
        self.session().set_settings(settings);
    }

    /// `gemstone/selectorAtPosition`: the selector under the cursor, or null.
    pub async fn selector_at_position(
        &self,
        params: SelectorAtPositionParams,
    ) -> Result<Option<String>> {
        let uri = params.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let position = to_core_position(params.position, &document.text);
        Ok(session
            .selector_at_position(uri, position)
            .map(|s| s.to_string()))
    }

    /// `gemstone/searchMethods`: case-insensitive search over `Class >> selector`.
    pub async fn search_methods(&self, params: SearchMethodsParams) -> Result<Vec<MethodInfo>> {
        let session = self.session();
        Ok(session
            .search_methods(&params.query)
            .iter()
            .map(MethodInfo::from_entry)
            .collect())
    }

    /// `gemstone/senders`: methods that send a selector.
    pub async fn senders(&self, params: SelectorParams) -> Result<Vec<MethodInfo>> {
        let session = self.session();
        Ok(session
            .senders(&params.selector)
            .iter()
            .map(MethodInfo::from_entry)
            .collect())
    }

    /// `gemstone/implementors`: methods that implement a selector.
    pub async fn implementors(&self, params: SelectorParams) -> Result<Vec<MethodInfo>> {
        let session = self.session();
        Ok(session
            .implementors(&params.selector)
            .iter()
            .map(MethodInfo::from_entry)
            .collect())
    }

    /// `gemstone/indexFile`: indexes text the editor layer read itself.
    pub async fn index_file(&self, params: IndexFileParams) -> Result<()> {
        debug!(uri = %params.uri, "indexFile");
        self.session().index_file_from_disk(&params.uri, &params.text);
        Ok(())
    }

    /// `gemstone/removeFile`: forgets a deleted file.
    pub async fn remove_file(&self, params: RemoveFileParams) -> Result<()> {
        debug!(uri = %params.uri, "removeFile");
        self.session().remove_file(&params.uri);
        Ok(())
    }
}

/// Reads formatter settings from a `{ "formatter": { ... } }` object.
fn formatter_settings(value: &Value) -> Option<FormatterSettings> {
    let formatter = value.get("formatter")?;
    match serde_json::from_value(formatter.clone()) {
        Ok(settings) => Some(settings),
        Err(error) => {
            warn!(%error, "ignoring invalid formatter settings");
            None
        }
    }
}

/// Converts an outline entry to a flat LSP `DocumentSymbol`.
#[expect(deprecated, reason = "LSP DocumentSymbol requires deprecated field")]
fn to_lsp_symbol(symbol: DocumentSymbol, text: &str) -> tower_lsp::lsp_types::DocumentSymbol {
    tower_lsp::lsp_types::DocumentSymbol {
        name: symbol.name.to_string(),
        detail: symbol.detail.map(|d| d.to_string()),
        kind: to_lsp_symbol_kind(symbol.kind),
        tags: None,
        deprecated: None,
        range: to_lsp_range(symbol.range, Some(text)),
        selection_range: to_lsp_range(symbol.selection_range, Some(text)),
        children: None,
    }
}

/// Workspace folders from the initialize request, falling back to the root URI.
fn workspace_roots(params: &InitializeParams) -> Vec<PathBuf> {
    if let Some(folders) = &params.workspace_folders {
        return folders
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
    }
    #[expect(deprecated, reason = "older clients only send rootUri")]
    let root = params.root_uri.as_ref();
    root.and_then(|uri| uri.to_file_path().ok())
        .into_iter()
        .collect()
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    /// Reports server capabilities to the client during handshake.
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(settings) = params
            .initialization_options
            .as_ref()
            .and_then(formatter_settings)
        {
            self.apply_settings(settings);
        }
        *self.roots.lock().expect("roots lock poisoned") = workspace_roots(&params);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                        ..Default::default()
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![" ".into(), ":".into()]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "gemstone-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
        })
    }

    /// Indexes the workspace once the client acknowledges initialization.
    async fn initialized(&self, _: InitializedParams) {
        let roots = self.roots.lock().expect("roots lock poisoned").clone();
        let files = match tokio::task::spawn_blocking(move || workspace::scan(&roots)).await {
            Ok(files) => files,
            Err(error) => {
                warn!(%error, "workspace scan failed");
                Vec::new()
            }
        };
        {
            let mut session = self.session();
            for file in &files {
                session.index_file_from_disk(file.uri.as_str(), &file.text);
            }
        }
        info!(files = files.len(), "workspace indexed");
        self.client
            .log_message(
                MessageType::INFO,
                format!("GemStone language server ready ({} files indexed)", files.len()),
            )
            .await;
    }

    /// Handles a graceful shutdown request from the client.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    /// Parses a newly opened document and publishes diagnostics.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.update(&document.uri, document.version, &document.text);
        self.publish_diagnostics(&document.uri).await;
    }

    /// Re-parses a document after edits and republishes diagnostics.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.update(&uri, params.text_document.version, &change.text);

        let generation = {
            let mut generations = self
                .diagnostic_generation
                .lock()
                .expect("diagnostic_generation lock poisoned");
            let entry = generations.entry(uri.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        tokio::time::sleep(Duration::from_millis(DIAGNOSTIC_DEBOUNCE_MS)).await;

        let is_latest = {
            let generations = self
                .diagnostic_generation
                .lock()
                .expect("diagnostic_generation lock poisoned");
            generations.get(&uri).copied() == Some(generation)
        };

        if is_latest {
            self.publish_diagnostics(&uri).await;
        }
    }

    /// Forgets a closed document and clears its diagnostics. Its index
    /// entries stay so workspace queries still see the file.
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.session().close_document(uri.as_str());
        self.diagnostic_generation
            .lock()
            .expect("diagnostic_generation lock poisoned")
            .remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    /// Handles save notifications and republishes diagnostics.
    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(uri = %uri, "did_save");
        self.publish_diagnostics(&uri).await;
    }

    /// Picks up `gemstone.formatter` settings.
    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if let Some(settings) = params.settings.get("gemstone").and_then(formatter_settings) {
            self.apply_settings(settings);
        }
    }

    /// Returns completion items for the cursor position.
    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let uri = position.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let items: Vec<CompletionItem> = session
            .completions(uri, to_core_position(position.position, &document.text))
            .into_iter()
            .map(|c| CompletionItem {
                label: c.label.to_string(),
                kind: Some(to_lsp_completion_kind(c.kind)),
                detail: c.detail.map(|d| d.to_string()),
                ..Default::default()
            })
            .collect();

        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    /// Returns hover markdown for the symbol at the cursor.
    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let uri = position.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let hover = session.hover(uri, to_core_position(position.position, &document.text));
        Ok(hover.map(|h| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: h.contents,
            }),
            range: Some(to_lsp_range(h.range, Some(&document.text))),
        }))
    }

    /// Navigates to the declaration, implementors or class of the symbol at the cursor.
    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let uri = position.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let definitions =
            session.definition(uri, to_core_position(position.position, &document.text));
        let mut locations = Self::to_lsp_locations(&session, definitions);
        Ok(match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        })
    }

    /// Finds all references to the symbol at the cursor.
    async fn references(
        &self,
        params: ReferenceParams,
    ) -> Result<Option<Vec<tower_lsp::lsp_types::Location>>> {
        let position = params.text_document_position;
        let uri = position.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let references = session.references(
            uri,
            to_core_position(position.position, &document.text),
            params.context.include_declaration,
        );
        let locations = Self::to_lsp_locations(&session, references);
        Ok((!locations.is_empty()).then_some(locations))
    }

    /// Returns the document outline.
    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let symbols: Vec<_> = session
            .document_symbols(uri)
            .into_iter()
            .map(|s| to_lsp_symbol(s, &document.text))
            .collect();

        if symbols.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DocumentSymbolResponse::Nested(symbols)))
        }
    }

    /// Returns folding ranges for regions, blocks and comments.
    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        let ranges = self
            .session()
            .folding_ranges(params.text_document.uri.as_str())
            .into_iter()
            .map(|r| FoldingRange {
                start_line: r.start_line,
                end_line: r.end_line,
                kind: Some(to_lsp_folding_kind(r.kind)),
                ..Default::default()
            })
            .collect::<Vec<_>>();
        Ok((!ranges.is_empty()).then_some(ranges))
    }

    /// Formats the whole document with the editor's indentation options.
    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri.as_str();
        let session = self.session();
        let Some(document) = session.document(uri) else {
            return Ok(None);
        };
        let edits = session
            .format(uri, &formatting_overrides(&params.options))
            .into_iter()
            .map(|edit| TextEdit {
                range: to_lsp_range(edit.range, Some(&document.text)),
                new_text: edit.new_text,
            })
            .collect();
        Ok(Some(edits))
    }
}
