// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsed documents and the per-session document store.
//!
//! **DDD Context:** Source Analysis
//!
//! [`ParsedDocument::parse`] segments a document by its [`DocumentFormat`],
//! then lexes and parses every Smalltalk region at the region's origin so
//! that all positions are whole-document positions. [`DocumentManager`]
//! keeps the latest parse of each open document, replacing it wholesale on
//! every edit.

use std::collections::HashMap;

use ecow::EcoString;
use tracing::{debug, warn};

use crate::ast::{Method, MethodBody};
use crate::segment::{Region, RegionKind, segment_tonel, segment_topaz};
use crate::source_analysis::{
    Diagnostic, LineIndex, Position, Span, Token, TokenKind, parse, parse_code, tokenize_at,
};
use crate::uri::{SmalltalkUri, UriTarget};

/// How a document's text is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    /// A Topaz script (`.gs`, `.tpz`, `.topaz`).
    #[default]
    Topaz,
    /// A Tonel class file (`.st`).
    Tonel,
    /// A single method or class definition addressed by a `gemstone:` URI.
    SmalltalkUri,
}

impl DocumentFormat {
    /// Picks a format from a document URI or path.
    ///
    /// # Examples
    ///
    /// ```
    /// use gemstone_core::document::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_uri("file:///src/Account.st"), DocumentFormat::Tonel);
    /// assert_eq!(DocumentFormat::from_uri("file:///src/install.gs"), DocumentFormat::Topaz);
    /// assert_eq!(
    ///     DocumentFormat::from_uri("gemstone://1/UserGlobals/Account/definition"),
    ///     DocumentFormat::SmalltalkUri
    /// );
    /// ```
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        if SmalltalkUri::is_smalltalk_uri(uri) {
            return Self::SmalltalkUri;
        }
        let path = uri.split(['?', '#']).next().unwrap_or(uri);
        let extension = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("st") => Self::Tonel,
            _ => Self::Topaz,
        }
    }

    /// Returns the wire name used by the editor protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Topaz => "topaz",
            Self::Tonel => "tonel",
            Self::SmalltalkUri => "smalltalk-uri",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "topaz" => Some(Self::Topaz),
            "tonel" => Some(Self::Tonel),
            "smalltalk-uri" | "smalltalk" => Some(Self::SmalltalkUri),
            _ => None,
        }
    }
}

/// One region with its tokens and parse results.
#[derive(Debug, Clone)]
pub struct ParsedRegion {
    /// The segmented region.
    pub region: Region,
    /// All tokens of the region (trivia included), in document coordinates.
    pub tokens: Vec<Token>,
    /// The method, for method regions.
    pub method: Option<Method>,
    /// The statement list, for code regions.
    pub statements: Option<MethodBody>,
    /// Lexical and syntax diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedRegion {
    /// Lexes and parses `region` (opaque regions are left untouched).
    #[must_use]
    pub fn parse(region: Region) -> Self {
        let mut parsed = Self {
            tokens: Vec::new(),
            method: None,
            statements: None,
            diagnostics: Vec::new(),
            region,
        };
        if !parsed.region.is_smalltalk() {
            return parsed;
        }

        parsed.tokens = tokenize_at(&parsed.region.code, parsed.region.span.start());
        match parsed.region.kind {
            RegionKind::Method => {
                let (method, diagnostics) = parse(parsed.tokens.clone());
                parsed.method = method;
                parsed.diagnostics = diagnostics;
            }
            RegionKind::Code => {
                let (body, diagnostics) = parse_code(parsed.tokens.clone());
                parsed.statements = Some(body);
                parsed.diagnostics = diagnostics;
            }
            RegionKind::Opaque => {}
        }
        parsed
    }

    /// Returns true if the region parsed without errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the statements of the region, from the method or code body.
    #[must_use]
    pub fn body(&self) -> Option<&MethodBody> {
        self.method
            .as_ref()
            .map(|m| &m.body)
            .or(self.statements.as_ref())
    }

    /// Returns the non-trivia token whose span touches `offset`.
    ///
    /// When the offset sits between two tokens the one starting at it wins.
    #[must_use]
    pub fn token_at(&self, offset: u32) -> Option<&Token> {
        let mut touching = self
            .tokens
            .iter()
            .filter(|t| !t.is_trivia() && t.kind() != TokenKind::Eof && t.span().touches(offset));
        let first = touching.next()?;
        Some(touching.next().unwrap_or(first))
    }
}

/// A whole document after segmentation and parsing.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The document URI.
    pub uri: EcoString,
    /// The editor version this parse reflects.
    pub version: i32,
    /// The layout used to segment the text.
    pub format: DocumentFormat,
    /// The full text.
    pub text: String,
    /// Line table for position conversion.
    pub line_index: LineIndex,
    /// Regions in document order.
    pub regions: Vec<ParsedRegion>,
}

impl ParsedDocument {
    /// Segments, lexes and parses `text`.
    #[must_use]
    pub fn parse(uri: &str, version: i32, text: &str, format: DocumentFormat) -> Self {
        let regions = segment(uri, text, format)
            .into_iter()
            .map(ParsedRegion::parse)
            .collect();
        Self {
            uri: uri.into(),
            version,
            format,
            text: text.to_string(),
            line_index: LineIndex::new(text),
            regions,
        }
    }

    /// Iterates over every diagnostic in document order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.regions.iter().flat_map(|r| r.diagnostics.iter())
    }

    /// Returns the Smalltalk region containing `offset`.
    #[must_use]
    pub fn region_at(&self, offset: u32) -> Option<&ParsedRegion> {
        self.regions
            .iter()
            .find(|r| r.region.is_smalltalk() && r.region.span.touches(offset))
    }

    /// Returns the Smalltalk regions.
    pub fn smalltalk_regions(&self) -> impl Iterator<Item = &ParsedRegion> {
        self.regions.iter().filter(|r| r.region.is_smalltalk())
    }

    /// Resolves an editor `(line, column)` pair.
    #[must_use]
    pub fn position(&self, line: u32, column: u32) -> Position {
        self.line_index.position(line, column)
    }
}

/// Splits `text` into regions according to `format`.
fn segment(uri: &str, text: &str, format: DocumentFormat) -> Vec<Region> {
    match format {
        DocumentFormat::Topaz => segment_topaz(text),
        DocumentFormat::Tonel => segment_tonel(text),
        DocumentFormat::SmalltalkUri => {
            if text.is_empty() {
                return Vec::new();
            }
            let span = Span::new(Position::default(), LineIndex::new(text).end());
            match SmalltalkUri::parse(uri) {
                Ok(parsed) => {
                    let (kind, class_side, category) = match parsed.target {
                        UriTarget::Method {
                            class_side,
                            category,
                            ..
                        } => (RegionKind::Method, class_side, Some(category)),
                        UriTarget::Definition => (RegionKind::Code, false, None),
                    };
                    let mut region = Region::new(kind, span, text);
                    region.class_name = Some(parsed.class_name);
                    region.class_side = class_side;
                    region.category = category;
                    vec![region]
                }
                Err(error) => {
                    warn!(%error, "treating unaddressable gemstone: document as a method");
                    vec![Region::new(RegionKind::Method, span, text)]
                }
            }
        }
    }
}

/// The latest parse of every open document, keyed by URI.
///
/// Owned by a session object rather than held globally, so independent
/// sessions (and tests) never share state.
#[derive(Debug, Default)]
pub struct DocumentManager {
    documents: HashMap<EcoString, ParsedDocument>,
}

impl DocumentManager {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-parses a document and replaces any previous parse.
    pub fn update(
        &mut self,
        uri: &str,
        version: i32,
        text: &str,
        format: DocumentFormat,
    ) -> &ParsedDocument {
        let document = ParsedDocument::parse(uri, version, text, format);
        debug!(
            uri,
            version,
            regions = document.regions.len(),
            diagnostics = document.diagnostics().count(),
            "document updated"
        );
        let key = EcoString::from(uri);
        self.documents.insert(key.clone(), document);
        &self.documents[&key]
    }

    /// Returns the current parse of `uri`.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&ParsedDocument> {
        self.documents.get(uri)
    }

    /// Forgets `uri`, returning its last parse.
    pub fn remove(&mut self, uri: &str) -> Option<ParsedDocument> {
        let removed = self.documents.remove(uri);
        if removed.is_some() {
            debug!(uri, "document removed");
        }
        removed
    }

    /// Iterates over all open documents.
    pub fn iter(&self) -> impl Iterator<Item = &ParsedDocument> {
        self.documents.values()
    }
}
