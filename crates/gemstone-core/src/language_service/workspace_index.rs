// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Cross-file index of implementors, senders and classes.
//!
//! **DDD Context:** Language Service — Aggregate Root
//!
//! `WorkspaceIndex` holds one [`MethodEntry`] per cleanly parsed method
//! region of every indexed file, plus [`ClassEntry`] records for Tonel
//! headers and `subclass:` definitions. Updates are per file and always
//! remove-then-reinsert, so a file's entries are never partially patched.
//!
//! ```text
//! WorkspaceIndex (Aggregate Root)
//! ├── per-file entries (methods, classes)
//! ├── implementors: selector -> files declaring it
//! └── senders:      selector -> files sending it
//! ```
//!
//! Cross-referencing is purely by selector name; receiver types are never
//! resolved.

use std::collections::{BTreeSet, HashMap, HashSet};

use ecow::EcoString;
use tracing::debug;

use crate::ast::{Expression, Literal, Message, Primary, Statement};
use crate::ast_walker::walk_method;
use crate::document::{DocumentFormat, ParsedDocument, ParsedRegion};
use crate::segment::{HeaderKind, RegionKind};

use super::value_objects::Range;

/// One indexed method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    /// The file declaring the method.
    pub uri: EcoString,
    /// The declared selector.
    pub selector: EcoString,
    /// The declaring class, when the format records one.
    pub class_name: Option<EcoString>,
    /// True for class-side methods.
    pub class_side: bool,
    /// The method category, when known.
    pub category: Option<EcoString>,
    /// First line of the method region (0-based).
    pub start_line: u32,
    /// Last line of the method region (0-based, inclusive).
    pub end_line: u32,
    /// The message pattern's range.
    pub pattern: Range,
    /// Every selector the method body sends.
    pub sent_selectors: BTreeSet<EcoString>,
}

impl MethodEntry {
    /// Returns `Account >> deposit:` or `Account class >> new`, or the bare
    /// selector when the class is unknown.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.class_name {
            Some(class_name) if self.class_side => {
                format!("{class_name} class >> {}", self.selector)
            }
            Some(class_name) => format!("{class_name} >> {}", self.selector),
            None => self.selector.to_string(),
        }
    }
}

/// One indexed class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    /// The file declaring the class.
    pub uri: EcoString,
    /// The class name.
    pub name: EcoString,
    /// The superclass name, when declared.
    pub superclass: Option<EcoString>,
    /// The class category, when declared.
    pub category: Option<EcoString>,
    /// First line of the definition (0-based).
    pub start_line: u32,
    /// Last line of the definition (0-based, inclusive).
    pub end_line: u32,
}

#[derive(Debug, Clone, Default)]
struct FileEntries {
    methods: Vec<MethodEntry>,
    classes: Vec<ClassEntry>,
}

/// The workspace-wide index.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceIndex {
    files: HashMap<EcoString, FileEntries>,
    implementors: HashMap<EcoString, HashSet<EcoString>>,
    senders: HashMap<EcoString, HashSet<EcoString>>,
}

impl WorkspaceIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry of `document.uri` with entries built from
    /// `document`.
    pub fn replace_file(&mut self, document: &ParsedDocument) {
        self.remove_file(&document.uri);
        let entries = index_document(document);
        if entries.methods.is_empty() && entries.classes.is_empty() {
            return;
        }
        for method in &entries.methods {
            self.implementors
                .entry(method.selector.clone())
                .or_default()
                .insert(document.uri.clone());
            for sent in &method.sent_selectors {
                self.senders
                    .entry(sent.clone())
                    .or_default()
                    .insert(document.uri.clone());
            }
        }
        debug!(
            uri = %document.uri,
            methods = entries.methods.len(),
            classes = entries.classes.len(),
            "file indexed"
        );
        self.files.insert(document.uri.clone(), entries);
    }

    /// Parses `text` and indexes it under `uri`.
    pub fn index_text(&mut self, uri: &str, text: &str) {
        let document = ParsedDocument::parse(uri, 0, text, DocumentFormat::from_uri(uri));
        self.replace_file(&document);
    }

    /// Drops every entry of `uri`. Returns true if the file was indexed.
    pub fn remove_file(&mut self, uri: &str) -> bool {
        let Some(entries) = self.files.remove(uri) else {
            return false;
        };
        for method in &entries.methods {
            unlink(&mut self.implementors, &method.selector, uri);
            for sent in &method.sent_selectors {
                unlink(&mut self.senders, sent, uri);
            }
        }
        debug!(
            uri,
            methods = entries.methods.len(),
            classes = entries.classes.len(),
            "file removed from index"
        );
        true
    }

    /// Returns every method declaring `selector`.
    #[must_use]
    pub fn find_implementors(&self, selector: &str) -> Vec<&MethodEntry> {
        self.lookup(&self.implementors, selector, |m| m.selector == selector)
    }

    /// Returns every method whose body sends `selector`.
    #[must_use]
    pub fn find_senders(&self, selector: &str) -> Vec<&MethodEntry> {
        self.lookup(&self.senders, selector, |m| {
            m.sent_selectors.contains(selector)
        })
    }

    /// Returns every definition of the class `name`.
    #[must_use]
    pub fn find_class(&self, name: &str) -> Vec<&ClassEntry> {
        let mut found: Vec<&ClassEntry> = self
            .files
            .values()
            .flat_map(|f| f.classes.iter())
            .filter(|c| c.name == name)
            .collect();
        found.sort_by(|a, b| (&a.uri, a.start_line).cmp(&(&b.uri, b.start_line)));
        found
    }

    /// Returns every implemented selector, sorted.
    #[must_use]
    pub fn implemented_selectors(&self) -> Vec<&EcoString> {
        let mut selectors: Vec<&EcoString> = self.implementors.keys().collect();
        selectors.sort();
        selectors
    }

    /// Returns every known class name, sorted and deduplicated.
    #[must_use]
    pub fn class_names(&self) -> Vec<&EcoString> {
        let names: BTreeSet<&EcoString> = self
            .files
            .values()
            .flat_map(|f| f.classes.iter().map(|c| &c.name))
            .chain(
                self.files
                    .values()
                    .flat_map(|f| f.methods.iter().filter_map(|m| m.class_name.as_ref())),
            )
            .collect();
        names.into_iter().collect()
    }

    /// Case-insensitive substring search over `Class >> selector`.
    ///
    /// An empty query matches every method.
    #[must_use]
    pub fn search_methods(&self, query: &str) -> Vec<&MethodEntry> {
        let needle = query.to_lowercase();
        let mut found: Vec<&MethodEntry> = self
            .files
            .values()
            .flat_map(|f| f.methods.iter())
            .filter(|m| m.display_name().to_lowercase().contains(&needle))
            .collect();
        found.sort_by(|a, b| {
            (&a.class_name, &a.selector, &a.uri).cmp(&(&b.class_name, &b.selector, &b.uri))
        });
        found
    }

    /// Returns the number of indexed files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns true if `uri` has entries.
    #[must_use]
    pub fn contains_file(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }

    fn lookup<'a>(
        &'a self,
        table: &HashMap<EcoString, HashSet<EcoString>>,
        selector: &str,
        keep: impl Fn(&MethodEntry) -> bool,
    ) -> Vec<&'a MethodEntry> {
        let Some(uris) = table.get(selector) else {
            return Vec::new();
        };
        let mut uris: Vec<&EcoString> = uris.iter().collect();
        uris.sort();
        uris.into_iter()
            .filter_map(|uri| self.files.get(uri))
            .flat_map(|f| f.methods.iter())
            .filter(|m| keep(m))
            .collect()
    }
}

fn unlink(table: &mut HashMap<EcoString, HashSet<EcoString>>, selector: &str, uri: &str) {
    if let Some(uris) = table.get_mut(selector) {
        uris.remove(uri);
        if uris.is_empty() {
            table.remove(selector);
        }
    }
}

// ── Entry construction ───────────────────────────────────────────────────────

fn index_document(document: &ParsedDocument) -> FileEntries {
    let mut entries = FileEntries::default();
    for parsed in &document.regions {
        let region = &parsed.region;
        match region.kind {
            RegionKind::Method => {
                if let Some(entry) = method_entry(&document.uri, parsed) {
                    entries.methods.push(entry);
                }
            }
            RegionKind::Code => {
                if parsed.is_clean() {
                    entries.classes.extend(class_definitions(&document.uri, parsed));
                }
            }
            RegionKind::Opaque => {
                if let Some(header) = &region.header {
                    if header.kind != HeaderKind::Package {
                        entries.classes.push(ClassEntry {
                            uri: document.uri.clone(),
                            name: header.name.clone(),
                            superclass: header.superclass.clone(),
                            category: header.category.clone(),
                            start_line: region.start_line,
                            end_line: region.end_line,
                        });
                    }
                }
            }
        }
    }
    entries
}

/// Builds the entry for a cleanly parsed method region.
fn method_entry(uri: &EcoString, parsed: &ParsedRegion) -> Option<MethodEntry> {
    if !parsed.is_clean() {
        return None;
    }
    let method = parsed.method.as_ref()?;
    let mut sent_selectors = BTreeSet::new();
    walk_method(method, &mut |expr: &Expression| {
        for message in expr.messages.iter().chain(&expr.cascades) {
            sent_selectors.insert(message.selector().clone());
        }
    });
    Some(MethodEntry {
        uri: uri.clone(),
        selector: method.selector().clone(),
        class_name: parsed.region.class_name.clone(),
        class_side: parsed.region.class_side,
        category: parsed.region.category.clone(),
        start_line: parsed.region.start_line,
        end_line: parsed.region.end_line,
        pattern: method.pattern.span().into(),
        sent_selectors,
    })
}

/// Finds `Superclass subclass: 'Name' ...` statements in a code region.
fn class_definitions(uri: &EcoString, parsed: &ParsedRegion) -> Vec<ClassEntry> {
    let Some(body) = parsed.statements.as_ref() else {
        return Vec::new();
    };
    body.statements
        .iter()
        .filter_map(Statement::innermost_expression)
        .filter_map(|expr| {
            let (name, superclass) = subclass_send(expr)?;
            Some(ClassEntry {
                uri: uri.clone(),
                name,
                superclass,
                category: category_argument(expr),
                start_line: expr.span.start().line,
                end_line: expr.span.end().line,
            })
        })
        .collect()
}

/// Returns the class name and superclass of a `subclass:` family send.
fn subclass_send(expr: &Expression) -> Option<(EcoString, Option<EcoString>)> {
    let Some(Message::Keyword(keyword)) = expr.messages.last() else {
        return None;
    };
    let first = keyword.parts.first()?;
    if !first.keyword.name.to_ascii_lowercase().ends_with("subclass:") {
        return None;
    }
    let name = match &first.value.receiver {
        Primary::Literal(literal) if first.value.is_primary() => match &literal.value {
            Literal::String(s) | Literal::Symbol(s) => s.clone(),
            _ => return None,
        },
        _ => return None,
    };
    let superclass = match (&expr.receiver, expr.messages.len()) {
        (Primary::Variable(v), 1) => Some(v.name.clone()),
        (Primary::Path(p), 1) => p.segments.last().map(|s| s.name.clone()),
        _ => None,
    };
    Some((name, superclass))
}

fn category_argument(expr: &Expression) -> Option<EcoString> {
    let keyword = expr.keyword_message()?;
    keyword
        .parts
        .iter()
        .find(|part| part.keyword.name == "category:")
        .and_then(|part| match &part.value.receiver {
            Primary::Literal(literal) => match &literal.value {
                Literal::String(s) | Literal::Symbol(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        })
}
