// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `gemstone search`, `gemstone senders` and `gemstone implementors`.
//!
//! **DDD Context:** Language Service
//!
//! Each command indexes the given files into a fresh [`WorkspaceIndex`] and
//! prints the matching methods as `path:line: Class >> selector`, or as one
//! JSON object per line.

use std::collections::HashMap;
use std::io::Write;

use camino::Utf8PathBuf;
use gemstone_core::language_service::{MethodEntry, WorkspaceIndex};
use miette::{IntoDiagnostic, Result};
use tracing::debug;

use super::OutputFormat;
use crate::paths::{collect_source_files, file_uri, read_source};

/// Which index query to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// Substring search over `Class >> selector`.
    Search(&'a str),
    /// Methods sending a selector.
    Senders(&'a str),
    /// Methods implementing a selector.
    Implementors(&'a str),
}

/// An index over files on disk, remembering each URI's path for display.
struct DiskIndex {
    index: WorkspaceIndex,
    paths: HashMap<String, Utf8PathBuf>,
}

impl DiskIndex {
    fn load(paths: &[Utf8PathBuf]) -> Result<Self> {
        let mut index = WorkspaceIndex::new();
        let mut uris = HashMap::new();
        for file in collect_source_files(paths)? {
            let text = read_source(&file)?;
            let uri = file_uri(&file);
            index.index_text(&uri, &text);
            uris.insert(uri, file);
        }
        debug!(files = index.file_count(), "index loaded");
        Ok(Self { index, paths: uris })
    }

    fn query(&self, query: Query<'_>) -> Vec<&MethodEntry> {
        match query {
            Query::Search(text) => self.index.search_methods(text),
            Query::Senders(selector) => self.index.find_senders(selector),
            Query::Implementors(selector) => self.index.find_implementors(selector),
        }
    }

    fn display_path(&self, entry: &MethodEntry) -> String {
        self.paths
            .get(entry.uri.as_str())
            .map_or_else(|| entry.uri.to_string(), ToString::to_string)
    }
}

/// Runs `query` over `paths` and prints the matches to stdout.
pub fn run_query(paths: &[Utf8PathBuf], query: Query<'_>, format: OutputFormat) -> Result<()> {
    let index = DiskIndex::load(paths)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let count = write_matches(&index, query, format, &mut out)?;
    if count == 0 {
        eprintln!("no matching methods");
    }
    Ok(())
}

fn write_matches(
    index: &DiskIndex,
    query: Query<'_>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<usize> {
    let mut matches = index.query(query);
    matches.sort_by(|a, b| {
        (a.uri.as_str(), a.start_line).cmp(&(b.uri.as_str(), b.start_line))
    });
    for entry in &matches {
        let path = index.display_path(entry);
        match format {
            OutputFormat::Text => writeln!(
                out,
                "{path}:{}: {}",
                entry.pattern.start.line + 1,
                entry.display_name()
            ),
            OutputFormat::Json => writeln!(
                out,
                "{}",
                serde_json::json!({
                    "file": path,
                    "line": entry.pattern.start.line + 1,
                    "selector": entry.selector.as_str(),
                    "class": entry.class_name.as_deref(),
                    "classSide": entry.class_side,
                    "category": entry.category.as_deref(),
                })
            ),
        }
        .into_diagnostic()?;
    }
    Ok(matches.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 path");
        std::fs::write(
            root.join("account.gs"),
            "method: Account\nbalance\n  ^balance\n%\nmethod: Account\nprintOn: aStream\n  aStream print: self balance\n%\n",
        )
        .unwrap();
        std::fs::write(
            root.join("Teller.st"),
            "Class {\n\t#name : 'Teller'\n}\n\n{ #category : 'reporting' }\nTeller >> report [\n\t^Account new balance\n]\n",
        )
        .unwrap();
        (dir, root)
    }

    fn render(query: Query<'_>, format: OutputFormat) -> String {
        let (_dir, root) = workspace();
        let index = DiskIndex::load(&[root.clone()]).unwrap();
        let mut out = Vec::new();
        write_matches(&index, query, format, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .replace(&format!("{}/", root.canonicalize_utf8().unwrap()), "")
            .replace(&format!("{root}/"), "")
    }

    #[test]
    fn implementors_list_declaring_methods() {
        assert_eq!(
            render(Query::Implementors("balance"), OutputFormat::Text),
            "account.gs:2: Account >> balance\n"
        );
    }

    #[test]
    fn senders_span_formats() {
        assert_eq!(
            render(Query::Senders("balance"), OutputFormat::Text),
            "Teller.st:6: Teller >> report\naccount.gs:6: Account >> printOn:\n"
        );
    }

    #[test]
    fn search_is_case_insensitive() {
        let found = render(Query::Search("account >> P"), OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(found.trim()).unwrap();
        assert_eq!(json["selector"], "printOn:");
        assert_eq!(json["category"], serde_json::Value::Null);
        assert_eq!(json["line"], 6);
    }

    #[test]
    fn unknown_selectors_match_nothing() {
        assert_eq!(render(Query::Senders("frobnicate"), OutputFormat::Text), "");
    }
}
