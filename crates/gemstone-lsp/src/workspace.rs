// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Workspace discovery for initial indexing.
//!
//! **DDD Context:** Language Service
//!
//! Walks workspace folders for GemStone sources and reads them so the
//! backend can hand their text to the index. Symbolic links are never
//! followed and unreadable entries are skipped with a log line.

use std::fs;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

/// File extensions indexed on startup.
pub const SOURCE_EXTENSIONS: &[&str] = &["gs", "tpz", "topaz", "st"];

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// A source file read from disk.
#[derive(Debug)]
pub struct SourceFile {
    pub uri: Url,
    pub text: String,
}

/// Returns true for files with one of [`SOURCE_EXTENSIONS`].
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Reads every source file below `roots`.
pub fn scan(roots: &[PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = roots.to_vec();
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(dir = %dir.display(), %error, "cannot read workspace directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_symlink() {
                debug!(path = %path.display(), "skipping symlink");
            } else if file_type.is_dir() {
                let skipped = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name));
                if !skipped {
                    pending.push(path);
                }
            } else if file_type.is_file() && is_source_file(&path) {
                if let Some(file) = read_source(&path) {
                    files.push(file);
                }
            }
        }
    }
    files.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
    debug!(files = files.len(), "workspace scan finished");
    files
}

fn read_source(path: &Path) -> Option<SourceFile> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            warn!(path = %path.display(), %error, "cannot read source file");
            return None;
        }
    };
    let uri = Url::from_file_path(path).ok()?;
    Some(SourceFile { uri, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_source_extensions() {
        assert!(is_source_file(Path::new("install.gs")));
        assert!(is_source_file(Path::new("src/Account.st")));
        assert!(is_source_file(Path::new("a.topaz")));
        assert!(!is_source_file(Path::new("README.md")));
        assert!(!is_source_file(Path::new("gs")));
    }

    #[test]
    fn scan_finds_nested_sources() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src").join("Kernel");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("install.gs"), "run\n1\n%\n").unwrap();
        fs::write(nested.join("Account.st"), "Class { #name : 'Account' }\n").unwrap();
        fs::write(nested.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join(".git").join("x.gs"), "ignored").unwrap();

        let files = scan(&[dir.path().to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .filter_map(|f| f.uri.path_segments()?.next_back().map(str::to_string))
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"install.gs".to_string()));
        assert!(names.contains(&"Account.st".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.gs");
        fs::write(&real, "run\n1\n%\n").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link.gs")).unwrap();
        let files = scan(&[dir.path().to_path_buf()]);
        assert_eq!(files.len(), 1);
    }
}
