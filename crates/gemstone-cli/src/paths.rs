// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source discovery and configuration loading for the CLI.
//!
//! Command arguments name files or directories. Directories are walked
//! recursively for GemStone sources; symlinks are skipped to avoid cycles.

use std::collections::BTreeSet;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use gemstone_core::format::FormatterSettings;
use miette::{Context, IntoDiagnostic, Result};

/// Extensions recognised as GemStone sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["gs", "tpz", "topaz", "st"];

/// Returns true when `path` has a GemStone source extension.
pub fn is_source_file(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Expands `paths` into a sorted, de-duplicated list of source files.
///
/// An explicitly named file must have a source extension; a missing path
/// or an empty result is an error.
pub fn collect_source_files(paths: &[Utf8PathBuf]) -> Result<Vec<Utf8PathBuf>> {
    let mut files = BTreeSet::new();
    for path in paths {
        if path.is_file() {
            if !is_source_file(path) {
                miette::bail!(
                    "File '{path}' is not a GemStone source file (expected {})",
                    SOURCE_EXTENSIONS.join(", ")
                );
            }
            files.insert(path.clone());
        } else if path.is_dir() {
            collect_recursive(path, &mut files)?;
        } else {
            miette::bail!("Path '{path}' does not exist");
        }
    }
    if files.is_empty() {
        miette::bail!("No GemStone source files found");
    }
    Ok(files.into_iter().collect())
}

fn collect_recursive(dir: &Utf8Path, files: &mut BTreeSet<Utf8PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read directory '{dir}'"))?
    {
        let entry = entry.into_diagnostic()?;
        let file_type = entry.file_type().into_diagnostic()?;
        if file_type.is_symlink() {
            continue;
        }
        let entry_path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|path| miette::miette!("Non-UTF-8 path '{}'", path.display()))?;

        if file_type.is_dir() {
            collect_recursive(&entry_path, files)?;
        } else if file_type.is_file() && is_source_file(&entry_path) {
            files.insert(entry_path);
        }
    }
    Ok(())
}

/// Reads a source file.
pub fn read_source(path: &Utf8Path) -> Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read '{path}'"))
}

/// Loads formatter settings from a JSON file, or the defaults.
pub fn load_settings(config: Option<&Utf8Path>) -> Result<FormatterSettings> {
    let Some(config) = config else {
        return Ok(FormatterSettings::default());
    };
    let text = fs::read_to_string(config)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config '{config}'"))?;
    serde_json::from_str(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid formatter config '{config}'"))
}

/// The `file://` URI the index uses for a path.
pub fn file_uri(path: &Utf8Path) -> String {
    let absolute = path
        .canonicalize_utf8()
        .unwrap_or_else(|_| path.to_path_buf());
    format!("file://{absolute}")
}
