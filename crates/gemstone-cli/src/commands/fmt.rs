// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `gemstone fmt` and `gemstone fmt --check`: format GemStone source files.
//!
//! **DDD Context:** Formatting
//!
//! `gemstone fmt <path>...` formats each Topaz or Tonel file and writes the
//! result back in place. Files that are already formatted are left alone.
//! Regions with syntax errors pass through unchanged, so a broken method
//! never blocks formatting of the rest of its file.
//!
//! `gemstone fmt --check <path>...` prints a unified diff for every file that
//! would change and exits non-zero if any would. No files are modified.

use camino::Utf8PathBuf;
use gemstone_core::document::{DocumentFormat, ParsedDocument};
use gemstone_core::format::{FormatterSettings, format_document};
use miette::{IntoDiagnostic, Result, WrapErr};
use similar::TextDiff;
use tracing::debug;

use crate::paths::{collect_source_files, file_uri, read_source};

/// Format (or check formatting of) the given paths.
pub fn run_fmt(paths: &[Utf8PathBuf], check_only: bool, settings: &FormatterSettings) -> Result<()> {
    let source_files = collect_source_files(paths)?;
    let mut changed_files: Vec<Utf8PathBuf> = Vec::new();

    for file in &source_files {
        let original = read_source(file)?;
        let uri = file_uri(file);
        let document = ParsedDocument::parse(&uri, 0, &original, DocumentFormat::from_uri(&uri));
        let errors = document.diagnostics().filter(|d| d.is_error()).count();
        if errors > 0 {
            eprintln!(
                "warning: '{file}' has {errors} syntax error{}; affected regions left unformatted",
                plural(errors)
            );
        }

        let formatted = format_document(&document, settings);
        if formatted == original {
            debug!(%file, "already formatted");
            continue;
        }

        changed_files.push(file.clone());

        if check_only {
            print_unified_diff(file.as_str(), &original, &formatted);
        } else {
            std::fs::write(file, &formatted)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write '{file}'"))?;
            debug!(%file, "formatted");
        }
    }

    if check_only && !changed_files.is_empty() {
        let count = changed_files.len();
        miette::bail!("{count} file{} would be reformatted", plural(count));
    }

    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Print a unified diff between `original` and `formatted` for the given file
/// path. Output goes to stdout so it can be captured and piped.
fn print_unified_diff(path: &str, original: &str, formatted: &str) {
    let diff = TextDiff::from_lines(original, formatted);
    print!(
        "{}",
        diff.unified_diff()
            .header(&format!("a/{path}"), &format!("b/{path}"))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write `content` to a temp file named `name` and return (dir, path).
    fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf8 path");
        std::fs::write(&path, content).expect("write temp file");
        (dir, path)
    }

    fn fmt(path: &Utf8PathBuf, check_only: bool) -> Result<()> {
        run_fmt(std::slice::from_ref(path), check_only, &FormatterSettings::default())
    }

    #[test]
    fn fmt_rewrites_in_place() {
        let (_dir, path) = write_temp("install.gs", "run\n1+2\n%\n");
        fmt(&path, false).expect("fmt");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "run\n1 + 2.\n%\n");
    }

    #[test]
    fn fmt_is_idempotent() {
        let (_dir, path) = write_temp(
            "account.gs",
            "method: Account\ndeposit: amount\n|t|\nt:=amount.\nbalance:=balance+t\n%\n",
        );
        fmt(&path, false).expect("pass 1");
        let pass1 = std::fs::read_to_string(&path).unwrap();
        fmt(&path, false).expect("pass 2");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), pass1);
        assert!(fmt(&path, true).is_ok());
    }

    #[test]
    fn check_reports_without_writing() {
        let source = "run\n1+2\n%\n";
        let (_dir, path) = write_temp("install.gs", source);
        let err = fmt(&path, true).unwrap_err();
        assert_eq!(err.to_string(), "1 file would be reformatted");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn broken_regions_pass_through() {
        let (_dir, path) = write_temp("install.gs", "run\n1 +\n%\nrun\n2+2\n%\n");
        fmt(&path, false).expect("fmt");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "run\n1 +\n%\nrun\n2 + 2.\n%\n"
        );
    }

    #[test]
    fn tonel_files_use_the_tonel_segmenter() {
        let (_dir, path) = write_temp(
            "Account.st",
            "Class {\n\t#name : 'Account'\n}\n\n{ #category : 'accessing' }\nAccount >> balance [\n\t^balance\n]\n",
        );
        fmt(&path, true).expect("already formatted");
    }
}
