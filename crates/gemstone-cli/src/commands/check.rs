// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `gemstone check`: report syntax errors and warnings.
//!
//! Parses every region of each file and prints the same diagnostics the
//! language server publishes. Exits non-zero when any error is found;
//! warnings alone do not fail the command.

use camino::Utf8PathBuf;
use gemstone_core::document::{DocumentFormat, ParsedDocument};
use gemstone_core::queries::diagnostic_provider::compute_diagnostics;
use miette::Result;

use super::OutputFormat;
use crate::diagnostic::{SourceDiagnostic, to_json};
use crate::paths::{collect_source_files, file_uri, read_source};

/// Totals across all checked files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Check the given paths and print their diagnostics.
pub fn run_check(paths: &[Utf8PathBuf], format: OutputFormat) -> Result<()> {
    let summary = check_files(paths, format)?;
    if summary.errors > 0 {
        let plural = if summary.errors == 1 { "" } else { "s" };
        miette::bail!(
            "{} error{plural} found in {} file(s)",
            summary.errors,
            summary.files
        );
    }
    Ok(())
}

fn check_files(paths: &[Utf8PathBuf], format: OutputFormat) -> Result<CheckSummary> {
    let source_files = collect_source_files(paths)?;
    let mut summary = CheckSummary {
        files: source_files.len(),
        ..CheckSummary::default()
    };

    for file in &source_files {
        let source = read_source(file)?;
        let uri = file_uri(file);
        let document = ParsedDocument::parse(&uri, 0, &source, DocumentFormat::from_uri(&uri));
        for diagnostic in compute_diagnostics(&document) {
            if diagnostic.is_error() {
                summary.errors += 1;
            } else {
                summary.warnings += 1;
            }
            match format {
                OutputFormat::Text => {
                    let report = SourceDiagnostic::from_core_diagnostic(
                        &diagnostic,
                        file.as_str(),
                        &source,
                    );
                    eprintln!("{:?}", miette::Report::new(report));
                }
                OutputFormat::Json => println!("{}", to_json(&diagnostic, file.as_str())),
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("install.gs")).expect("utf8 path");
        std::fs::write(&path, content).expect("write temp file");
        (dir, path)
    }

    #[test]
    fn clean_files_pass() {
        let (_dir, path) = write_temp("run\n| t |\nt := 3 + 4.\n^t\n%\n");
        assert!(run_check(&[path], OutputFormat::Text).is_ok());
    }

    #[test]
    fn errors_fail_and_are_counted() {
        let (_dir, path) = write_temp("run\n1 +\n%\nrun\n2 *\n%\n");
        let summary = check_files(std::slice::from_ref(&path), OutputFormat::Json).unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.errors, 2);
        let err = run_check(&[path], OutputFormat::Json).unwrap_err();
        assert_eq!(err.to_string(), "2 errors found in 1 file(s)");
    }

    #[test]
    fn warnings_do_not_fail() {
        let (_dir, path) = write_temp("run\n| unused |\n3 + 4\n%\n");
        let summary = check_files(std::slice::from_ref(&path), OutputFormat::Text).unwrap();
        assert_eq!(summary.warnings, 1);
        assert!(run_check(&[path], OutputFormat::Text).is_ok());
    }
}
