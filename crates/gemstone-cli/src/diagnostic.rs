// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source diagnostics rendered through miette.
//!
//! Converts `gemstone-core` diagnostics into miette reports with the file
//! name, the offending source line and a labelled span.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use gemstone_core::source_analysis::{Diagnostic as CoreDiagnostic, Severity};
use miette::{Diagnostic, SourceSpan};

/// A parse or analysis diagnostic with its source attached.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(gemstone::check))]
pub struct SourceDiagnostic {
    pub severity: Severity,
    pub message: String,
    #[source_code]
    pub src: miette::NamedSource<String>,
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label for the span (interpolated by miette derive macro)
    pub label: String,
    #[help]
    pub hint: Option<String>,
}

impl SourceDiagnostic {
    /// Wraps a core diagnostic for `source_path`.
    pub fn from_core_diagnostic(
        diagnostic: &CoreDiagnostic,
        source_path: &str,
        source: &str,
    ) -> Self {
        let label = match diagnostic.severity {
            Severity::Error => "error here",
            Severity::Warning => "warning here",
            Severity::Hint => "hint",
        };

        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: diagnostic.span.into(),
            label: label.to_string(),
            hint: diagnostic.hint.as_ref().map(ToString::to_string),
        }
    }
}

/// A diagnostic as one JSON object, for `--format json`.
pub fn to_json(diagnostic: &CoreDiagnostic, path: &str) -> serde_json::Value {
    let start = diagnostic.span.start();
    serde_json::json!({
        "file": path,
        "severity": severity_name(diagnostic.severity),
        "message": diagnostic.message.as_str(),
        "line": start.line + 1,
        "column": start.column + 1,
        "span_start": start.offset,
        "span_end": diagnostic.span.end().offset,
        "hint": diagnostic.hint.as_deref(),
    })
}

pub fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Hint => "hint",
    }
}
