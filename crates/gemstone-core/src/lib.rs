// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! GemStone Smalltalk analysis core.
//!
//! This crate contains everything an editor needs to understand GemStone
//! Smalltalk source:
//! - Region segmentation of Topaz scripts and Tonel files
//! - Lexical analysis and error-tolerant parsing of methods
//! - Lexical scope analysis
//! - Canonical formatting
//! - A cross-file index of implementors, senders and classes
//!
//! The crate is designed as a language service: every operation answers
//! from an in-memory parse and never fails on malformed input.

#![doc = include_str!("../../../README.md")]

pub mod analyse;
pub mod ast;
mod ast_walker;
pub mod document;
pub mod format;
pub mod language_service;
pub mod queries;
pub mod segment;
pub mod source_analysis;
pub mod uri;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Expression, Identifier, Literal, Method, MethodBody};
    pub use crate::document::{DocumentFormat, DocumentManager, ParsedDocument};
    pub use crate::format::{FormatterOverrides, FormatterSettings};
    pub use crate::language_service::{AnalysisSession, LanguageService, WorkspaceIndex};
    pub use crate::source_analysis::{Diagnostic, Severity, Span};
}
