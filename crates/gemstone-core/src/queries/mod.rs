// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Query modules for language service operations.
//!
//! This module provides domain services (Providers) from the Language Service
//! context. Each provider implements one capability over a
//! [`ParsedDocument`](crate::document::ParsedDocument) and, where it needs
//! cross-file knowledge, the
//! [`WorkspaceIndex`](crate::language_service::WorkspaceIndex):
//!
//! - [`completion_provider`] - Suggest completions at cursor position
//! - [`definition_provider`] - Locate variable declarations, implementors and classes
//! - [`diagnostic_provider`] - Collect errors and warnings
//! - [`document_symbols_provider`] - Return document outline symbols
//! - [`folding_provider`] - Collapsible regions, blocks and comments
//! - [`hover_provider`] - Show information on hover
//! - [`references_provider`] - Find variable uses and selector sends
//! - [`target`] - Classify the token under the cursor
//!
//! **DDD Context:** Language Service
//!
//! Providers are read-only: they never touch the document store or the
//! index, so the session can answer queries from shared references.

pub mod completion_provider;
pub mod definition_provider;
pub mod diagnostic_provider;
pub mod document_symbols_provider;
pub mod folding_provider;
pub mod hover_provider;
pub mod references_provider;
pub mod target;
