// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis passes over parsed GemStone Smalltalk.
//!
//! **DDD Context:** Language Service
//!
//! Analysis here is purely lexical: which variables a method or block
//! declares, and which declaration a name refers to at a given offset.
//! Receiver types are never inferred.

pub mod scope;

pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree, VariableInfo, VariableKind};
