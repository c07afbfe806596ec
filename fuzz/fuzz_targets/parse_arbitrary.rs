// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for lexer and parser crash safety.
//!
//! Feeds arbitrary text to the lexer, the method parser and the bare-code
//! parser, and asserts that none of them panic. Malformed input must come
//! back as diagnostics.
//!
//! # Success Criteria
//!
//! - No panic on any UTF-8 input
//! - Token spans tile the input
//! - Scope analysis and formatting of the result never panic

#![no_main]

use gemstone_core::analyse::ScopeTree;
use gemstone_core::source_analysis::{parse, parse_code, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 never reaches the lexer; documents arrive as strings.
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let tokens = tokenize(source);
    let covered: usize = tokens.iter().map(|t| t.span().len() as usize).sum();
    assert_eq!(covered, source.len(), "token spans must tile the input");

    let (method, _diagnostics) = parse(tokens.clone());
    if let Some(method) = method {
        let _ = ScopeTree::analyze(&method);
    }
    let (body, _diagnostics) = parse_code(tokens);
    let _ = ScopeTree::analyze_body(&body);
});
