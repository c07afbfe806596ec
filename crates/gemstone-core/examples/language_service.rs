// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Example demonstrating the Language Service API.
//!
//! Opens a small Topaz script in an analysis session and prints its
//! diagnostics, hover text, definitions, completions and formatted form.

use gemstone_core::document::DocumentFormat;
use gemstone_core::format::FormatterOverrides;
use gemstone_core::language_service::{AnalysisSession, LanguageService, Position};

const SCRIPT: &str = "\
! Account support
method: Account
balance
  ^balance
%
method: Account
deposit: amount
  | total unused |
  total := self balance + amount.
  balance:=total
%
";

fn main() {
    println!("GemStone Language Service Example\n");

    let mut session = AnalysisSession::new();
    let uri = "file:///account.gs";

    println!("1. Diagnostics");
    for diagnostic in session.update_document(uri, 1, SCRIPT, DocumentFormat::Topaz) {
        let start = diagnostic.span.start();
        println!(
            "   {}:{} {}",
            start.line + 1,
            start.column + 1,
            diagnostic.message
        );
    }

    println!("\n2. Hover over `total`");
    if let Some(hover) = session.hover(uri, Position::new(8, 3)) {
        println!("   {}", hover.contents);
    }

    println!("\n3. Definition of `balance` (the message send)");
    for location in session.definition(uri, Position::new(8, 17)) {
        println!(
            "   {} line {}",
            location.uri,
            location.range.start.line + 1
        );
    }

    println!("\n4. Completions after `self `");
    for completion in session.completions(uri, Position::new(8, 16)) {
        println!("   {}", completion.label);
    }

    println!("\n5. Outline");
    for symbol in session.document_symbols(uri) {
        println!("   {}", symbol.name);
    }

    println!("\n6. Formatted");
    for edit in session.format(uri, &FormatterOverrides::default()) {
        print!("{}", edit.new_text);
    }
}
