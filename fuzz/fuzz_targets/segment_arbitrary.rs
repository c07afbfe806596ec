// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for region segmentation and whole-document analysis.
//!
//! Every document format must segment arbitrary text into regions that
//! reproduce it byte for byte, and parsing, indexing and formatting the
//! result must never panic.

#![no_main]

use gemstone_core::document::{DocumentFormat, ParsedDocument};
use gemstone_core::format::{FormatterSettings, format_document};
use gemstone_core::language_service::WorkspaceIndex;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    for format in [DocumentFormat::Topaz, DocumentFormat::Tonel] {
        let document = ParsedDocument::parse("file:///fuzz", 1, source, format);
        let rebuilt: String = document
            .regions
            .iter()
            .map(|r| r.region.text.as_str())
            .collect();
        assert_eq!(rebuilt, source, "regions must tile the document");

        let mut index = WorkspaceIndex::new();
        index.replace_file(&document);
        let _ = format_document(&document, &FormatterSettings::default());
    }
});
