// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Canonical source formatting.
//!
//! **DDD Context:** Formatting
//!
//! Formatting works region by region. Each Smalltalk region that parsed
//! cleanly is re-emitted from its AST; regions with syntax errors and
//! opaque command text pass through unchanged, except that runs of blank
//! lines in opaque text collapse to one.
//!
//! ```
//! use gemstone_core::document::DocumentFormat;
//! use gemstone_core::format::{FormatterSettings, format_source};
//!
//! let formatted = format_source("run\n1+2\n%", DocumentFormat::Topaz, &FormatterSettings::default());
//! assert_eq!(formatted, "run\n1 + 2.\n%");
//! ```

mod blocks;
pub mod document;
mod parens;
mod printer;
mod settings;


use ecow::EcoString;
use tracing::debug;

use crate::document::{DocumentFormat, ParsedDocument, ParsedRegion};
use crate::segment::RegionKind;

pub use settings::{FormatterOverrides, FormatterSettings, IndentChar};

use printer::Printer;

/// Formats one Smalltalk region.
///
/// Returns `None` for opaque regions, regions with syntax errors and
/// regions whose comments cannot be kept in place. The result keeps the
/// region's trailing newline, if it had one.
#[must_use]
pub fn format_region(
    parsed: &ParsedRegion,
    format: DocumentFormat,
    settings: &FormatterSettings,
) -> Option<String> {
    if !parsed.region.is_smalltalk() || !parsed.is_clean() {
        return None;
    }
    let printer = Printer::new(settings, parsed);
    let doc = match parsed.region.kind {
        RegionKind::Method => {
            let method = parsed.method.as_ref()?;
            if format == DocumentFormat::Tonel {
                printer.tonel_method(tonel_prefix(parsed)?, method)?
            } else {
                printer.method(method)?
            }
        }
        RegionKind::Code => printer.code(parsed.statements.as_ref()?)?,
        RegionKind::Opaque => return None,
    };
    let mut text = doc.to_pretty_string();
    if parsed.region.text.ends_with('\n') {
        text.push('\n');
    }
    Some(text)
}

/// `Account >> ` or `Account class >> `.
fn tonel_prefix(parsed: &ParsedRegion) -> Option<String> {
    let class_name: &EcoString = parsed.region.class_name.as_ref()?;
    let side = if parsed.region.class_side { " class" } else { "" };
    Some(format!("{class_name}{side} >> "))
}

/// Formats every region of `document` and reassembles the text.
#[must_use]
pub fn format_document(document: &ParsedDocument, settings: &FormatterSettings) -> String {
    let mut out = String::with_capacity(document.text.len());
    for parsed in &document.regions {
        let region = &parsed.region;
        if !region.is_smalltalk() {
            out.push_str(&collapse_blank_lines(&region.text));
            continue;
        }
        match format_region(parsed, document.format, settings) {
            Some(text) => out.push_str(&text),
            None => {
                debug!(
                    uri = %document.uri,
                    start_line = region.start_line,
                    "leaving region unformatted"
                );
                out.push_str(&region.text);
            }
        }
    }
    out
}

/// Parses and formats `text` in one step.
#[must_use]
pub fn format_source(text: &str, format: DocumentFormat, settings: &FormatterSettings) -> String {
    let document = ParsedDocument::parse("", 0, text, format);
    format_document(&document, settings)
}

/// Collapses runs of whitespace-only lines to a single empty line.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;
    for line in text.split_inclusive('\n') {
        let blank = line.trim().is_empty() && line.ends_with('\n');
        if blank {
            if !previous_blank {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
        previous_blank = blank;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topaz(source: &str) -> String {
        format_with(source, &FormatterSettings::default())
    }

    fn format_with(source: &str, settings: &FormatterSettings) -> String {
        let once = format_source(source, DocumentFormat::Topaz, settings);
        let twice = format_source(&once, DocumentFormat::Topaz, settings);
        assert_eq!(once, twice, "formatting is not idempotent for {source:?}");
        once
    }

    #[test]
    fn binary_spacing_and_terminator() {
        assert_eq!(topaz("run\n1+2\n%"), "run\n1 + 2.\n%");
    }

    #[test]
    fn single_statement_blocks_stack_under_the_receiver() {
        assert_eq!(
            topaz("run\ncondition ifTrue: [x] ifFalse: [self doB]\n%"),
            "run\ncondition\n  ifTrue: [x]\n  ifFalse: [self doB].\n%"
        );
    }

    #[test]
    fn trivial_blocks_stay_on_one_line() {
        assert_eq!(
            topaz("run\nc ifTrue: [x]   ifFalse: [nil]\n%\n"),
            "run\nc ifTrue: [x] ifFalse: [nil].\n%\n"
        );
    }

    #[test]
    fn multi_statement_blocks_use_bracket_flow() {
        assert_eq!(
            topaz("run\nc ifTrue: [a foo. b bar] ifFalse: [c baz]\n%\n"),
            "run\nc ifTrue: [\n\ta foo.\n\tb bar\n] ifFalse: [\n\tc baz\n].\n%\n"
        );
    }

    #[test]
    fn single_block_argument_flows_when_long() {
        assert_eq!(
            topaz("run\nitems do: [:each | each foo. each bar]\n%\n"),
            "run\nitems do: [:each |\n\teach foo.\n\teach bar\n].\n%\n"
        );
    }

    #[test]
    fn methods_indent_their_body() {
        assert_eq!(
            topaz("method: Foo\nbar: x\n| t | t := x+1. ^t\n%\n"),
            "method: Foo\nbar: x\n\n\t| t |\n\tt := x + 1.\n\t^t\n%\n"
        );
    }

    #[test]
    fn primitives_and_pragmas() {
        assert_eq!(
            topaz("method: Foo\nsize\n<primitive: 62>\n<category: 'accessing'>\n^self\n%\n"),
            "method: Foo\nsize\n\n\t<primitive: 62>\n\t<category: 'accessing'>\n\t^self\n%\n"
        );
        assert_eq!(
            topaz("method: Foo\nbar\n<protected primitive: 33>\n^nil\n%\n"),
            "method: Foo\nbar\n\n\t<protected primitive: 33>\n\t^nil\n%\n"
        );
    }

    #[test]
    fn unnecessary_parens_are_removed() {
        assert_eq!(topaz("run\n^(a + b) * (c foo)\n%\n"), "run\n^a + b * c foo\n%\n");
        assert_eq!(topaz("run\nx := (y at: 1)\n%\n"), "run\nx := y at: 1.\n%\n");
        assert_eq!(topaz("run\n(a + b) foo\n%\n"), "run\n(a + b) foo.\n%\n");
        assert_eq!(topaz("run\na at: (b at: 1)\n%\n"), "run\na at: (b at: 1).\n%\n");
    }

    #[test]
    fn parens_are_kept_when_removal_is_off() {
        let settings = FormatterSettings {
            remove_unnecessary_parens: false,
            ..FormatterSettings::default()
        };
        assert_eq!(
            format_with("run\n^(a + b) * (c foo)\n%\n", &settings),
            "run\n^(a + b) * (c foo)\n%\n"
        );
    }

    #[test]
    fn cascades_break_after_the_receiver() {
        assert_eq!(
            topaz("run\nTranscript show: 'a'; cr; show: 'b'\n%\n"),
            "run\nTranscript\n  show: 'a';\n  cr;\n  show: 'b'.\n%\n"
        );
    }

    #[test]
    fn parenthesized_cascades_stay_on_one_line() {
        assert_eq!(
            topaz("run\n(a foo;   yourself) bar\n%\n"),
            "run\n(a foo; yourself) bar.\n%\n"
        );
        assert_eq!(
            topaz("run\nx := (OrderedCollection new add: 1; add: 2; yourself) size\n%\n"),
            "run\nx := (OrderedCollection new add: 1; add: 2; yourself) size.\n%\n"
        );
        let long = "run\n(Transcript show: 'a rather long piece of text'; cr; show: 'and then some more text after it') foo\n%\n";
        assert_eq!(
            topaz(long),
            "run\n(Transcript\n  show: 'a rather long piece of text';\n  cr;\n  show: 'and then some more text after it') foo.\n%\n"
        );
    }

    #[test]
    fn long_keyword_messages_stack() {
        assert_eq!(
            topaz("run\nx a: 1 b: 2 c: 3 d: 4\n%\n"),
            "run\nx\n  a: 1\n  b: 2\n  c: 3\n  d: 4.\n%\n"
        );
        assert_eq!(topaz("run\nx a: 1 b: 2 c: 3\n%\n"), "run\nx a: 1 b: 2 c: 3.\n%\n");
    }

    #[test]
    fn comments_and_blank_lines_are_kept() {
        assert_eq!(
            topaz("run\n\"first\"\nx := 1.\n\n\n   y := 2 \"inline\" + 3\n%\n"),
            "run\n\"first\"\nx := 1.\n\ny := 2 \"inline\" + 3.\n%\n"
        );
        assert_eq!(
            topaz("method: Foo\nbar\n\"Answer bar\"\n| t |\n^t\n%\n"),
            "method: Foo\nbar\n\n\t\"Answer bar\"\n\t| t |\n\t^t\n%\n"
        );
    }

    #[test]
    fn regions_with_errors_pass_through() {
        let source = "run\n1 +\n%\nrun\n2+2\n%\n";
        assert_eq!(topaz(source), "run\n1 +\n%\nrun\n2 + 2.\n%\n");
    }

    #[test]
    fn opaque_blank_lines_collapse() {
        assert_eq!(
            topaz("! a\n\n\n\n! b\nrun\n1\n%\n"),
            "! a\n\n! b\nrun\n1.\n%\n"
        );
    }

    #[test]
    fn literals_keep_their_spelling() {
        assert_eq!(
            topaz("run\nx := #(1 $a foo #bar: 16rFF) , #[1 2]\n%\n"),
            "run\nx := #(1 $a foo #bar: 16rFF) , #[1 2].\n%\n"
        );
        assert_eq!(topaz("run\n3 - -1\n%\n"), "run\n3 - -1.\n%\n");
    }

    #[test]
    fn nested_blocks_and_arrays() {
        assert_eq!(
            topaz("run\n{1. x foo. [:a | a]}\n%\n"),
            "run\n{1. x foo. [:a | a]}.\n%\n"
        );
        assert_eq!(
            topaz("run\nx detect: {:e | e.age > 30}\n%\n"),
            "run\nx detect: {:e | e.age > 30}.\n%\n"
        );
    }

    #[test]
    fn style_toggles() {
        let settings = FormatterSettings {
            indent_char: IndentChar::Space,
            indent_width: 2,
            spaces_inside_brackets: true,
            spaces_around_assignment: false,
            spaces_around_binary_selectors: false,
            space_after_caret: true,
            blank_line_after_pattern: false,
            ..FormatterSettings::default()
        };
        assert_eq!(
            format_with("method: Foo\nbar\nx := [:a | a + 1].\n^x value: 2\n%\n", &settings),
            "method: Foo\nbar\n  x:=[ :a | a+1 ].\n  ^ x value: 2\n%\n"
        );
    }

    #[test]
    fn tonel_methods_are_rewrapped() {
        let source = "Class { #name : 'Foo' }\n\n\n{ #category : 'x' }\nFoo class >> bar: x [\n   ^x+1 ]\n";
        let formatted = format_source(source, DocumentFormat::Tonel, &FormatterSettings::default());
        assert_eq!(
            formatted,
            "Class { #name : 'Foo' }\n\n{ #category : 'x' }\nFoo class >> bar: x [\n\t^x + 1\n]\n"
        );
        let again = format_source(&formatted, DocumentFormat::Tonel, &FormatterSettings::default());
        assert_eq!(again, formatted);
    }

    #[test]
    fn collapse_keeps_single_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n  \nb\n"), "a\n\nb\n");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }
}
