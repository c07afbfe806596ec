// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Conversions between LSP protocol types and `gemstone-core` types.
//!
//! **DDD Context:** Language Service
//!
//! LSP counts columns in UTF-16 code units; the core counts UTF-8 bytes.
//! Every conversion takes the document text so columns can be translated
//! line by line.

use gemstone_core::format::{FormatterOverrides, IndentChar};
use gemstone_core::language_service::{
    CompletionKind, FoldingKind, Position, Range, SymbolKind,
};
use gemstone_core::source_analysis::{Diagnostic, Severity};
use tower_lsp::lsp_types;

/// Returns line `line` of `text` without its terminator.
fn line_text(text: &str, line: u32) -> &str {
    let raw = text.split('\n').nth(line as usize).unwrap_or_default();
    raw.strip_suffix('\r').unwrap_or(raw)
}

/// Converts an LSP position (UTF-16 columns) to a core position (byte columns).
pub fn to_core_position(position: lsp_types::Position, text: &str) -> Position {
    let mut utf16 = 0u32;
    let mut bytes = 0u32;
    for ch in line_text(text, position.line).chars() {
        if utf16 >= position.character {
            break;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "char::len_utf16() is always 1 or 2"
        )]
        {
            utf16 += ch.len_utf16() as u32;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "char::len_utf8() is always 1 to 4"
        )]
        {
            bytes += ch.len_utf8() as u32;
        }
    }
    Position::new(position.line, bytes)
}

/// Converts a core position to an LSP position.
///
/// Without the document text the byte column is passed through, which is
/// exact for ASCII lines.
pub fn to_lsp_position(position: Position, text: Option<&str>) -> lsp_types::Position {
    let Some(text) = text else {
        return lsp_types::Position::new(position.line, position.column);
    };
    let line = line_text(text, position.line);
    let mut utf16 = 0u32;
    for (index, ch) in line.char_indices() {
        if index >= position.column as usize {
            break;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "char::len_utf16() is always 1 or 2"
        )]
        {
            utf16 += ch.len_utf16() as u32;
        }
    }
    lsp_types::Position::new(position.line, utf16)
}

/// Converts a core range to an LSP range.
pub fn to_lsp_range(range: Range, text: Option<&str>) -> lsp_types::Range {
    lsp_types::Range::new(
        to_lsp_position(range.start, text),
        to_lsp_position(range.end, text),
    )
}

/// Converts a core diagnostic to an LSP diagnostic.
pub fn to_lsp_diagnostic(diagnostic: &Diagnostic, text: &str) -> lsp_types::Diagnostic {
    let range = Range::from(diagnostic.span);
    lsp_types::Diagnostic {
        range: to_lsp_range(range, Some(text)),
        severity: Some(match diagnostic.severity {
            Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
            Severity::Warning => lsp_types::DiagnosticSeverity::WARNING,
            Severity::Hint => lsp_types::DiagnosticSeverity::HINT,
        }),
        source: Some("gemstone".into()),
        message: match &diagnostic.hint {
            Some(hint) => format!("{}\nHint: {hint}", diagnostic.message),
            None => diagnostic.message.to_string(),
        },
        ..Default::default()
    }
}

pub fn to_lsp_completion_kind(kind: CompletionKind) -> lsp_types::CompletionItemKind {
    match kind {
        CompletionKind::Keyword => lsp_types::CompletionItemKind::KEYWORD,
        CompletionKind::Variable => lsp_types::CompletionItemKind::VARIABLE,
        CompletionKind::Method => lsp_types::CompletionItemKind::METHOD,
        CompletionKind::Class => lsp_types::CompletionItemKind::CLASS,
    }
}

pub fn to_lsp_symbol_kind(kind: SymbolKind) -> lsp_types::SymbolKind {
    match kind {
        SymbolKind::Class => lsp_types::SymbolKind::CLASS,
        SymbolKind::Method => lsp_types::SymbolKind::METHOD,
        SymbolKind::Code => lsp_types::SymbolKind::NAMESPACE,
    }
}

pub fn to_lsp_folding_kind(kind: FoldingKind) -> lsp_types::FoldingRangeKind {
    match kind {
        FoldingKind::Region => lsp_types::FoldingRangeKind::Region,
        FoldingKind::Comment => lsp_types::FoldingRangeKind::Comment,
    }
}

/// Maps the editor's `tabSize`/`insertSpaces` onto formatter overrides.
pub fn formatting_overrides(options: &lsp_types::FormattingOptions) -> FormatterOverrides {
    let (indent_char, indent_width) = if options.insert_spaces {
        (IndentChar::Space, options.tab_size as usize)
    } else {
        (IndentChar::Tab, 1)
    };
    FormatterOverrides {
        indent_char: Some(indent_char),
        indent_width: Some(indent_width),
        ..FormatterOverrides::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_convert_through_utf16() {
        let text = "run\n'h\u{e9}' , '\u{1F600}' size\n%\n";
        // `'hé'` is 4 UTF-16 units but 5 bytes.
        let core = to_core_position(lsp_types::Position::new(1, 4), text);
        assert_eq!(core, Position::new(1, 5));
        // The emoji is 2 UTF-16 units and 4 bytes.
        let core = to_core_position(lsp_types::Position::new(1, 12), text);
        assert_eq!(core, Position::new(1, 15));
        assert_eq!(
            to_lsp_position(Position::new(1, 15), Some(text)),
            lsp_types::Position::new(1, 12)
        );
    }

    #[test]
    fn positions_past_line_end_clamp() {
        let text = "ab\r\ncd";
        assert_eq!(
            to_core_position(lsp_types::Position::new(0, 10), text),
            Position::new(0, 2)
        );
        assert_eq!(
            to_core_position(lsp_types::Position::new(7, 3), text),
            Position::new(7, 0)
        );
    }

    #[test]
    fn missing_text_passes_columns_through() {
        assert_eq!(
            to_lsp_position(Position::new(3, 9), None),
            lsp_types::Position::new(3, 9)
        );
    }

    #[test]
    fn editor_options_map_to_indentation() {
        let spaces = lsp_types::FormattingOptions {
            tab_size: 4,
            insert_spaces: true,
            ..Default::default()
        };
        let overrides = formatting_overrides(&spaces);
        assert_eq!(overrides.indent_char, Some(IndentChar::Space));
        assert_eq!(overrides.indent_width, Some(4));

        let tabs = lsp_types::FormattingOptions {
            tab_size: 8,
            insert_spaces: false,
            ..Default::default()
        };
        assert_eq!(formatting_overrides(&tabs).indent_width, Some(1));
    }

    #[test]
    fn diagnostics_carry_hints() {
        let diagnostic = Diagnostic::warning("unused temporary 't'", gemstone_core::source_analysis::Span::default())
            .with_hint("remove it");
        let lsp = to_lsp_diagnostic(&diagnostic, "");
        assert_eq!(lsp.severity, Some(lsp_types::DiagnosticSeverity::WARNING));
        assert_eq!(lsp.message, "unused temporary 't'\nHint: remove it");
    }
}
