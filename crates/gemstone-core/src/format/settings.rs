// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Formatter style toggles.
//!
//! **DDD Context:** Formatting
//!
//! Settings deserialize from camelCase JSON with every field optional, so
//! editor configuration and `--config` files only name what they change:
//!
//! ```
//! use gemstone_core::format::{FormatterSettings, IndentChar};
//!
//! let settings: FormatterSettings =
//!     serde_json::from_str(r#"{"indentChar": "space", "indentWidth": 4}"#).unwrap();
//! assert_eq!(settings.indent_char, IndentChar::Space);
//! assert_eq!(settings.indent_unit(), "    ");
//! assert!(settings.spaces_around_assignment);
//! ```

use serde::{Deserialize, Serialize};

/// The character used for one level of block indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentChar {
    #[default]
    Tab,
    Space,
}

/// Style toggles for the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatterSettings {
    /// Tab or space indentation.
    pub indent_char: IndentChar,
    /// Characters per indentation level.
    pub indent_width: usize,
    /// `( x )` instead of `(x)`.
    pub spaces_inside_parens: bool,
    /// `[ x ]` instead of `[x]`.
    pub spaces_inside_brackets: bool,
    /// `{ x }` instead of `{x}`.
    pub spaces_inside_braces: bool,
    /// `x := 3` instead of `x:=3`.
    pub spaces_around_assignment: bool,
    /// `a + b` instead of `a+b`.
    pub spaces_around_binary_selectors: bool,
    /// `^ x` instead of `^x`.
    pub space_after_caret: bool,
    /// Blank line between a method pattern and its body.
    pub blank_line_after_pattern: bool,
    /// Spaces added for continuation lines of a broken message.
    pub continuation_indent: usize,
    /// Keyword messages with at least this many parts put each part on
    /// its own line.
    pub multiline_keyword_threshold: usize,
    /// Unwrap parentheses that do not change binding.
    pub remove_unnecessary_parens: bool,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            indent_char: IndentChar::Tab,
            indent_width: 1,
            spaces_inside_parens: false,
            spaces_inside_brackets: false,
            spaces_inside_braces: false,
            spaces_around_assignment: true,
            spaces_around_binary_selectors: true,
            space_after_caret: false,
            blank_line_after_pattern: true,
            continuation_indent: 2,
            multiline_keyword_threshold: 4,
            remove_unnecessary_parens: true,
        }
    }
}

impl FormatterSettings {
    /// Returns the text of one indentation level.
    #[must_use]
    pub fn indent_unit(&self) -> String {
        let ch = match self.indent_char {
            IndentChar::Tab => '\t',
            IndentChar::Space => ' ',
        };
        std::iter::repeat_n(ch, self.indent_width.max(1)).collect()
    }

    /// Returns the continuation indent prefix.
    #[must_use]
    pub fn continuation(&self) -> String {
        " ".repeat(self.continuation_indent)
    }

    /// Returns these settings with `overrides` applied on top.
    #[must_use]
    pub fn with_overrides(&self, overrides: &FormatterOverrides) -> Self {
        let mut settings = self.clone();
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = overrides.$field {
                    settings.$field = value;
                })*
            };
        }
        apply!(
            indent_char,
            indent_width,
            spaces_inside_parens,
            spaces_inside_brackets,
            spaces_inside_braces,
            spaces_around_assignment,
            spaces_around_binary_selectors,
            space_after_caret,
            blank_line_after_pattern,
            continuation_indent,
            multiline_keyword_threshold,
            remove_unnecessary_parens,
        );
        settings
    }
}

/// Per-request overrides; `None` keeps the session setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FormatterOverrides {
    pub indent_char: Option<IndentChar>,
    pub indent_width: Option<usize>,
    pub spaces_inside_parens: Option<bool>,
    pub spaces_inside_brackets: Option<bool>,
    pub spaces_inside_braces: Option<bool>,
    pub spaces_around_assignment: Option<bool>,
    pub spaces_around_binary_selectors: Option<bool>,
    pub space_after_caret: Option<bool>,
    pub blank_line_after_pattern: Option<bool>,
    pub continuation_indent: Option<usize>,
    pub multiline_keyword_threshold: Option<usize>,
    pub remove_unnecessary_parens: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = FormatterSettings::default();
        assert_eq!(settings.indent_unit(), "\t");
        assert_eq!(settings.continuation(), "  ");
        assert_eq!(settings.multiline_keyword_threshold, 4);
        assert!(settings.remove_unnecessary_parens);
        assert!(!settings.space_after_caret);
    }

    #[test]
    fn empty_json_gives_defaults() {
        let settings: FormatterSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, FormatterSettings::default());
    }

    #[test]
    fn overrides_apply_only_named_fields() {
        let overrides: FormatterOverrides =
            serde_json::from_str(r#"{"spaceAfterCaret": true, "continuationIndent": 4}"#).unwrap();
        let settings = FormatterSettings::default().with_overrides(&overrides);
        assert!(settings.space_after_caret);
        assert_eq!(settings.continuation(), "    ");
        assert_eq!(settings.indent_char, IndentChar::Tab);
    }

    #[test]
    fn zero_indent_width_still_indents() {
        let settings = FormatterSettings {
            indent_char: IndentChar::Space,
            indent_width: 0,
            ..FormatterSettings::default()
        };
        assert_eq!(settings.indent_unit(), " ");
    }
}
