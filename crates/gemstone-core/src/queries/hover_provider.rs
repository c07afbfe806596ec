// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Hover provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! This domain service implements the `HoverProvider`. It resolves the
//! token under the cursor with [`target_at`] and renders markdown:
//!
//! - selectors list their implementors and sender count from the
//!   [`WorkspaceIndex`]
//! - local variables show how they were declared
//! - global names show the indexed class definition, when there is one
//! - literals show their kind

use std::fmt::Write as _;

use crate::document::ParsedDocument;
use crate::language_service::{HoverInfo, WorkspaceIndex};

use super::target::{TargetKind, target_at};

/// Implementors listed before the hover truncates.
const MAX_IMPLEMENTORS: usize = 10;

/// Computes hover information at `offset`.
#[must_use]
pub fn compute_hover(
    document: &ParsedDocument,
    offset: u32,
    index: &WorkspaceIndex,
) -> Option<HoverInfo> {
    let region = document.region_at(offset)?;
    let target = target_at(region, offset)?;
    let contents = match &target.kind {
        TargetKind::Selector(selector) => selector_hover(selector, index),
        TargetKind::Variable(info) => format!("`{}`: {}", info.name, info.kind.describe()),
        TargetKind::PseudoVariable(name) => format!("`{name}`: {}", pseudo_variable(name)),
        TargetKind::Global(name) => global_hover(name, index),
        TargetKind::Literal(kind, text) => format!("{} literal `{text}`", kind.describe()),
    };
    Some(HoverInfo {
        contents,
        range: target.span.into(),
    })
}

fn selector_hover(selector: &str, index: &WorkspaceIndex) -> String {
    let mut out = format!("**`#{selector}`**\n\n");
    let implementors = index.find_implementors(selector);
    if implementors.is_empty() {
        out.push_str("No implementors in the workspace.");
    } else {
        out.push_str("Implemented in:\n");
        for entry in implementors.iter().take(MAX_IMPLEMENTORS) {
            let _ = writeln!(out, "- `{}`", entry.display_name());
        }
        if implementors.len() > MAX_IMPLEMENTORS {
            let _ = writeln!(out, "- and {} more", implementors.len() - MAX_IMPLEMENTORS);
        }
    }
    let senders = index.find_senders(selector).len();
    let _ = write!(
        out,
        "\n\n{senders} sender{}",
        if senders == 1 { "" } else { "s" }
    );
    out
}

fn global_hover(name: &str, index: &WorkspaceIndex) -> String {
    let Some(class) = index.find_class(name).into_iter().next() else {
        return format!("`{name}`: instance variable or global");
    };
    let mut out = format!("class `{}`", class.name);
    if let Some(superclass) = &class.superclass {
        let _ = write!(out, "\n\nSuperclass: `{superclass}`");
    }
    if let Some(category) = &class.category {
        let _ = write!(out, "\n\nCategory: {category}");
    }
    out
}

fn pseudo_variable(name: &str) -> &'static str {
    match name {
        "self" => "the receiver",
        "super" => "the receiver, with method lookup starting in the superclass",
        _ => "the active method context",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    const SOURCE: &str = "method: Account\ndeposit: amount\n  | total |\n  total := self balance + amount.\n  ^Account new\n%\n";

    fn hover(needle: &str, index: &WorkspaceIndex) -> Option<String> {
        let document = ParsedDocument::parse("file:///a.gs", 1, SOURCE, DocumentFormat::Topaz);
        let offset = u32::try_from(SOURCE.find(needle).unwrap()).unwrap();
        compute_hover(&document, offset, index).map(|h| h.contents)
    }

    fn indexed() -> WorkspaceIndex {
        let mut index = WorkspaceIndex::new();
        index.index_text("file:///a.gs", SOURCE);
        index.index_text(
            "file:///Account.st",
            "Class {\n\t#name : 'Account',\n\t#superclass : 'Object'\n}\n\nAccount >> balance [\n\t^0\n]\n",
        );
        index
    }

    #[test]
    fn selector_hover_lists_implementors() {
        let contents = hover("balance", &indexed()).unwrap();
        assert!(contents.contains("`Account >> balance`"), "{contents}");
        assert!(contents.contains("1 sender"), "{contents}");
    }

    #[test]
    fn selector_without_implementors() {
        let contents = hover("balance", &WorkspaceIndex::new()).unwrap();
        assert!(contents.contains("No implementors"));
        assert!(contents.ends_with("0 senders"));
    }

    #[test]
    fn variables_describe_their_declaration() {
        let index = WorkspaceIndex::new();
        assert_eq!(hover("amount.", &index).unwrap(), "`amount`: argument");
        assert_eq!(hover("total :=", &index).unwrap(), "`total`: temporary");
        assert_eq!(hover("self", &index).unwrap(), "`self`: the receiver");
    }

    #[test]
    fn globals_show_class_definitions() {
        let contents = hover("Account new", &indexed()).unwrap();
        assert!(contents.starts_with("class `Account`"));
        assert!(contents.contains("Superclass: `Object`"));
        assert_eq!(
            hover("Account new", &WorkspaceIndex::new()).unwrap(),
            "`Account`: instance variable or global"
        );
    }

    #[test]
    fn nothing_outside_smalltalk_regions() {
        assert!(hover("method:", &WorkspaceIndex::new()).is_none());
    }
}
