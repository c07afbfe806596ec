// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Definition provider for the language service.
//!
//! **DDD Context:** Language Service
//!
//! This domain service implements the `DefinitionProvider`. Resolution
//! depends on what the cursor is on:
//!
//! 1. A local variable jumps to its declaring identifier in the same
//!    document
//! 2. A selector lists the message pattern of every implementor in the
//!    [`WorkspaceIndex`]
//! 3. A global name lists every indexed class definition of that name

use crate::document::ParsedDocument;
use crate::language_service::{Location, Range, WorkspaceIndex};

use super::target::{TargetKind, target_at};

/// Finds the definitions of the symbol at `offset`.
///
/// Returns an empty list when the symbol has no known definition.
#[must_use]
pub fn find_definitions(
    document: &ParsedDocument,
    offset: u32,
    index: &WorkspaceIndex,
) -> Vec<Location> {
    let Some(target) = document
        .region_at(offset)
        .and_then(|region| target_at(region, offset))
    else {
        return Vec::new();
    };
    match target.kind {
        TargetKind::Variable(info) => vec![Location::new(document.uri.clone(), info.definition)],
        TargetKind::Selector(selector) => index
            .find_implementors(&selector)
            .into_iter()
            .map(|entry| Location::new(entry.uri.clone(), entry.pattern))
            .collect(),
        TargetKind::Global(name) => index
            .find_class(&name)
            .into_iter()
            .map(|class| {
                Location::new(
                    class.uri.clone(),
                    Range::lines(class.start_line, class.end_line),
                )
            })
            .collect(),
        TargetKind::PseudoVariable(_) | TargetKind::Literal(..) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;
    use crate::language_service::Position;

    const CALLER: &str = "method: Teller\nrun: amount\n  | a |\n  a := Account new.\n  ^a deposit: amount\n%\n";
    const ACCOUNT: &str = "Class {\n\t#name : 'Account'\n}\n\nAccount >> deposit: x [\n\t^x\n]\n";

    fn definitions(needle: &str) -> Vec<Location> {
        let mut index = WorkspaceIndex::new();
        index.index_text("file:///teller.gs", CALLER);
        index.index_text("file:///Account.st", ACCOUNT);
        let document = ParsedDocument::parse("file:///teller.gs", 1, CALLER, DocumentFormat::Topaz);
        let offset = u32::try_from(CALLER.find(needle).unwrap()).unwrap();
        find_definitions(&document, offset, &index)
    }

    #[test]
    fn variables_jump_to_their_declaration() {
        let found = definitions("a deposit");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uri, "file:///teller.gs");
        assert_eq!(found[0].range.start, Position::new(2, 4));

        let argument = definitions("amount\n%");
        assert_eq!(argument[0].range.start, Position::new(1, 5));
    }

    #[test]
    fn selectors_jump_to_implementors() {
        let found = definitions("deposit:");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uri, "file:///Account.st");
        assert_eq!(found[0].range.start, Position::new(4, 11));
    }

    #[test]
    fn globals_jump_to_class_definitions() {
        let found = definitions("Account new");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].range, Range::lines(0, 2));
    }

    #[test]
    fn unknown_symbols_have_no_definition() {
        assert!(definitions("new").is_empty());
        assert!(definitions("method:").is_empty());
    }
}
