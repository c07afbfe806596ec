// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parameter and result types of the `gemstone/*` custom requests.
//!
//! **DDD Context:** Language Service
//!
//! All types serialize in `camelCase` to match the rest of the protocol.

use gemstone_core::language_service::MethodEntry;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Range, TextDocumentPositionParams};

/// `gemstone/selectorAtPosition` takes a plain text-document position.
pub type SelectorAtPositionParams = TextDocumentPositionParams;

/// Parameters of `gemstone/searchMethods`.
#[derive(Debug, Deserialize)]
pub struct SearchMethodsParams {
    pub query: String,
}

/// Parameters of `gemstone/senders` and `gemstone/implementors`.
#[derive(Debug, Deserialize)]
pub struct SelectorParams {
    pub selector: String,
}

/// Parameters of `gemstone/indexFile`.
#[derive(Debug, Deserialize)]
pub struct IndexFileParams {
    pub uri: String,
    pub text: String,
}

/// Parameters of `gemstone/removeFile`.
#[derive(Debug, Deserialize)]
pub struct RemoveFileParams {
    pub uri: String,
}

/// One method in a search, senders or implementors result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub uri: String,
    pub selector: String,
    pub class_name: Option<String>,
    pub is_meta: bool,
    pub category: Option<String>,
    /// `Class >> selector`, as shown in pickers.
    pub display_name: String,
    /// The message pattern.
    pub range: Range,
}

impl MethodInfo {
    /// Builds the wire form of an index entry. Pattern columns are passed
    /// through unchanged since the declaring file may not be open.
    pub fn from_entry(entry: &MethodEntry) -> Self {
        Self {
            uri: entry.uri.to_string(),
            selector: entry.selector.to_string(),
            class_name: entry.class_name.as_ref().map(ToString::to_string),
            is_meta: entry.class_side,
            category: entry.category.as_ref().map(ToString::to_string),
            display_name: entry.display_name(),
            range: crate::convert::to_lsp_range(entry.pattern, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemstone_core::language_service::WorkspaceIndex;

    #[test]
    fn method_info_serializes_camel_case() {
        let mut index = WorkspaceIndex::new();
        index.index_text(
            "file:///a.gs",
            "category: 'accessing'\nclassmethod: Account\nnew\n  ^super new\n%\n",
        );
        let entry = index.find_implementors("new")[0];
        let json = serde_json::to_value(MethodInfo::from_entry(entry)).unwrap();
        assert_eq!(json["className"], "Account");
        assert_eq!(json["isMeta"], true);
        assert_eq!(json["displayName"], "Account class >> new");
        assert_eq!(json["range"]["start"]["line"], 2);
    }

    #[test]
    fn params_deserialize() {
        let params: IndexFileParams =
            serde_json::from_str(r#"{"uri":"file:///a.gs","text":"run\n1\n%\n"}"#).unwrap();
        assert_eq!(params.uri, "file:///a.gs");
        let params: SelectorParams = serde_json::from_str(r#"{"selector":"at:put:"}"#).unwrap();
        assert_eq!(params.selector, "at:put:");
    }
}
