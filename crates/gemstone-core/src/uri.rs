// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Virtual `gemstone:` URIs addressing method and class-definition source.
//!
//! **DDD Context:** Source Analysis
//!
//! The object browser hands the engine single methods and class definitions
//! under URIs of two shapes:
//!
//! ```text
//! gemstone://<session>/<dictionary>/<class>/<instance|class>/<category>/<selector>
//! gemstone://<session>/<dictionary>/<class>/definition
//! ```
//!
//! Path segments are percent-encoded (`%20` for spaces in categories,
//! `%2B` for `+` and so on).

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

/// The URI scheme for browser-supplied source.
pub const SCHEME: &str = "gemstone";

/// A malformed `gemstone:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum UriError {
    /// The URI does not use the `gemstone:` scheme.
    #[error("'{0}' is not a gemstone: URI")]
    #[diagnostic(
        code(gemstone::uri::scheme),
        help("browser URIs look like gemstone://<session>/<dictionary>/<class>/...")
    )]
    WrongScheme(String),

    /// The path has the wrong number or kind of segments.
    #[error("'{0}' does not address a method or class definition")]
    #[diagnostic(
        code(gemstone::uri::shape),
        help(
            "expected /<dictionary>/<class>/<instance|class>/<category>/<selector> \
             or /<dictionary>/<class>/definition"
        )
    )]
    BadShape(String),

    /// A `%` escape is not followed by two hex digits.
    #[error("invalid percent escape in '{0}'")]
    #[diagnostic(code(gemstone::uri::escape))]
    BadEscape(String),
}

/// What a Smalltalk URI addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriTarget {
    /// One method.
    Method {
        /// True for `class`, false for `instance`.
        class_side: bool,
        /// The method category.
        category: EcoString,
        /// The method selector.
        selector: EcoString,
    },
    /// The class definition expression.
    Definition,
}

/// A parsed `gemstone:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmalltalkUri {
    /// The session identifier (URI authority).
    pub session: EcoString,
    /// The symbol dictionary holding the class.
    pub dictionary: EcoString,
    /// The class name.
    pub class_name: EcoString,
    /// Method or definition.
    pub target: UriTarget,
}

impl SmalltalkUri {
    /// Parses a `gemstone:` URI.
    ///
    /// # Errors
    ///
    /// Returns [`UriError`] when the scheme, shape or escapes are wrong.
    ///
    /// # Examples
    ///
    /// ```
    /// use gemstone_core::uri::{SmalltalkUri, UriTarget};
    ///
    /// let uri = SmalltalkUri::parse("gemstone://1/UserGlobals/Account/instance/accessing/balance").unwrap();
    /// assert_eq!(uri.class_name, "Account");
    /// assert!(matches!(uri.target, UriTarget::Method { class_side: false, .. }));
    /// ```
    pub fn parse(uri: &str) -> Result<Self, UriError> {
        let rest = uri
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix(':'))
            .ok_or_else(|| UriError::WrongScheme(uri.to_string()))?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);

        let segments = rest
            .split('/')
            .map(|s| percent_decode(s).ok_or_else(|| UriError::BadEscape(uri.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        let bad_shape = || UriError::BadShape(uri.to_string());

        match segments.as_slice() {
            [session, dictionary, class_name, definition] if definition == "definition" => {
                Ok(Self {
                    session: session.clone(),
                    dictionary: dictionary.clone(),
                    class_name: class_name.clone(),
                    target: UriTarget::Definition,
                })
            }
            [session, dictionary, class_name, side, category, selector]
                if !selector.is_empty() && !class_name.is_empty() =>
            {
                let class_side = match side.as_str() {
                    "instance" => false,
                    "class" => true,
                    _ => return Err(bad_shape()),
                };
                Ok(Self {
                    session: session.clone(),
                    dictionary: dictionary.clone(),
                    class_name: class_name.clone(),
                    target: UriTarget::Method {
                        class_side,
                        category: category.clone(),
                        selector: selector.clone(),
                    },
                })
            }
            _ => Err(bad_shape()),
        }
    }

    /// Returns true if `uri` uses the `gemstone:` scheme.
    #[must_use]
    pub fn is_smalltalk_uri(uri: &str) -> bool {
        uri.strip_prefix(SCHEME).is_some_and(|r| r.starts_with(':'))
    }
}

/// Decodes `%XX` escapes; returns `None` on a malformed escape.
fn percent_decode(segment: &str) -> Option<EcoString> {
    if !segment.contains('%') {
        return Some(segment.into());
    }
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok().map(EcoString::from)
}
