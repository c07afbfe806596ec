// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Layout documents for the Smalltalk formatter.
//!
//! **DDD Context:** Formatting
//!
//! The printer builds a tree of [`Document`] values and renders it in a
//! final pass. Layout decisions (one line or many) are made by the printer,
//! so there are no groups or soft breaks here: a [`Document::Line`] is
//! always a newline. Indentation is a string prefix pushed by
//! [`Document::Nest`], which lets the printer mix tab units with
//! space continuation indents.
//!
//! Indentation is written lazily, only when text follows on the same
//! line, so rendered output never carries trailing whitespace.
//!
//! ```
//! use gemstone_core::format::document::{line, nest};
//! use gemstone_core::docvec;
//!
//! let doc = docvec!["foo", nest("\t", docvec![line(), "^self"])];
//! assert_eq!(doc.to_pretty_string(), "foo\n\t^self");
//! ```

/// A renderable layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    /// Borrowed text. Embedded newlines are written as-is.
    Str(&'a str),
    /// Owned text. Embedded newlines are written as-is.
    String(String),
    /// A newline; the next text on the new line gets the current indent.
    Line,
    /// Appends a prefix to the indentation of the inner document.
    Nest(&'a str, Box<Document<'a>>),
    /// A sequence of documents.
    Vec(Vec<Document<'a>>),
    /// Nothing.
    Nil,
}

/// Coerce a value into a `Document`.
pub trait Documentable<'a> {
    fn to_doc(self) -> Document<'a>;
}

impl<'a> Documentable<'a> for &'a str {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self)
    }
}

impl<'a> Documentable<'a> for String {
    fn to_doc(self) -> Document<'a> {
        Document::String(self)
    }
}

impl<'a> Documentable<'a> for Document<'a> {
    fn to_doc(self) -> Document<'a> {
        self
    }
}

impl<'a> Documentable<'a> for Vec<Document<'a>> {
    fn to_doc(self) -> Document<'a> {
        Document::Vec(self)
    }
}

/// Concatenates documentable values into one `Document::Vec`.
///
/// ```
/// use gemstone_core::docvec;
///
/// assert_eq!(docvec!["a", " := ", "3"].to_pretty_string(), "a := 3");
/// ```
#[macro_export]
macro_rules! docvec {
    () => {
        $crate::format::document::Document::Vec(Vec::new())
    };

    ($($item:expr),+ $(,)?) => {
        $crate::format::document::Document::Vec(
            vec![$($crate::format::document::Documentable::to_doc($item)),+]
        )
    };
}

/// A hard newline.
#[must_use]
pub fn line() -> Document<'static> {
    Document::Line
}

/// An empty document.
#[must_use]
pub fn nil() -> Document<'static> {
    Document::Nil
}

/// Indents `doc` by `prefix` relative to the enclosing indentation.
#[must_use]
pub fn nest<'a>(prefix: &'a str, doc: Document<'a>) -> Document<'a> {
    Document::Nest(prefix, Box::new(doc))
}

/// Joins documents with a separator between each pair.
#[must_use]
pub fn join<'a>(
    docs: impl IntoIterator<Item = Document<'a>>,
    separator: &Document<'a>,
) -> Document<'a> {
    let mut result = Vec::new();
    for doc in docs {
        if !result.is_empty() {
            result.push(separator.clone());
        }
        result.push(doc);
    }
    if result.is_empty() {
        Document::Nil
    } else {
        Document::Vec(result)
    }
}

/// Concatenates documents without any separator.
#[must_use]
pub fn concat<'a>(docs: impl IntoIterator<Item = Document<'a>>) -> Document<'a> {
    Document::Vec(docs.into_iter().collect())
}

// --- Rendering ---

struct Renderer {
    out: String,
    at_line_start: bool,
}

impl Renderer {
    fn text(&mut self, text: &str, indent: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            self.out.push_str(indent);
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    fn render(&mut self, doc: &Document<'_>, indent: &str) {
        match doc {
            Document::Str(s) => self.text(s, indent),
            Document::String(s) => self.text(s, indent),
            Document::Line => {
                self.out.push('\n');
                self.at_line_start = true;
            }
            Document::Nest(prefix, inner) => {
                let mut nested = String::with_capacity(indent.len() + prefix.len());
                nested.push_str(indent);
                nested.push_str(prefix);
                self.render(inner, &nested);
            }
            Document::Vec(docs) => {
                for doc in docs {
                    self.render(doc, indent);
                }
            }
            Document::Nil => {}
        }
    }
}

impl Document<'_> {
    /// Renders the document with no base indentation.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        let mut renderer = Renderer {
            out: String::new(),
            at_line_start: true,
        };
        renderer.render(self, "");
        renderer.out
    }

    /// Returns true if the document contains no line breaks, including
    /// newlines embedded in verbatim text.
    #[must_use]
    pub fn is_single_line(&self) -> bool {
        match self {
            Self::Str(s) => !s.contains('\n'),
            Self::String(s) => !s.contains('\n'),
            Self::Line => false,
            Self::Nest(_, inner) => inner.is_single_line(),
            Self::Vec(docs) => docs.iter().all(Document::is_single_line),
            Self::Nil => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_accumulates_prefixes() {
        let doc = docvec![
            "a",
            nest("\t", docvec![line(), "b", nest("  ", docvec![line(), "c"])]),
            line(),
            "d"
        ];
        assert_eq!(doc.to_pretty_string(), "a\n\tb\n\t  c\nd");
    }

    #[test]
    fn blank_lines_carry_no_indentation() {
        let doc = nest("\t", docvec!["x", line(), line(), "y"]);
        assert_eq!(doc.to_pretty_string(), "\tx\n\n\ty");
    }

    #[test]
    fn join_inserts_separators() {
        let doc = join(vec![Document::Str("a"), Document::Str("b")], &Document::Str(". "));
        assert_eq!(doc.to_pretty_string(), "a. b");
        assert_eq!(join(Vec::new(), &Document::Str(",")), Document::Nil);
    }

    #[test]
    fn single_line_detection() {
        assert!(docvec!["a", "b"].is_single_line());
        assert!(!docvec!["a", line(), "b"].is_single_line());
        assert!(!Document::String("x\ny".into()).is_single_line());
        assert!(concat(vec![nil(), Document::Str("z")]).is_single_line());
    }

    #[test]
    fn verbatim_text_keeps_its_own_newlines() {
        let doc = nest("\t", docvec!["\"one\n  two\""]);
        assert_eq!(doc.to_pretty_string(), "\t\"one\n  two\"");
    }
}
