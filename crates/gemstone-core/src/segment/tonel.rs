// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tonel file segmentation.
//!
//! **DDD Context:** Source Analysis
//!
//! A Tonel `.st` file holds one class (or extension, or package marker):
//!
//! ```text
//! "
//! I model a bank account.
//! "
//! Class {
//!     #name : 'Account',
//!     #superclass : 'Object',
//!     #category : 'Bank'
//! }
//!
//! { #category : 'accessing' }
//! Account >> balance [
//!     ^ balance
//! ]
//! ```
//!
//! The header becomes an opaque region carrying [`TonelHeader`] metadata.
//! Each `Class [class] >> pattern [ body ]` becomes a method region whose
//! parse text has the `Class >>` prefix and the body brackets blanked to
//! spaces, so the lexer sees `pattern body` at the original columns.

use ecow::EcoString;
use tracing::trace;

use super::{HeaderKind, Line, Region, RegionBuilder, RegionKind, TonelHeader, lines};

// ============================================================================
// Delimiter matching
// ============================================================================

/// Returns the offset of the delimiter closing `source[open]`, skipping
/// strings, comments and character literals.
fn matching_close(source: &str, open: usize, opener: u8, closer: u8) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i)?,
            b'$' => i += 1,
            b if b == opener => depth += 1,
            b if b == closer => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Returns the offset of the quote closing the literal opened at `start`.
fn skip_quoted(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    bytes[start + 1..]
        .iter()
        .position(|&b| b == quote)
        .map(|n| start + 1 + n)
}

// ============================================================================
// Header metadata
// ============================================================================

/// Recognizes `Class {`, `Extension {` or `Package {` at the start of a line,
/// returning the kind and the offset of the `{` within `content`.
fn header_start(content: &str) -> Option<(HeaderKind, usize)> {
    let trimmed = content.trim_start();
    let indent = content.len() - trimmed.len();
    let (kind, rest) = [
        (HeaderKind::Class, "Class"),
        (HeaderKind::Extension, "Extension"),
        (HeaderKind::Package, "Package"),
    ]
    .into_iter()
    .find_map(|(kind, word)| trimmed.strip_prefix(word).map(|rest| (kind, rest)))?;
    let after_word = rest.trim_start();
    after_word
        .starts_with('{')
        .then(|| (kind, indent + (trimmed.len() - after_word.len())))
}

/// Looks up `#key : value` in STON header text.
///
/// Values may be quoted strings (`'Foo'`), symbols (`#Foo`) or bare words.
fn ston_value(text: &str, key: &str) -> Option<EcoString> {
    let needle = format!("#{key}");
    let mut search = text;
    while let Some(found) = search.find(&needle) {
        let rest = &search[found + needle.len()..];
        search = rest;
        if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            continue;
        }
        let Some(value) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let value = value.trim_start();
        if let Some(quoted) = value.strip_prefix('\'') {
            return quoted_value(quoted);
        }
        let value = value.strip_prefix('#').unwrap_or(value);
        let value = value.strip_prefix('\'').map_or_else(
            || {
                let end = value
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
                    .unwrap_or(value.len());
                Some(EcoString::from(&value[..end]))
            },
            quoted_value,
        )?;
        return (!value.is_empty()).then_some(value);
    }
    None
}

/// Reads a `'...'` body (after the opening quote), undoubling `''`.
fn quoted_value(body: &str) -> Option<EcoString> {
    let mut value = EcoString::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            } else {
                return Some(value);
            }
        }
        value.push(c);
    }
    None
}

fn parse_header(kind: HeaderKind, text: &str) -> Option<TonelHeader> {
    Some(TonelHeader {
        kind,
        name: ston_value(text, "name")?,
        superclass: ston_value(text, "superclass"),
        category: ston_value(text, "category"),
    })
}

// ============================================================================
// Method headers
// ============================================================================

/// A recognized `Class [class] >> ` prefix.
#[derive(Debug, PartialEq, Eq)]
struct MethodHeader {
    class_name: EcoString,
    class_side: bool,
    /// Offset of the pattern within the line.
    pattern_start: usize,
}

fn method_header(content: &str) -> Option<MethodHeader> {
    let is_name_char = |c: char| c.is_alphanumeric() || c == '_';
    let trimmed = content.trim_start();
    let name_len = trimmed.find(|c: char| !is_name_char(c)).unwrap_or(trimmed.len());
    if name_len == 0 || !trimmed.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        return None;
    }
    let (class_name, mut rest) = trimmed.split_at(name_len);

    let mut class_side = false;
    let after_space = rest.trim_start();
    if let Some(after_class) = after_space.strip_prefix("class") {
        if after_class.starts_with(char::is_whitespace) || after_class.starts_with(">>") {
            class_side = true;
            rest = after_class;
        }
    }

    let pattern = rest.trim_start().strip_prefix(">>")?.trim_start();
    Some(MethodHeader {
        class_name: class_name.into(),
        class_side,
        pattern_start: content.len() - pattern.len(),
    })
}

/// Replaces `text[range]` with spaces, keeping newlines and byte length.
fn blank(text: &mut [u8], range: std::ops::Range<usize>) {
    for byte in &mut text[range] {
        if *byte != b'\n' && *byte != b'\r' {
            *byte = b' ';
        }
    }
}

/// Returns the index of the line containing byte `offset`.
fn line_containing(all: &[Line<'_>], from: usize, offset: usize) -> usize {
    let mut i = from;
    while i + 1 < all.len() && (all[i].end().offset as usize) <= offset {
        i += 1;
    }
    i
}

// ============================================================================
// Segmentation
// ============================================================================

/// Splits a Tonel file into regions.
///
/// # Examples
///
/// ```
/// use gemstone_core::segment::{RegionKind, segment_tonel};
///
/// let source = "Class { #name : 'Foo' }\n\nFoo >> bar [\n\t^1\n]\n";
/// let regions = segment_tonel(source);
/// let method = regions.iter().find(|r| r.kind == RegionKind::Method).unwrap();
/// assert_eq!(method.class_name.as_deref(), Some("Foo"));
/// assert_eq!(method.code, "       bar  \n\t^1\n \n");
/// ```
#[must_use]
pub fn segment_tonel(source: &str) -> Vec<Region> {
    let all = lines(source);
    let mut builder = RegionBuilder::new(source);
    let mut category: Option<EcoString> = None;
    let mut seen_header = false;

    let mut i = 0;
    while i < all.len() {
        let line = all[i];
        let line_offset = line.start.offset as usize;
        let trimmed = line.content.trim_start();

        // Free-text comment: skip to its closing quote.
        if trimmed.starts_with('"') {
            let open = line_offset + (line.content.len() - trimmed.len());
            let last = skip_quoted(source.as_bytes(), open)
                .map_or(all.len() - 1, |close| line_containing(&all, i, close));
            builder.opaque(line.start, all[last].end());
            i = last + 1;
            continue;
        }

        // `{ #category : 'x' }` annotation.
        if trimmed.starts_with('{') {
            let open = line_offset + (line.content.len() - trimmed.len());
            let last = matching_close(source, open, b'{', b'}')
                .map_or(i, |close| line_containing(&all, i, close));
            let end = all[last].end();
            let annotation = &source[open..end.offset as usize];
            category = ston_value(annotation, "category");
            builder.opaque(line.start, end);
            i = last + 1;
            continue;
        }

        if !seen_header {
            if let Some((kind, brace)) = header_start(line.content) {
                let open = line_offset + brace;
                let last = matching_close(source, open, b'{', b'}')
                    .map_or(all.len() - 1, |close| line_containing(&all, i, close));
                let end = all[last].end();
                let header = parse_header(kind, &source[open..end.offset as usize]);
                trace!(?header, "tonel header");
                if let Some(region) = builder.push(RegionKind::Opaque, line.start, end) {
                    region.class_name = header.as_ref().map(|h| h.name.clone());
                    region.header = header;
                }
                seen_header = true;
                i = last + 1;
                continue;
            }
        }

        if let Some(header) = method_header(line.content) {
            let pattern_start = line_offset + header.pattern_start;
            if let Some(bracket) = body_bracket(source, pattern_start) {
                let close = matching_close(source, bracket, b'[', b']');
                let last = close.map_or(all.len() - 1, |c| line_containing(&all, i, c));
                let end = all[last].end();

                let mut code = source.as_bytes()[line_offset..end.offset as usize].to_vec();
                blank(&mut code, 0..header.pattern_start);
                blank(&mut code, bracket - line_offset..bracket - line_offset + 1);
                if let Some(close) = close {
                    let line_end = all[last].start.offset as usize + all[last].content.len();
                    blank(&mut code, close - line_offset..line_end - line_offset);
                }

                if let Some(region) = builder.push(RegionKind::Method, line.start, end) {
                    // Only ASCII bytes outside multi-byte sequences were replaced.
                    region.code = String::from_utf8(code)
                        .map_or_else(|_| region.text.clone(), EcoString::from);
                    region.class_name = Some(header.class_name);
                    region.class_side = header.class_side;
                    region.category = category.take();
                }
                i = last + 1;
                continue;
            }
        }

        builder.opaque(line.start, line.end());
        i += 1;
    }
    builder.finish()
}

/// Finds the `[` opening a method body after its pattern.
///
/// Only pattern text may precede the bracket: identifiers, keywords and
/// binary selector characters, possibly wrapped onto following lines. A
/// blank line, another method header or any other punctuation ends the
/// search.
fn body_bracket(source: &str, pattern_start: usize) -> Option<usize> {
    let mut offset = pattern_start;
    for (index, line) in source[pattern_start..].split_inclusive('\n').enumerate() {
        if index > 0 && (line.trim().is_empty() || method_header(line).is_some()) {
            return None;
        }
        for (n, c) in line.char_indices() {
            match c {
                '[' => return Some(offset + n),
                ']' | '^' | '.' | '\'' | '"' | '{' | '}' | '(' | ')' | '#' | '$' | ';' => {
                    return None;
                }
                _ => {}
            }
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "\"\nI model an account.\nClass { is not a header here\n\"\n\
Class {\n\t#name : 'Account',\n\t#superclass : #Object,\n\t#instVars : [ 'balance' ],\n\t#category : 'Bank'\n}\n\n\
{ #category : 'accessing' }\nAccount >> balance [\n\t^ balance\n]\n\n\
{ #category : 'instance creation' }\nAccount class >> new [\n\t\"a ] in a comment\"\n\t^ super new setBalance: ']'; yourself\n]\n";

    fn methods(regions: &[Region]) -> Vec<&Region> {
        regions.iter().filter(|r| r.kind == RegionKind::Method).collect()
    }

    #[test]
    fn segments_header_and_methods() {
        let regions = segment_tonel(ACCOUNT);
        let reassembled: String = regions.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(reassembled, ACCOUNT);

        let header = regions
            .iter()
            .find_map(|r| r.header.as_ref())
            .expect("header region");
        assert_eq!(header.kind, HeaderKind::Class);
        assert_eq!(header.name, "Account");
        assert_eq!(header.superclass.as_deref(), Some("Object"));
        assert_eq!(header.category.as_deref(), Some("Bank"));

        let methods = methods(&regions);
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].class_name.as_deref(), Some("Account"));
        assert!(!methods[0].class_side);
        assert_eq!(methods[0].category.as_deref(), Some("accessing"));
        assert!(methods[1].class_side);
        assert_eq!(methods[1].category.as_deref(), Some("instance creation"));
    }

    #[test]
    fn brackets_in_strings_and_comments_are_skipped() {
        let regions = segment_tonel(ACCOUNT);
        let new = methods(&regions)[1];
        assert!(new.text.ends_with("yourself\n]\n"));
        assert_eq!(new.end_line - new.start_line, 3);
    }

    #[test]
    fn parse_text_blanks_wrapper() {
        let regions = segment_tonel(ACCOUNT);
        let balance = methods(&regions)[0];
        assert_eq!(balance.text, "Account >> balance [\n\t^ balance\n]\n");
        assert_eq!(balance.code, "           balance  \n\t^ balance\n \n");
        assert_eq!(balance.code.len(), balance.text.len());
    }

    #[test]
    fn unterminated_method_runs_to_end() {
        let source = "Foo >> bar [\n\t^1\n";
        let regions = segment_tonel(source);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Method);
        assert_eq!(regions[0].code, "       bar  \n\t^1\n");
    }

    #[test]
    fn unrecognized_lines_are_opaque() {
        let source = "garbage here\nFoo >> bar [ ^1 ]\nmore garbage\n";
        let regions = segment_tonel(source);
        let kinds: Vec<_> = regions.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RegionKind::Opaque, RegionKind::Method, RegionKind::Opaque]
        );
        assert_eq!(regions[1].code, "       bar   ^1  \n");
    }

    #[test]
    fn header_without_body_bracket_is_opaque() {
        let source = "Foo >> stray\n\t^ 1\n\nFoo >> bar [\n\t^ 2\n]\n";
        let regions = segment_tonel(source);
        let methods = methods(&regions);
        assert_eq!(methods.len(), 1);
        assert!(methods[0].text.starts_with("Foo >> bar ["));
        assert_eq!(regions[0].kind, RegionKind::Opaque);
        assert_eq!(regions[0].text, "Foo >> stray\n\t^ 1\n\n");

        let adjacent = segment_tonel("Foo >> stray\nFoo >> bar [ ^2 ]\n");
        assert_eq!(self::methods(&adjacent).len(), 1);
        assert!(self::methods(&adjacent)[0].text.starts_with("Foo >> bar"));
    }

    #[test]
    fn keyword_pattern_may_wrap_before_body() {
        let source = "Foo >> at: i\n    put: v [\n\t^ v\n]\n";
        let regions = segment_tonel(source);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Method);
    }

    #[test]
    fn extension_header() {
        let regions = segment_tonel("Extension { #name : 'Object' }\n\nObject >> isFoo [ ^false ]\n");
        assert_eq!(regions[0].header.as_ref().map(|h| h.kind), Some(HeaderKind::Extension));
        assert_eq!(regions[0].class_name.as_deref(), Some("Object"));
    }

    #[test]
    fn binary_and_keyword_method_headers() {
        assert_eq!(
            method_header("Foo >> + other ["),
            Some(MethodHeader {
                class_name: "Foo".into(),
                class_side: false,
                pattern_start: 7
            })
        );
        let header = method_header("Foo class>>at: i put: v [").unwrap();
        assert!(header.class_side);
        assert_eq!(header.pattern_start, 11);
        assert!(method_header("classify >> x [").is_some_and(|h| !h.class_side));
        assert!(method_header("^ a >> b").is_none());
        assert!(method_header("x := y").is_none());
    }

    #[test]
    fn ston_values() {
        let text = "{ #name : 'It''s', #namespace : 'N', #superclass : #Object, #type : #variable }";
        assert_eq!(ston_value(text, "name").as_deref(), Some("It's"));
        assert_eq!(ston_value(text, "superclass").as_deref(), Some("Object"));
        assert_eq!(ston_value(text, "category"), None);
    }
}
