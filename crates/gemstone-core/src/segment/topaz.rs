// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Topaz script segmentation.
//!
//! **DDD Context:** Source Analysis
//!
//! A Topaz script is a sequence of command lines. Three commands open a
//! Smalltalk block that runs up to a line holding only `%`:
//!
//! ```text
//! set class Account
//! category: 'accessing'
//! method:
//! balance
//!     ^balance
//! %
//! run
//! Account new balance
//! %
//! ```
//!
//! Command words are case-insensitive and may be abbreviated down to a
//! per-command minimum length (`meth`, `print`, `classm`). The command line
//! and the `%` line belong to the surrounding opaque region; the Smalltalk
//! region holds exactly the lines between them.

use ecow::EcoString;
use tracing::trace;

use super::{Line, Region, RegionBuilder, RegionKind, lines};

/// What a recognized command line does.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// `run`, `doit`, `printit`: a bare code block follows.
    Code(EcoString),
    /// `method[:] [Class]` or `classmethod[:] [Class]`.
    Method {
        command: EcoString,
        class_name: Option<EcoString>,
        class_side: bool,
    },
    /// `set class [:] Name`
    SetClass(EcoString),
    /// `category: 'name'`
    Category(EcoString),
}

/// Block-opening commands with their minimum abbreviation lengths.
const BLOCK_COMMANDS: &[(&str, usize)] = &[
    ("run", 3),
    ("doit", 4),
    ("printit", 5),
    ("method", 4),
    ("classmethod", 6),
];

/// Returns true if `word` abbreviates `command` to at least `min` characters.
fn abbreviates(word: &str, command: &str, min: usize) -> bool {
    word.len() >= min && command.starts_with(word)
}

/// Splits a command line into its lower-cased leading word and the argument
/// text (a `:` directly after the word is dropped).
fn split_command(content: &str) -> Option<(String, &str)> {
    let trimmed = content.trim_start();
    let word_len = trimmed
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
        .unwrap_or(trimmed.len());
    if word_len == 0 {
        return None;
    }
    let (word, rest) = trimmed.split_at(word_len);
    if !(rest.is_empty() || rest.starts_with(':') || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
    Some((word.to_ascii_lowercase(), rest))
}

/// Strips the quoting Topaz allows around names: `'Foo'`, `#Foo`.
fn unquote(name: &str) -> EcoString {
    name.trim_start_matches('#').trim_matches('\'').into()
}

/// Returns the first whitespace-separated argument, unquoted.
fn first_argument(rest: &str) -> Option<EcoString> {
    rest.split_whitespace().next().map(unquote)
}

fn classify(content: &str) -> Option<Command> {
    let (word, rest) = split_command(content)?;

    if word == "set" {
        let (sub, name) = split_command(rest)?;
        return (sub == "class").then(|| first_argument(name)).flatten().map(Command::SetClass);
    }
    if word == "category" {
        let name = rest.trim();
        return (!name.is_empty()).then(|| Command::Category(unquote(name)));
    }

    let (command, _) = BLOCK_COMMANDS
        .iter()
        .find(|(command, min)| abbreviates(&word, command, *min))?;
    match *command {
        "method" | "classmethod" => Some(Command::Method {
            command: (*command).into(),
            class_name: first_argument(rest),
            class_side: *command == "classmethod",
        }),
        _ if rest.is_empty() => Some(Command::Code((*command).into())),
        // `run foo` is not a block opener
        _ => None,
    }
}

/// Returns true for a block terminator line.
fn is_terminator(line: &Line<'_>) -> bool {
    line.content.trim() == "%"
}

/// Splits a Topaz script into regions.
///
/// # Examples
///
/// ```
/// use gemstone_core::segment::{RegionKind, segment_topaz};
///
/// let regions = segment_topaz("run\n1 + 2\n%\n");
/// let kinds: Vec<_> = regions.iter().map(|r| r.kind).collect();
/// assert_eq!(kinds, vec![RegionKind::Opaque, RegionKind::Code, RegionKind::Opaque]);
/// assert_eq!(regions[1].text, "1 + 2\n");
/// ```
#[must_use]
pub fn segment_topaz(source: &str) -> Vec<Region> {
    let all = lines(source);
    let mut builder = RegionBuilder::new(source);
    let mut current_class: Option<EcoString> = None;
    let mut category: Option<EcoString> = None;

    let mut i = 0;
    while i < all.len() {
        let line = all[i];
        builder.opaque(line.start, line.end());
        i += 1;

        let (kind, command, class_name, class_side) = match classify(line.content) {
            None => continue,
            Some(Command::SetClass(name)) => {
                current_class = Some(name);
                continue;
            }
            Some(Command::Category(name)) => {
                category = Some(name);
                continue;
            }
            Some(Command::Code(command)) => (RegionKind::Code, command, None, false),
            Some(Command::Method {
                command,
                class_name,
                class_side,
            }) => (
                RegionKind::Method,
                command,
                class_name.or_else(|| current_class.clone()),
                class_side,
            ),
        };

        let body_start = i;
        while i < all.len() && !is_terminator(&all[i]) {
            i += 1;
        }
        let start = all.get(body_start).map_or(line.end(), |l| l.start);
        let end = if i > body_start { all[i - 1].end() } else { start };
        trace!(%command, start_line = start.line, "topaz block");
        if let Some(region) = builder.push(kind, start, end) {
            region.command = Some(command);
            if kind == RegionKind::Method {
                region.class_name = class_name;
                region.class_side = class_side;
                region.category.clone_from(&category);
            }
        }
        // The terminator joins the next opaque run.
        if let Some(terminator) = all.get(i) {
            builder.opaque(terminator.start, terminator.end());
            i += 1;
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(regions: &[Region]) -> Vec<RegionKind> {
        regions.iter().map(|r| r.kind).collect()
    }

    fn reassemble(regions: &[Region]) -> String {
        regions.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn run_block() {
        let source = "run\n1+2\n%";
        let regions = segment_topaz(source);
        assert_eq!(
            kinds(&regions),
            vec![RegionKind::Opaque, RegionKind::Code, RegionKind::Opaque]
        );
        assert_eq!(regions[1].text, "1+2\n");
        assert_eq!((regions[1].start_line, regions[1].end_line), (1, 1));
        assert_eq!(regions[1].command.as_deref(), Some("run"));
        assert_eq!(regions[2].text, "%");
        assert_eq!(reassemble(&regions), source);
    }

    #[test]
    fn method_with_explicit_class() {
        let source = "method: Account\nbalance\n  ^balance\n%\n";
        let regions = segment_topaz(source);
        let method = &regions[1];
        assert_eq!(method.kind, RegionKind::Method);
        assert_eq!(method.class_name.as_deref(), Some("Account"));
        assert!(!method.class_side);
        assert_eq!(method.text, "balance\n  ^balance\n");
        assert_eq!((method.start_line, method.end_line), (1, 2));
    }

    #[test]
    fn set_class_supplies_default_class() {
        let source = "set class Account\ncategory: 'accessing'\nclassmethod:\nnew\n  ^super new\n%\n\
                      set class: Other\nmethod\nfoo\n%\n";
        let regions = segment_topaz(source);
        let methods: Vec<_> = regions.iter().filter(|r| r.kind == RegionKind::Method).collect();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].class_name.as_deref(), Some("Account"));
        assert!(methods[0].class_side);
        assert_eq!(methods[0].category.as_deref(), Some("accessing"));
        assert_eq!(methods[1].class_name.as_deref(), Some("Other"));
        assert_eq!(reassemble(&regions), source);
    }

    #[test]
    fn commands_may_be_abbreviated() {
        for (command, kind) in [
            ("RUN", RegionKind::Code),
            ("doit", RegionKind::Code),
            ("print", RegionKind::Code),
            ("printit", RegionKind::Code),
            ("meth: Foo", RegionKind::Method),
            ("classm: Foo", RegionKind::Method),
        ] {
            let regions = segment_topaz(&format!("{command}\nx\n%\n"));
            assert_eq!(regions[1].kind, kind, "{command}");
        }
        for not_a_command in ["ru", "pri", "met", "class", "printString", "run now"] {
            let regions = segment_topaz(&format!("{not_a_command}\nx\n%\n"));
            assert_eq!(regions.len(), 1, "{not_a_command}");
            assert_eq!(regions[0].kind, RegionKind::Opaque);
        }
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let source = "doit\nx foo.\ny bar";
        let regions = segment_topaz(source);
        assert_eq!(kinds(&regions), vec![RegionKind::Opaque, RegionKind::Code]);
        assert_eq!(regions[1].text, "x foo.\ny bar");
    }

    #[test]
    fn empty_block_has_no_smalltalk_region() {
        let regions = segment_topaz("run\n%\n");
        assert_eq!(kinds(&regions), vec![RegionKind::Opaque]);
        assert_eq!(regions[0].text, "run\n%\n");
    }

    #[test]
    fn opaque_lines_are_preserved() {
        let source = "! comment\nlogin\nset user DataCurator\nrun\n3\n%\ncommit\n";
        let regions = segment_topaz(source);
        assert_eq!(regions[0].text, "! comment\nlogin\nset user DataCurator\nrun\n");
        assert_eq!(regions[2].text, "%\ncommit\n");
        assert_eq!(reassemble(&regions), source);
    }

    #[test]
    fn crlf_lines() {
        let source = "run\r\n1\r\n%\r\n";
        let regions = segment_topaz(source);
        assert_eq!(regions[1].text, "1\r\n");
        assert_eq!(reassemble(&regions), source);
    }

    #[test]
    fn split_command_words() {
        assert_eq!(split_command("method: Foo"), Some(("method".into(), "Foo")));
        assert_eq!(split_command("  RUN  "), Some(("run".into(), "")));
        assert_eq!(split_command("set class: Foo"), Some(("set".into(), "class: Foo")));
        assert_eq!(split_command("1 + 2"), None);
        assert_eq!(split_command("foo.bar"), None);
    }
}
