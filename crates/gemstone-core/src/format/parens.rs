// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Deciding when parentheses can be dropped.
//!
//! **DDD Context:** Formatting
//!
//! Smalltalk has three fixed precedence tiers (unary, binary, keyword) plus
//! cascades. Parenthesized content gets an effective level:
//!
//! | Level | Content                   |
//! |-------|---------------------------|
//! | 0     | a single primary          |
//! | 1     | unary messages only       |
//! | 2     | a binary message          |
//! | 3     | a keyword message         |
//! | 4     | a cascade                 |
//!
//! Each slot a parenthesized expression can sit in accepts content up to
//! some level without changing how the surrounding code binds.

use crate::ast::{Expression, Message, Primary, Statement};

/// Where an expression sits relative to the message that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A statement, assignment value, return value or array element.
    Standalone,
    /// The receiver of a unary message.
    UnaryReceiver,
    /// The receiver of a binary message.
    BinaryReceiver,
    /// The receiver of a keyword message.
    KeywordReceiver,
    /// The argument of a binary message.
    BinaryArgument,
    /// A keyword message argument.
    KeywordArgument,
}

impl Slot {
    /// The highest content level this slot accepts unparenthesized.
    const fn max_level(self) -> u8 {
        match self {
            Self::Standalone => 3,
            Self::UnaryReceiver | Self::BinaryArgument => 1,
            Self::BinaryReceiver | Self::KeywordReceiver | Self::KeywordArgument => 2,
        }
    }

    /// The slot of an expression's receiver, given its first message.
    pub(crate) fn receiver_of(expression: &Expression) -> Option<Self> {
        expression.messages.first().map(|message| match message {
            Message::Unary(_) => Self::UnaryReceiver,
            Message::Binary(_) => Self::BinaryReceiver,
            Message::Keyword(_) => Self::KeywordReceiver,
        })
    }
}

/// Returns the effective precedence level of a statement, or `None` for
/// assignments and returns, which are never unwrapped.
///
/// Bare parenthesized expressions are looked through, so `((a + b))` has
/// level 2.
pub fn effective_level(statement: &Statement) -> Option<u8> {
    match statement {
        Statement::Expression(expression) => expression_level(expression),
        Statement::Assignment(_) | Statement::Return(_) => None,
    }
}

fn expression_level(expression: &Expression) -> Option<u8> {
    if !expression.cascades.is_empty() {
        return Some(4);
    }
    let level = expression
        .messages
        .iter()
        .map(|message| match message {
            Message::Unary(_) => 1,
            Message::Binary(_) => 2,
            Message::Keyword(_) => 3,
        })
        .max();
    match (level, &expression.receiver) {
        (Some(level), _) => Some(level),
        (None, Primary::Paren(paren)) => effective_level(&paren.expression),
        (None, _) => Some(0),
    }
}

/// Returns true if parentheses around `content` in `slot` can be dropped.
pub fn is_removable(content: &Statement, slot: Slot) -> bool {
    effective_level(content).is_some_and(|level| level <= slot.max_level())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse_code, tokenize};

    /// Parses `source` as one statement and returns the content of its
    /// first parenthesized primary together with the slot it occupies.
    fn first_paren(source: &str) -> (Statement, Slot) {
        let (body, diagnostics) = parse_code(tokenize(source));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let statement = body.statements.into_iter().next().unwrap();
        let expression = match statement {
            Statement::Expression(e) => e,
            Statement::Return(r) => match *r.expression {
                Statement::Expression(e) => e,
                other => panic!("unexpected {other:?}"),
            },
            Statement::Assignment(a) => match *a.value {
                Statement::Expression(e) => e,
                other => panic!("unexpected {other:?}"),
            },
        };
        if let Primary::Paren(paren) = &expression.receiver {
            let slot = Slot::receiver_of(&expression).unwrap_or(Slot::Standalone);
            return (*paren.expression.clone(), slot);
        }
        for message in &expression.messages {
            match message {
                Message::Binary(binary) => {
                    if let Primary::Paren(paren) = &binary.argument.receiver {
                        return (*paren.expression.clone(), Slot::BinaryArgument);
                    }
                }
                Message::Keyword(keyword) => {
                    for part in &keyword.parts {
                        if let Primary::Paren(paren) = &part.value.receiver {
                            return (*paren.expression.clone(), Slot::KeywordArgument);
                        }
                    }
                }
                Message::Unary(_) => {}
            }
        }
        panic!("no parentheses in {source}");
    }

    fn removable(source: &str) -> bool {
        let (content, slot) = first_paren(source);
        is_removable(&content, slot)
    }

    #[test]
    fn levels() {
        let level = |source: &str| effective_level(&first_paren(source).0);
        assert_eq!(level("(a)"), Some(0));
        assert_eq!(level("(a foo bar)"), Some(1));
        assert_eq!(level("(a foo + b)"), Some(2));
        assert_eq!(level("(a at: 1)"), Some(3));
        assert_eq!(level("(a foo; bar)"), Some(4));
        assert_eq!(level("((a + b))"), Some(2));
        assert_eq!(level("(x := 3)"), None);
    }

    #[test]
    fn receiver_slots() {
        assert!(removable("(a foo) bar"));
        assert!(!removable("(a + b) bar"));
        assert!(removable("(a + b) * c"));
        assert!(!removable("(a at: 1) + c"));
        assert!(removable("(a + b) at: 1"));
        assert!(!removable("(a at: 1) at: 2"));
        assert!(!removable("((a + b)) foo"));
    }

    #[test]
    fn argument_slots() {
        assert!(removable("a + (b foo)"));
        assert!(!removable("a + (b * c)"));
        assert!(removable("a at: (b + c)"));
        assert!(!removable("a at: (b at: c)"));
    }

    #[test]
    fn standalone_parens() {
        assert!(removable("(a at: 1 put: 2)"));
        assert!(removable("^(a + b)"));
        assert!(removable("x := (a foo: b)"));
        assert!(!removable("(a foo; bar)"));
        assert!(!removable("(x := 3)"));
    }
}
