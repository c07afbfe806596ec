// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Layout tiers for keyword messages whose arguments are all blocks.
//!
//! **DDD Context:** Formatting
//!
//! `ifTrue:ifFalse:`, `ifNil:ifNotNil:` and friends read best in one of
//! three shapes:
//!
//! ```text
//! Tier 1          Tier 2                Tier 3
//! c ifTrue: [x]   c                     c ifTrue: [
//!   ifFalse: [y]    ifTrue: [x]             self a.
//!                   ifFalse: [self b]       self b
//!                                       ] ifFalse: [
//!                                           self c
//!                                       ]
//! ```
//!
//! Tier 1 keeps everything on one line and applies only when every block is
//! trivial. Tier 2 needs every block to fit on one line.

use crate::ast::{Block, Expression, KeywordMessage, Primary, Statement};

/// The layout chosen for an all-block keyword message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTier {
    /// The whole send on one line.
    Inline,
    /// Receiver alone, then one continuation line per keyword.
    Stacked,
    /// Bracket flow with indented block bodies.
    Flow,
}

/// Returns the literal blocks of a keyword message with two or more parts
/// whose arguments are all bare blocks.
pub fn block_arguments(message: &KeywordMessage) -> Option<Vec<&Block>> {
    if message.parts.len() < 2 {
        return None;
    }
    message
        .parts
        .iter()
        .map(|part| bare_block(&part.value))
        .collect()
}

fn bare_block(expression: &Expression) -> Option<&Block> {
    match &expression.receiver {
        Primary::Block(block) if expression.is_primary() => Some(block),
        _ => None,
    }
}

/// Returns true for an empty block or one holding a single bare variable or
/// literal, with no parameters or temporaries.
pub fn is_trivial(block: &Block) -> bool {
    if !block.parameters.is_empty() || block.temporaries_span.is_some() {
        return false;
    }
    match block.statements.as_slice() {
        [] => true,
        [Statement::Expression(expression)] => {
            expression.is_primary()
                && matches!(
                    expression.receiver,
                    Primary::Variable(_) | Primary::Literal(_)
                )
        }
        _ => false,
    }
}

/// Chooses the tier for `blocks`.
///
/// `fits_on_one_line` reports whether a block renders without line breaks;
/// it is only consulted for single-statement blocks.
pub fn classify<'b>(
    blocks: &[&'b Block],
    mut fits_on_one_line: impl FnMut(&'b Block) -> bool,
) -> BlockTier {
    if blocks.iter().all(|&block| is_trivial(block)) {
        return BlockTier::Inline;
    }
    let stackable = blocks
        .iter()
        .all(|&block| block.statements.len() <= 1 && fits_on_one_line(block));
    if stackable {
        BlockTier::Stacked
    } else {
        BlockTier::Flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Message;
    use crate::source_analysis::{parse_code, tokenize};

    fn keyword_message(source: &str) -> KeywordMessage {
        let (body, diagnostics) = parse_code(tokenize(source));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        match body.statements.into_iter().next() {
            Some(Statement::Expression(expression)) => match expression.messages.last() {
                Some(Message::Keyword(keyword)) => keyword.clone(),
                other => panic!("expected keyword message, got {other:?}"),
            },
            other => panic!("expected expression, got {other:?}"),
        }
    }

    fn tier(source: &str) -> Option<BlockTier> {
        let message = keyword_message(source);
        let blocks = block_arguments(&message)?;
        Some(classify(&blocks, |_| true))
    }

    #[test]
    fn trivial_blocks_stay_inline() {
        assert_eq!(tier("c ifTrue: [x] ifFalse: [nil]"), Some(BlockTier::Inline));
        assert_eq!(tier("c ifTrue: [] ifFalse: [3]"), Some(BlockTier::Inline));
    }

    #[test]
    fn single_statement_blocks_stack() {
        assert_eq!(tier("c ifTrue: [x] ifFalse: [self doB]"), Some(BlockTier::Stacked));
        assert_eq!(tier("c ifNil: [0] ifNotNil: [:v | v size]"), Some(BlockTier::Stacked));
    }

    #[test]
    fn multi_statement_blocks_flow() {
        assert_eq!(tier("c ifTrue: [a. b] ifFalse: [c]"), Some(BlockTier::Flow));
    }

    #[test]
    fn long_single_statement_blocks_flow() {
        let message = keyword_message("c ifTrue: [self a] ifFalse: [self b]");
        let blocks = block_arguments(&message).unwrap();
        assert_eq!(classify(&blocks, |_| false), BlockTier::Flow);
    }

    #[test]
    fn only_all_block_multi_part_messages_qualify() {
        assert_eq!(tier("c ifTrue: [x]"), None);
        assert_eq!(tier("d at: 1 ifAbsent: [0]"), None);
        assert_eq!(tier("c ifTrue: [x] value ifFalse: [y]"), None);
    }

    #[test]
    fn parameters_make_a_block_non_trivial() {
        let message = keyword_message("c ifNil: [:v | v] ifNotNil: [x]");
        let blocks = block_arguments(&message).unwrap();
        assert!(!is_trivial(blocks[0]));
        assert!(is_trivial(blocks[1]));
    }
}
