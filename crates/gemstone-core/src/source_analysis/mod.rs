// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexing and parsing of GemStone Smalltalk method source.
//!
//! **DDD Context:** Source Analysis
//!
//! This module contains the token model, the lexer and the parser.
//!
//! # Lexical Analysis
//!
//! [`tokenize`] converts source text into a flat stream of [`Token`]s ending
//! with [`TokenKind::Eof`]. Whitespace and comments are kept as tokens so the
//! formatter and folding provider can see the original layout.
//!
//! ```
//! use gemstone_core::source_analysis::{TokenKind, tokenize};
//!
//! let tokens = tokenize("x + 1");
//! assert_eq!(tokens.len(), 6); // x, ws, +, ws, 1, EOF
//! assert_eq!(tokens[2].kind(), TokenKind::BinarySelector);
//! ```
//!
//! # Parsing
//!
//! [`parse`] reads exactly one method: a message pattern, an optional
//! primitive declaration, pragmas, temporaries and statements. [`parse_code`]
//! reads a bare statement list (a Topaz `run` block or a class definition).
//!
//! # Error Handling
//!
//! Nothing here fails. The lexer turns unknown input into
//! [`TokenKind::Error`] tokens; the parser records a [`Diagnostic`] and
//! synthesizes a placeholder node so the rest of the method still parses.

mod lexer;
mod parser;
mod span;
mod token;


pub use lexer::{Lexer, is_binary_selector_char, tokenize, tokenize_at};
pub use parser::{Diagnostic, Severity, parse, parse_code};
pub use span::{LineIndex, Position, Span};
pub use token::{Token, TokenKind};
