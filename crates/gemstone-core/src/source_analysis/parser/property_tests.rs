// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the GemStone Smalltalk parser.
//!
//! These tests use `proptest` to verify parser invariants over generated inputs:
//!
//! 1. **Parser never panics**: arbitrary string input always returns a result
//! 2. **Diagnostic spans within input**: all spans end at or before the input end
//! 3. **Placeholders produce diagnostics**: a synthesized name implies an error
//! 4. **Error messages are user-facing**: no internal type names in diagnostics
//! 5. **Statement spans nest inside the method span**
//!
//! **DDD Context:** Source Analysis

use proptest::prelude::*;

use crate::ast::{Expression, Method, Primary};
use crate::ast_walker::walk_method;
use crate::source_analysis::{parse, parse_code, tokenize};

// ============================================================================
// Near-valid GemStone generators
// ============================================================================

/// Method and statement fragments for composing near-valid inputs.
const FRAGMENTS: &[&str] = &[
    "foo ^42",
    "size <primitive: 62> ^self error",
    "at: i put: v <protected primitive: 33> ^v",
    "+ other ^self value + other value",
    "printOn: aStream | t | t := 3. aStream nextPutAll: t printString",
    "foo <category: 'accessing'> ^#(1 $a 'b' #c foo: (1 2) #[1 2])",
    "foo ^[:x :y | | t | t := x + y. t] value: 1 value: 2",
    "foo ^people select: {:p | p.age > 30}",
    "foo ^{1. 2. x foo}",
    "foo Transcript show: 'a'; cr; show: 'b'",
    "foo ^x @env1:bar @env0:at: 1 put: -5",
    "foo ^Globals.Foo.Bar new",
    "foo ^x > 0 ifTrue: ['positive'] ifFalse: ['non-positive']",
    "foo ^(a := b := 3) + 16r1F",
];

/// Generates a fragment from the seed corpus.
fn valid_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(FRAGMENTS).prop_map(std::string::ToString::to_string)
}

/// Generates a truncated fragment (cut at a random char boundary).
fn truncated_fragment() -> impl Strategy<Value = String> {
    valid_fragment().prop_flat_map(|s| {
        let len = s.len();
        (1..len)
            .prop_map(move |cut| s[..s.floor_char_boundary(cut)].to_string())
            .boxed()
    })
}

/// Generates input with swapped delimiters.
fn mismatched_brackets() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| {
        s.chars()
            .map(|ch| match ch {
                '[' => '(',
                ']' => '}',
                '(' => '[',
                '{' => ']',
                _ => ch,
            })
            .collect()
    })
}

/// Generates input with keyword colons removed.
fn missing_keyword_colons() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        for (i, &ch) in chars.iter().enumerate() {
            let keyword_colon = ch == ':'
                && i > 0
                && chars[i - 1].is_alphanumeric()
                && chars.get(i + 1) != Some(&'=');
            if !keyword_colon {
                result.push(ch);
            }
        }
        result
    })
}

/// Generates input with duplicated separators and operators.
fn duplicated_tokens() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| s.replace('+', "+ +").replace('.', ". ;").replace('^', "^ ^"))
}

fn near_valid_gemstone() -> impl Strategy<Value = String> {
    prop_oneof![
        valid_fragment(),
        truncated_fragment(),
        mismatched_brackets(),
        missing_keyword_colons(),
        duplicated_tokens(),
    ]
}

// ============================================================================
// AST helpers
// ============================================================================

/// Returns true if the method contains a synthesized placeholder name.
fn method_has_placeholders(method: &Method) -> bool {
    if method.pattern.parameters().iter().any(|p| p.is_placeholder()) {
        return true;
    }
    if let crate::ast::MessagePattern::Unary(unary) = &method.pattern {
        if unary.selector.is_placeholder() {
            return true;
        }
    }
    let mut found = false;
    walk_method(method, &mut |expr: &Expression| {
        found |= match &expr.receiver {
            Primary::Variable(v) => v.is_placeholder(),
            Primary::Block(block) => block.parameters.iter().any(|p| p.is_placeholder()),
            Primary::SelectionBlock(selection) => selection.parameter.is_placeholder(),
            _ => false,
        };
    });
    found
}

/// Internal names that should never appear in user-facing diagnostics.
const INTERNAL_NAMES: &[&str] = &[
    "TokenKind",
    "unwrap()",
    "panic!",
    "unreachable!",
    "Primary::",
    "Literal::",
    "Statement::",
    "internal error",
];

// ============================================================================
// Property tests
// ============================================================================

/// Default is 512 cases for standard CI; override via `PROPTEST_CASES` env var
/// for extended runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Parser never panics on arbitrary string input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,500}") {
        let _ = parse(tokenize(&input));
        let _ = parse_code(tokenize(&input));
    }

    /// Property 1b: Parser never panics on near-valid structured input.
    #[test]
    fn parser_never_panics_near_valid(input in near_valid_gemstone()) {
        let _ = parse(tokenize(&input));
    }

    /// Property 2: All diagnostic spans are within the input bounds.
    #[test]
    fn diagnostic_spans_within_input(input in "\\PC{0,500}") {
        let (_method, diagnostics) = parse(tokenize(&input));
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for diag in &diagnostics {
            prop_assert!(
                diag.span.end().offset <= input_len,
                "Diagnostic span end {} exceeds input length {} for input {:?}: {}",
                diag.span.end().offset,
                input_len,
                input,
                diag.message,
            );
            prop_assert!(diag.span.start() <= diag.span.end());
        }
    }

    /// Property 3: Placeholder names always come with diagnostics.
    #[test]
    fn placeholders_produce_diagnostics(input in near_valid_gemstone()) {
        let (method, diagnostics) = parse(tokenize(&input));
        if let Some(method) = method {
            if method_has_placeholders(&method) {
                prop_assert!(
                    diagnostics.iter().any(|d| d.is_error()),
                    "AST contains placeholders but no errors for input: {:?}",
                    input,
                );
            }
        }
    }

    /// Property 4: Error messages are user-facing (no internal type names).
    #[test]
    fn error_messages_are_user_facing(input in near_valid_gemstone()) {
        let (_method, diagnostics) = parse(tokenize(&input));
        for diag in &diagnostics {
            for internal in INTERNAL_NAMES {
                prop_assert!(
                    !diag.message.contains(internal),
                    "Diagnostic message contains internal name {:?}: {:?} (input: {:?})",
                    internal,
                    diag.message,
                    input,
                );
            }
        }
    }

    /// Property 5: Statement spans nest inside the method span.
    #[test]
    fn statement_spans_nest_in_method(input in near_valid_gemstone()) {
        let (method, _) = parse(tokenize(&input));
        if let Some(method) = method {
            for statement in &method.body.statements {
                prop_assert!(
                    method.span.encloses(statement.span()),
                    "statement {:?} escapes method {:?} for input {:?}",
                    statement.span(),
                    method.span,
                    input,
                );
            }
        }
    }
}
