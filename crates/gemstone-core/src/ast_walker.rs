// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared pre-order AST walker.
//!
//! **DDD Context:** Source Analysis
//!
//! Provides the traversal used by the workspace indexer (sent selectors),
//! the selector/identifier lookups and the folding provider:
//!
//! - [`walk_method`] / [`walk_body`] — visit every expression of a method or
//!   bare statement list.
//! - [`walk_statement`] / [`walk_expression`] — pre-order walk of a subtree,
//!   calling the visitor closure on every [`Expression`] node.
//! - [`walk_variables`] — every variable read, assignment target and path
//!   head in source order.
//!
//! Every [`Primary`] is the receiver of exactly one visited expression, so a
//! visitor that inspects `expr.receiver` sees every block, literal and
//! variable in the tree.
//!
//! # What is NOT handled here
//!
//! Passes that must thread state through the walk (the scope analyzer tracks
//! the enclosing scope; the formatter tracks its layout context) keep their
//! own recursion.

use crate::ast::{Expression, Identifier, Message, Method, MethodBody, Primary, Statement};

// ── Entry points ─────────────────────────────────────────────────────────────

/// Walks every expression in a method body (pre-order).
pub(crate) fn walk_method<F>(method: &Method, f: &mut F)
where
    F: FnMut(&Expression),
{
    walk_body(&method.body, f);
}

/// Walks every expression in a statement list with pragmas and temporaries.
pub(crate) fn walk_body<F>(body: &MethodBody, f: &mut F)
where
    F: FnMut(&Expression),
{
    for statement in &body.statements {
        walk_statement(statement, f);
    }
}

// ── Statement and expression walkers ─────────────────────────────────────────

/// Walks the expressions inside a statement.
pub(crate) fn walk_statement<F>(statement: &Statement, f: &mut F)
where
    F: FnMut(&Expression),
{
    match statement {
        Statement::Assignment(assignment) => walk_statement(&assignment.value, f),
        Statement::Return(ret) => walk_statement(&ret.expression, f),
        Statement::Expression(expr) => walk_expression(expr, f),
    }
}

/// Recursively walks an expression tree in pre-order, calling `f` on every
/// expression node before its children.
pub(crate) fn walk_expression<F>(expr: &Expression, f: &mut F)
where
    F: FnMut(&Expression),
{
    f(expr);
    walk_primary(&expr.receiver, f);
    for message in expr.messages.iter().chain(&expr.cascades) {
        walk_message(message, f);
    }
}

fn walk_message<F>(message: &Message, f: &mut F)
where
    F: FnMut(&Expression),
{
    match message {
        Message::Unary(_) => {}
        Message::Binary(binary) => walk_expression(&binary.argument, f),
        Message::Keyword(keyword) => {
            for part in &keyword.parts {
                walk_expression(&part.value, f);
            }
        }
    }
}

fn walk_primary<F>(primary: &Primary, f: &mut F)
where
    F: FnMut(&Expression),
{
    match primary {
        Primary::Block(block) => {
            for statement in &block.statements {
                walk_statement(statement, f);
            }
        }
        Primary::SelectionBlock(selection) => walk_expression(&selection.predicate, f),
        Primary::Paren(paren) => walk_statement(&paren.expression, f),
        Primary::CurlyArray(curly) => {
            for statement in &curly.expressions {
                walk_statement(statement, f);
            }
        }
        // Leaf nodes: nothing to recurse into.
        Primary::Variable(_) | Primary::Path(_) | Primary::Literal(_) => {}
    }
}

// ── Variable occurrences ─────────────────────────────────────────────────────

/// Visits every variable occurrence in a statement list: reads, assignment
/// targets and the first segment of dotted paths. Declarations (arguments,
/// temporaries, block parameters) are not visited.
pub(crate) fn walk_variables<F>(body: &MethodBody, f: &mut F)
where
    F: FnMut(&Identifier),
{
    for statement in &body.statements {
        variables_in_statement(statement, f);
    }
}

fn variables_in_statement<F>(statement: &Statement, f: &mut F)
where
    F: FnMut(&Identifier),
{
    match statement {
        Statement::Assignment(assignment) => {
            f(&assignment.variable);
            variables_in_statement(&assignment.value, f);
        }
        Statement::Return(ret) => variables_in_statement(&ret.expression, f),
        Statement::Expression(expr) => variables_in_expression(expr, f),
    }
}

fn variables_in_expression<F>(expr: &Expression, f: &mut F)
where
    F: FnMut(&Identifier),
{
    match &expr.receiver {
        Primary::Variable(identifier) => f(identifier),
        Primary::Path(path) => {
            if let Some(head) = path.segments.first() {
                f(head);
            }
        }
        Primary::Block(block) => {
            for statement in &block.statements {
                variables_in_statement(statement, f);
            }
        }
        Primary::SelectionBlock(selection) => variables_in_expression(&selection.predicate, f),
        Primary::Paren(paren) => variables_in_statement(&paren.expression, f),
        Primary::CurlyArray(curly) => {
            for statement in &curly.expressions {
                variables_in_statement(statement, f);
            }
        }
        Primary::Literal(_) => {}
    }
    for message in expr.messages.iter().chain(&expr.cascades) {
        match message {
            Message::Unary(_) => {}
            Message::Binary(binary) => variables_in_expression(&binary.argument, f),
            Message::Keyword(keyword) => {
                for part in &keyword.parts {
                    variables_in_expression(&part.value, f);
                }
            }
        }
    }
}
