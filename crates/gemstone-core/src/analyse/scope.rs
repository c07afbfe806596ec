// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical scope analysis for methods and code blocks.
//!
//! **DDD Context:** Language Service
//!
//! Scopes are organized hierarchically:
//! - Method (root): arguments and method temporaries
//! - Block (nested): block parameters and block temporaries, one scope per
//!   `[...]` or `{:x | ...}` literal
//!
//! The tree is stored as an arena indexed by [`ScopeId`]. It is a pure
//! function of the AST and is rebuilt for every query.

use ecow::EcoString;

use crate::ast::{Expression, Message, Method, MethodBody, Primary, Statement};
use crate::source_analysis::Span;

/// Index of a scope in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The method (or bare code) body.
    Method,
    /// A block or selection block literal.
    Block,
}

/// How a variable was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// A method argument.
    Argument,
    /// A method temporary (`| t |`).
    Temporary,
    /// A block parameter (`:x`).
    BlockParameter,
    /// A block temporary.
    BlockTemporary,
}

impl VariableKind {
    /// Returns a short human-readable label.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Argument => "argument",
            Self::Temporary => "temporary",
            Self::BlockParameter => "block parameter",
            Self::BlockTemporary => "block temporary",
        }
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    /// The variable name.
    pub name: EcoString,
    /// How it was declared.
    pub kind: VariableKind,
    /// The declaring identifier.
    pub definition: Span,
    /// The scope declaring it.
    pub scope: ScopeId,
}

/// One lexical scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Method or block.
    pub kind: ScopeKind,
    /// The source range the scope covers.
    pub span: Span,
    /// Variables declared directly in this scope, in declaration order.
    pub variables: Vec<VariableInfo>,
    /// The enclosing scope.
    pub parent: Option<ScopeId>,
    /// Directly nested scopes in source order.
    pub children: Vec<ScopeId>,
}

/// The scope tree of one method or code body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Builds the scope tree of a method.
    ///
    /// # Examples
    ///
    /// ```
    /// use gemstone_core::analyse::ScopeTree;
    /// use gemstone_core::source_analysis::{parse, tokenize};
    ///
    /// let source = "foo: a | x | ^[:b | a + b + x]";
    /// let (method, _) = parse(tokenize(source));
    /// let tree = ScopeTree::analyze(&method.unwrap());
    /// let inside_block = source.find("a + b").unwrap() as u32;
    /// let names: Vec<_> = tree.visible_at(inside_block).iter().map(|v| v.name.as_str()).collect();
    /// assert_eq!(names, vec!["b", "a", "x"]);
    /// ```
    #[must_use]
    pub fn analyze(method: &Method) -> Self {
        let mut tree = Self::with_root(method.span);
        let root = tree.root();
        for parameter in method.pattern.parameters() {
            if !parameter.is_placeholder() {
                tree.declare(root, &parameter.name, VariableKind::Argument, parameter.span);
            }
        }
        tree.add_body(root, &method.body);
        tree
    }

    /// Builds the scope tree of a bare statement list.
    #[must_use]
    pub fn analyze_body(body: &MethodBody) -> Self {
        let mut tree = Self::with_root(body.span);
        let root = tree.root();
        tree.add_body(root, body);
        tree
    }

    fn with_root(span: Span) -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Method,
                span,
                variables: Vec::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the method scope.
    #[must_use]
    pub const fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Returns the scope with the given id.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Iterates over every scope, root first.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Returns the innermost scope whose range contains `offset`.
    ///
    /// A block's range ends at its closing bracket, so the offset right
    /// after `]` belongs to the enclosing scope. Offsets outside the method
    /// resolve to the root.
    #[must_use]
    pub fn scope_at(&self, offset: u32) -> ScopeId {
        let mut current = self.root();
        'descend: loop {
            for &child in &self.scope(current).children {
                if self.scope(child).span.contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Resolves `name` as seen from `offset`; inner declarations shadow
    /// outer ones.
    #[must_use]
    pub fn variable_at(&self, name: &str, offset: u32) -> Option<&VariableInfo> {
        self.ancestors(self.scope_at(offset))
            .find_map(|scope| scope.variables.iter().find(|v| v.name == name))
    }

    /// Returns every variable visible at `offset`, innermost scope first,
    /// without shadowed duplicates.
    #[must_use]
    pub fn visible_at(&self, offset: u32) -> Vec<&VariableInfo> {
        let mut visible: Vec<&VariableInfo> = Vec::new();
        for scope in self.ancestors(self.scope_at(offset)) {
            for variable in &scope.variables {
                if !visible.iter().any(|v| v.name == variable.name) {
                    visible.push(variable);
                }
            }
        }
        visible
    }

    /// Returns the declaration whose identifier span touches `offset`.
    #[must_use]
    pub fn declaration_at(&self, offset: u32) -> Option<&VariableInfo> {
        self.scopes
            .iter()
            .flat_map(|s| s.variables.iter())
            .find(|v| v.definition.touches(offset))
    }

    fn ancestors(&self, start: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(self.scope(start)), |scope| {
            scope.parent.map(|p| self.scope(p))
        })
    }

    // ========================================================================
    // Construction
    // ========================================================================

    fn declare(&mut self, scope: ScopeId, name: &EcoString, kind: VariableKind, span: Span) {
        self.scopes[scope.0].variables.push(VariableInfo {
            name: name.clone(),
            kind,
            definition: span,
            scope,
        });
    }

    fn push_scope(&mut self, parent: ScopeId, span: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            kind: ScopeKind::Block,
            span,
            variables: Vec::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.scopes[parent.0].children.push(id);
        id
    }

    fn add_body(&mut self, scope: ScopeId, body: &MethodBody) {
        for temporary in &body.temporaries {
            self.declare(scope, &temporary.name, VariableKind::Temporary, temporary.span);
        }
        for statement in &body.statements {
            self.add_statement(scope, statement);
        }
    }

    fn add_statement(&mut self, scope: ScopeId, statement: &Statement) {
        match statement {
            Statement::Assignment(assignment) => self.add_statement(scope, &assignment.value),
            Statement::Return(ret) => self.add_statement(scope, &ret.expression),
            Statement::Expression(expr) => self.add_expression(scope, expr),
        }
    }

    fn add_expression(&mut self, scope: ScopeId, expr: &Expression) {
        self.add_primary(scope, &expr.receiver);
        for message in expr.messages.iter().chain(&expr.cascades) {
            match message {
                Message::Unary(_) => {}
                Message::Binary(binary) => self.add_expression(scope, &binary.argument),
                Message::Keyword(keyword) => {
                    for part in &keyword.parts {
                        self.add_expression(scope, &part.value);
                    }
                }
            }
        }
    }

    fn add_primary(&mut self, scope: ScopeId, primary: &Primary) {
        match primary {
            Primary::Block(block) => {
                let inner = self.push_scope(scope, block.span);
                for parameter in block.parameters.iter().filter(|p| !p.is_placeholder()) {
                    self.declare(
                        inner,
                        &parameter.name,
                        VariableKind::BlockParameter,
                        parameter.span,
                    );
                }
                for temporary in &block.temporaries {
                    self.declare(
                        inner,
                        &temporary.name,
                        VariableKind::BlockTemporary,
                        temporary.span,
                    );
                }
                for statement in &block.statements {
                    self.add_statement(inner, statement);
                }
            }
            Primary::SelectionBlock(selection) => {
                let inner = self.push_scope(scope, selection.span);
                if !selection.parameter.is_placeholder() {
                    self.declare(
                        inner,
                        &selection.parameter.name,
                        VariableKind::BlockParameter,
                        selection.parameter.span,
                    );
                }
                self.add_expression(inner, &selection.predicate);
            }
            Primary::Paren(paren) => self.add_statement(scope, &paren.expression),
            Primary::CurlyArray(curly) => {
                for statement in &curly.expressions {
                    self.add_statement(scope, statement);
                }
            }
            Primary::Variable(_) | Primary::Path(_) | Primary::Literal(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse, parse_code, tokenize};

    fn tree(source: &str) -> ScopeTree {
        let (method, diagnostics) = parse(tokenize(source));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        ScopeTree::analyze(&method.expect("method"))
    }

    fn offset(source: &str, needle: &str) -> u32 {
        u32::try_from(source.find(needle).expect("needle")).unwrap()
    }

    fn names(variables: &[&VariableInfo]) -> Vec<String> {
        variables.iter().map(|v| v.name.to_string()).collect()
    }

    #[test]
    fn method_scope_holds_arguments_and_temporaries() {
        let tree = tree("at: i put: v | old | old := i. ^v");
        let root = tree.scope(tree.root());
        assert_eq!(root.kind, ScopeKind::Method);
        let kinds: Vec<_> = root.variables.iter().map(|v| (v.name.as_str(), v.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("i", VariableKind::Argument),
                ("v", VariableKind::Argument),
                ("old", VariableKind::Temporary),
            ]
        );
    }

    #[test]
    fn outer_temporary_visible_inside_block() {
        let source = "foo | x | [:a | a + x]";
        let tree = tree(source);
        let inside = offset(source, "a + x");
        assert_eq!(names(&tree.visible_at(inside)), vec!["a", "x"]);
        let x = tree.variable_at("x", inside).unwrap();
        assert_eq!(x.kind, VariableKind::Temporary);
        assert_eq!(x.scope, tree.root());
    }

    #[test]
    fn block_parameter_only_visible_inside_block() {
        let source = "foo | x | [:a | a + x]. x";
        let tree = tree(source);
        let after = offset(source, ". x") + 2;
        assert!(tree.variable_at("a", after).is_none());
        assert!(tree.variable_at("x", after).is_some());
        let inside = offset(source, "a + x");
        assert_eq!(
            tree.variable_at("a", inside).map(|v| v.kind),
            Some(VariableKind::BlockParameter)
        );
    }

    #[test]
    fn block_scope_ends_at_closing_bracket() {
        let source = "foo [:a | a]. a";
        let tree = tree(source);
        let close = offset(source, "]");
        assert!(tree.variable_at("a", close).is_some());
        assert!(tree.variable_at("a", close + 1).is_none());
        assert_eq!(tree.scope_at(close + 1), tree.root());
        assert!(tree.visible_at(close + 1).is_empty());
    }

    #[test]
    fn inner_declarations_shadow_outer() {
        let source = "foo: x ^[:x | | y | x + y]";
        let tree = tree(source);
        let inside = offset(source, "x + y");
        let x = tree.variable_at("x", inside).unwrap();
        assert_eq!(x.kind, VariableKind::BlockParameter);
        assert_eq!(names(&tree.visible_at(inside)), vec!["x", "y"]);
        assert_eq!(
            tree.variable_at("y", inside).map(|v| v.kind),
            Some(VariableKind::BlockTemporary)
        );
    }

    #[test]
    fn nested_blocks_and_selection_blocks() {
        let source = "foo ^items collect: [:i | i select: {:e | e.size > i}]";
        let tree = tree(source);
        assert_eq!(tree.scopes().count(), 3);
        let inner = tree.scope_at(offset(source, "e.size"));
        assert_eq!(tree.scope(inner).kind, ScopeKind::Block);
        let names: Vec<_> = tree.visible_at(offset(source, "e.size")).iter().map(|v| v.name.clone()).collect();
        assert_eq!(names, vec!["e", "i"]);
    }

    #[test]
    fn declaration_lookup() {
        let source = "foo: bar | baz | ^bar";
        let tree = tree(source);
        let declared = tree.declaration_at(offset(source, "baz")).unwrap();
        assert_eq!(declared.name, "baz");
        assert!(tree.declaration_at(offset(source, "^bar") + 1).is_none());
    }

    #[test]
    fn bare_code_temporaries() {
        let (body, _) = parse_code(tokenize("| a | a := [:b | b] value: 3"));
        let tree = ScopeTree::analyze_body(&body);
        assert_eq!(tree.scope(tree.root()).variables[0].kind, VariableKind::Temporary);
        assert_eq!(tree.scopes().count(), 2);
    }
}
