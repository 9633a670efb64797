//! Scope analysis for JavaScript AST
//!
//! Two passes over a parsed program. The first creates one scope per
//! program, function body, `with` body, `catch` clause and named class
//! expression, and declares every bound name. Declarations are hoisted to
//! the nearest function or program scope; there is no block scoping. The
//! second pass resolves every identifier reference through the scope chain
//! and declares unresolved names as implicit globals.

use std::collections::HashMap;

use core_types::JsError;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ast::{Node, NodeKind, NodeType, VariableKind};
use crate::visitor::{apply, Visitor};

/// Index of a scope in its [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub usize);

/// Index of a symbol in its [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub usize);

/// Scope variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Script or module top level
    Global,
    /// Function body, or the name scope of a named class expression
    Function,
    /// Body of a `with` statement; resolves nothing statically
    With,
    /// Catch clause; holds only the catch parameter
    Catch,
}

/// How a symbol was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    /// var
    Var,
    /// let
    Let,
    /// const
    Const,
    /// Function declaration
    Function,
    /// Formal parameter
    Param,
    /// Class declaration
    Class,
    /// Catch parameter
    Catch,
    /// Import binding
    Import,
    /// Own name of a function or class expression
    Callee,
    /// Unresolved reference declared on the global scope
    Implicit,
}

impl From<VariableKind> for SymbolKind {
    fn from(kind: VariableKind) -> Self {
        match kind {
            VariableKind::Var => SymbolKind::Var,
            VariableKind::Let => SymbolKind::Let,
            VariableKind::Const => SymbolKind::Const,
        }
    }
}

/// A lexical scope
#[derive(Debug, Clone)]
pub struct Scope {
    /// Own id
    pub id: ScopeId,
    /// Scope variant
    pub kind: ScopeKind,
    /// Enclosing scope
    pub parent: Option<ScopeId>,
    /// Declared symbols in declaration order
    pub symbols: Vec<SymbolId>,
    /// Nested scopes in source order
    pub children: Vec<ScopeId>,
    /// Local names may be renamed; once cleared it stays cleared
    pub optimizable: bool,
    names: HashMap<String, SymbolId>,
}

/// A declared name
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Own id
    pub id: SymbolId,
    /// Name as declared
    pub name: String,
    /// Declaring scope
    pub scope: ScopeId,
    /// How it was declared
    pub kind: SymbolKind,
    /// Name assigned by the minify pass
    pub mangled: Option<String>,
}

impl Symbol {
    /// The name the symbol is currently spelled with
    pub fn visible_name(&self) -> &str {
        self.mangled.as_deref().unwrap_or(&self.name)
    }
}

/// Outcome of looking a name up through the scope chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Statically bound
    Symbol(SymbolId),
    /// The chain crossed a `with` scope before finding a declaration
    Dynamic,
    /// No scope declares the name
    Unresolved,
}

/// All scopes and symbols of one program
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the global scope
    pub fn new() -> Self {
        let mut tree = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
        };
        tree.push_scope(ScopeKind::Global, None);
        tree
    }

    /// The global scope
    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            id,
            kind,
            parent,
            symbols: Vec::new(),
            children: Vec::new(),
            optimizable: true,
            names: HashMap::new(),
        });
        if let Some(parent) = parent {
            self.scopes[parent.0].children.push(id);
        }
        trace!(scope = id.0, ?kind, "created scope");
        id
    }

    /// Create a nested scope
    pub fn create_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = self.push_scope(kind, Some(parent));
        if kind == ScopeKind::With {
            self.disable_optimization(id);
        }
        id
    }

    /// Look up a scope
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Look up a symbol
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    /// Mutable symbol access, used by renaming
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0]
    }

    /// All scopes, global first
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// All symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Scope that receives declarations made in `scope`: `with` and `catch`
    /// scopes delegate to their enclosing scope
    pub fn declaring_scope(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            let s = &self.scopes[scope.0];
            match (s.kind, s.parent) {
                (ScopeKind::With | ScopeKind::Catch, Some(parent)) => scope = parent,
                _ => return scope,
            }
        }
    }

    /// Declare `name` on behalf of `scope`; an existing declaration of the
    /// same name in the receiving scope is reused
    pub fn declare(&mut self, scope: ScopeId, name: &str, kind: SymbolKind) -> SymbolId {
        let target = self.declaring_scope(scope);
        self.declare_local(target, name, kind)
    }

    /// Declare `name` directly in `scope`, bypassing delegation
    pub fn declare_local(&mut self, scope: ScopeId, name: &str, kind: SymbolKind) -> SymbolId {
        if let Some(existing) = self.scopes[scope.0].names.get(name) {
            return *existing;
        }
        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            scope,
            kind,
            mangled: None,
        });
        let s = &mut self.scopes[scope.0];
        s.symbols.push(id);
        s.names.insert(name.to_string(), id);
        id
    }

    /// Declare an implicit global, or return the existing global of that name
    pub fn declare_implicit(&mut self, name: &str) -> SymbolId {
        let global = self.global();
        self.declare_local(global, name, SymbolKind::Implicit)
    }

    /// Symbol declared directly in `scope`
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0].names.get(name).copied()
    }

    /// Resolve `name` from `scope` outward
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Resolution {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0];
            if s.kind == ScopeKind::With {
                return Resolution::Dynamic;
            }
            if let Some(symbol) = s.names.get(name) {
                return Resolution::Symbol(*symbol);
            }
            current = s.parent;
        }
        Resolution::Unresolved
    }

    /// Clear the optimizable flag on `scope` and every enclosing scope
    pub fn disable_optimization(&mut self, scope: ScopeId) {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &mut self.scopes[id.0];
            if !s.optimizable {
                break;
            }
            s.optimizable = false;
            current = s.parent;
        }
    }

    /// Whether local names of `scope` may be renamed
    pub fn is_optimizable(&self, scope: ScopeId) -> bool {
        self.scopes[scope.0].optimizable
    }

    /// True if some symbol visible from `scope` is currently spelled `name`
    pub fn is_declared(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0];
            if s
                .symbols
                .iter()
                .any(|symbol| self.symbols[symbol.0].visible_name() == name)
            {
                return true;
            }
            current = s.parent;
        }
        false
    }
}

/// Two-pass scope analysis entry point
pub struct ScopeAnalysis;

impl ScopeAnalysis {
    /// Build the scope tree of `program` and bind every identifier in it.
    ///
    /// Symbols left on the tree by an earlier analysis are discarded.
    pub fn analyze(program: &mut Node) -> Result<ScopeTree, JsError> {
        if !matches!(program.kind, NodeKind::Program { .. }) {
            return Err(JsError::internal("Scope analysis expects a Program node"));
        }
        apply(program, &mut ClearSymbols)?;

        let mut declarations = Declarations {
            tree: ScopeTree::new(),
            stack: Vec::new(),
        };
        apply(program, &mut declarations)?;

        let mut resolver = Resolver {
            tree: declarations.tree,
            stack: Vec::new(),
            implicit: 0,
        };
        apply(program, &mut resolver)?;

        debug!(
            scopes = resolver.tree.scopes.len(),
            symbols = resolver.tree.symbols.len(),
            implicit_globals = resolver.implicit,
            "scope analysis complete"
        );
        Ok(resolver.tree)
    }
}

struct ClearSymbols;

impl Visitor for ClearSymbols {
    fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if let NodeKind::Identifier { symbol, .. } = &mut node.kind {
            *symbol = None;
        }
        Ok(None)
    }
}

/// Scope field of a node that owns a scope
fn owned_scope(node: &mut Node) -> Option<&mut Option<ScopeId>> {
    match &mut node.kind {
        NodeKind::Program { scope, .. }
        | NodeKind::With { scope, .. }
        | NodeKind::CatchClause { scope, .. } => Some(scope),
        NodeKind::FunctionDeclaration { function }
        | NodeKind::FunctionExpression { function }
        | NodeKind::ArrowFunction { function } => Some(&mut function.scope),
        NodeKind::ClassExpression { class } if class.id.is_some() => Some(&mut class.scope),
        _ => None,
    }
}

struct Declarations {
    tree: ScopeTree,
    stack: Vec<ScopeId>,
}

impl Declarations {
    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }

    fn open(&mut self, kind: ScopeKind) -> ScopeId {
        let id = match self.stack.last() {
            Some(parent) => self.tree.create_scope(kind, *parent),
            None => self.tree.global(),
        };
        self.stack.push(id);
        id
    }

    /// Declare every name bound by `target` through `declare` and attach the
    /// symbol each identifier resolves to from the current scope
    fn bind(&mut self, target: &mut Node, kind: SymbolKind, local: bool) {
        match &mut target.kind {
            NodeKind::Identifier { name, symbol } => {
                let current = self.current();
                let declared = if local {
                    self.tree.declare_local(current, name, kind)
                } else {
                    self.tree.declare(current, name, kind)
                };
                *symbol = match self.tree.resolve(current, name) {
                    Resolution::Symbol(id) => Some(id),
                    _ => Some(declared),
                };
            }
            NodeKind::ArrayPattern { elements } => {
                for element in elements.iter_mut().flatten() {
                    self.bind(element, kind, local);
                }
            }
            NodeKind::ObjectPattern { properties } => {
                for property in properties {
                    self.bind(property, kind, local);
                }
            }
            NodeKind::Property { value, .. } => self.bind(value, kind, local),
            NodeKind::AssignmentPattern { target, .. } => self.bind(target, kind, local),
            NodeKind::RestElement { argument } => self.bind(argument, kind, local),
            _ => {}
        }
    }

    fn enter_function(&mut self, node: &mut Node) {
        let declaration = matches!(node.kind, NodeKind::FunctionDeclaration { .. });
        let Some(function) = node.as_function_mut() else {
            return;
        };
        if declaration {
            if let Some(id) = function.id.as_deref_mut() {
                self.bind(id, SymbolKind::Function, false);
            }
        }
        let scope = self.open(ScopeKind::Function);
        function.scope = Some(scope);
        if !declaration {
            if let Some(id) = function.id.as_deref_mut() {
                self.bind(id, SymbolKind::Callee, true);
            }
        }
        let mut has_eval_param = false;
        for param in &mut function.params {
            let mut names = Vec::new();
            crate::ast::bound_names(param, &mut names);
            has_eval_param |= names.iter().any(|n| n == "eval");
            self.bind(param, SymbolKind::Param, true);
        }
        if has_eval_param {
            self.tree.disable_optimization(scope);
        }
    }
}

impl Visitor for Declarations {
    fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if node.is_function() {
            self.enter_function(node);
            return Ok(None);
        }
        match &mut node.kind {
            NodeKind::Program { scope, .. } => {
                *scope = Some(self.open(ScopeKind::Global));
            }
            NodeKind::ClassDeclaration { class } => {
                if let Some(id) = class.id.as_deref_mut() {
                    self.bind(id, SymbolKind::Class, false);
                }
            }
            NodeKind::ClassExpression { class } => {
                if let Some(id) = class.id.as_deref_mut() {
                    class.scope = Some(self.open(ScopeKind::Function));
                    self.bind(id, SymbolKind::Callee, true);
                }
            }
            NodeKind::CatchClause { param, scope, .. } => {
                *scope = Some(self.open(ScopeKind::Catch));
                self.bind(param, SymbolKind::Catch, true);
            }
            NodeKind::With { scope, .. } => {
                *scope = Some(self.open(ScopeKind::With));
            }
            NodeKind::VariableDeclaration { kind, declarations } => {
                let kind = SymbolKind::from(*kind);
                for declarator in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = &mut declarator.kind {
                        self.bind(id, kind, false);
                    }
                }
            }
            NodeKind::ImportSpecifier { local, .. }
            | NodeKind::ImportDefaultSpecifier { local }
            | NodeKind::ImportNamespaceSpecifier { local } => {
                self.bind(local, SymbolKind::Import, false);
            }
            _ => {}
        }
        Ok(None)
    }

    fn leave(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if owned_scope(node).is_some_and(|scope| scope.is_some()) {
            self.stack.pop();
        }
        Ok(None)
    }
}

struct Resolver {
    tree: ScopeTree,
    stack: Vec<ScopeId>,
    implicit: usize,
}

impl Resolver {
    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }
}

impl Visitor for Resolver {
    fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if let Some(Some(scope)) = owned_scope(node).map(|s| *s) {
            self.stack.push(scope);
            return Ok(None);
        }
        match &mut node.kind {
            NodeKind::Identifier { name, symbol } if symbol.is_none() => {
                let resolved = match self.tree.resolve(self.current(), name) {
                    Resolution::Symbol(id) => id,
                    Resolution::Dynamic | Resolution::Unresolved => {
                        let before = self.tree.symbols.len();
                        let id = self.tree.declare_implicit(name);
                        if self.tree.symbols.len() > before {
                            self.implicit += 1;
                        }
                        id
                    }
                };
                *symbol = Some(resolved);
            }
            NodeKind::Call { callee, .. } => {
                if callee.as_identifier() == Some("eval") {
                    let current = self.current();
                    self.tree.disable_optimization(current);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn leave(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if owned_scope(node).is_some_and(|scope| scope.is_some()) {
            self.stack.pop();
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;

    fn analyze(source: &str) -> (Node, ScopeTree) {
        let mut program = parse_script(source).unwrap();
        let tree = ScopeAnalysis::analyze(&mut program).unwrap();
        (program, tree)
    }

    fn names(tree: &ScopeTree, scope: ScopeId) -> Vec<String> {
        tree.scope(scope)
            .symbols
            .iter()
            .map(|s| tree.symbol(*s).name.clone())
            .collect()
    }

    #[test]
    fn test_global_declarations() {
        let (_, tree) = analyze("var a = 1; function f(x) { var y; }");
        assert_eq!(names(&tree, tree.global()), vec!["a", "f"]);
        assert_eq!(tree.scopes().len(), 2);
        assert_eq!(names(&tree, ScopeId(1)), vec!["x", "y"]);
    }

    #[test]
    fn test_block_declarations_hoist_to_function() {
        let (_, tree) = analyze("function f() { if (a) { let b = 1; } for (var i;;) {} }");
        assert_eq!(names(&tree, ScopeId(1)), vec!["b", "i"]);
    }

    #[test]
    fn test_unresolved_reference_becomes_implicit_global() {
        let (_, tree) = analyze("function f() { return g; }");
        let global = names(&tree, tree.global());
        assert!(global.contains(&"g".to_string()));
        let g = tree.lookup_local(tree.global(), "g").unwrap();
        assert_eq!(tree.symbol(g).kind, SymbolKind::Implicit);
    }

    #[test]
    fn test_catch_parameter_shadows() {
        let (_, tree) = analyze("function f() { try {} catch (e) { var e = 1; e; } }");
        let catch_scope = tree
            .scopes()
            .iter()
            .find(|s| s.kind == ScopeKind::Catch)
            .unwrap();
        assert_eq!(names(&tree, catch_scope.id), vec!["e"]);
        // the var is still declared on the function
        assert_eq!(names(&tree, ScopeId(1)), vec!["e"]);
    }

    #[test]
    fn test_eval_disables_optimization_outward() {
        let (_, tree) = analyze("function f() { function g() { eval('x'); } } function h() {}");
        let optimizable: Vec<bool> = tree.scopes().iter().map(|s| s.optimizable).collect();
        assert_eq!(optimizable, vec![false, false, false, true]);
    }

    #[test]
    fn test_eval_parameter_disables_optimization() {
        let (_, tree) = analyze("function f(eval) {}");
        assert!(!tree.is_optimizable(ScopeId(1)));
    }

    #[test]
    fn test_with_resolves_dynamically() {
        let (_, tree) = analyze("function f(o) { var x; with (o) { x; } }");
        assert!(!tree.is_optimizable(ScopeId(1)));
        let with_scope = ScopeId(2);
        assert_eq!(tree.scope(with_scope).kind, ScopeKind::With);
        assert_eq!(tree.resolve(with_scope, "x"), Resolution::Dynamic);
        assert!(tree.lookup_local(tree.global(), "x").is_some());
    }

    #[test]
    fn test_every_identifier_is_bound() {
        struct Check(usize);
        impl Visitor for Check {
            fn enter(&mut self, node: &mut Node, _p: Option<NodeType>) -> Result<Option<Node>, JsError> {
                if let NodeKind::Identifier { symbol, .. } = &node.kind {
                    assert!(symbol.is_some());
                    self.0 += 1;
                }
                Ok(None)
            }
        }
        let (mut program, _) = analyze("var o = {a: b}; o.c = function d(e) { return [e, d, f]; };");
        let mut check = Check(0);
        apply(&mut program, &mut check).unwrap();
        assert!(check.0 >= 7);
    }

    #[test]
    fn test_is_declared_checks_visible_names() {
        let (_, mut tree) = analyze("var abc; function f() { var x; }");
        assert!(tree.is_declared(ScopeId(1), "abc"));
        let x = tree.lookup_local(ScopeId(1), "x").unwrap();
        tree.symbol_mut(x).mangled = Some("a".to_string());
        assert!(tree.is_declared(ScopeId(1), "a"));
        assert!(!tree.is_declared(ScopeId(1), "x"));
        assert!(!tree.is_declared(tree.global(), "a"));
    }

    #[test]
    fn test_reanalysis_is_stable() {
        let mut program = parse_script("function f(a) { return a + b; }").unwrap();
        let first = ScopeAnalysis::analyze(&mut program).unwrap();
        let second = ScopeAnalysis::analyze(&mut program).unwrap();
        assert_eq!(first.symbols().len(), second.symbols().len());
    }
}
