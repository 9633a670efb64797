//! Minification: local renaming and statement compaction
//!
//! Local symbols of every optimizable function and catch scope receive the
//! shortest names that do not collide with anything visible from the
//! enclosing scope. Names are numbered per scope, so sibling functions
//! reuse the same short names. On the way out, statements are compacted:
//! empty statements disappear, single-statement blocks unwrap, and `if`
//! statements over expression statements turn into `&&` or `?:`.

use core_types::JsError;
use parser::ast::{LogicalOperator, Node, NodeKind, NodeType};
use parser::lexer::{classify_identifier, IdentifierClass};
use parser::{apply, ScopeId, ScopeTree, Visitor};
use tracing::{debug, trace};

const ID_START: &[u8] = b"_$abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_PART: &[u8] = b"_$abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The `id`th generated name: `_`, `$`, `a`, ... `Z`, `_$`, `$$`, ...
pub fn variable_name(mut id: usize) -> String {
    let mut text = String::new();
    text.push(ID_START[id % ID_START.len()] as char);
    id /= ID_START.len();
    while id != 0 {
        text.push(ID_PART[id % ID_PART.len()] as char);
        id /= ID_PART.len();
    }
    text
}

/// The minify pass
pub struct MinifyPass<'a> {
    tree: &'a mut ScopeTree,
    mangle: bool,
    /// Open scopes with the next free name index of each
    counters: Vec<(ScopeId, usize)>,
    renamed: usize,
}

impl<'a> MinifyPass<'a> {
    /// Create the pass; renaming is on by default
    pub fn new(tree: &'a mut ScopeTree) -> Self {
        Self {
            tree,
            mangle: true,
            counters: Vec::new(),
            renamed: 0,
        }
    }

    /// Enable or disable local renaming
    pub fn with_mangle(mut self, mangle: bool) -> Self {
        self.mangle = mangle;
        self
    }

    /// Minify a whole program, returning the number of renamed symbols
    pub fn run(program: &mut Node, tree: &mut ScopeTree, mangle: bool) -> Result<usize, JsError> {
        let mut pass = MinifyPass::new(tree).with_mangle(mangle);
        apply(program, &mut pass)?;
        debug!(renamed = pass.renamed, "minify pass complete");
        Ok(pass.renamed)
    }

    fn outer_counter(&self) -> usize {
        self.counters.last().map(|(_, counter)| *counter).unwrap_or(0)
    }

    /// Assign fresh names to every symbol of `scope`
    fn rename(&mut self, scope: ScopeId, mut counter: usize) -> usize {
        if !self.mangle || !self.tree.is_optimizable(scope) {
            return counter;
        }
        let Some(outer) = self.tree.scope(scope).parent else {
            return counter;
        };
        let symbols = self.tree.scope(scope).symbols.clone();
        for symbol in symbols {
            let name = loop {
                let candidate = variable_name(counter);
                counter += 1;
                if !self.tree.is_declared(outer, &candidate)
                    && classify_identifier(&candidate) == IdentifierClass::Name
                {
                    break candidate;
                }
            };
            trace!(from = %self.tree.symbol(symbol).name, to = %name, "rename");
            self.tree.symbol_mut(symbol).mangled = Some(name);
            self.renamed += 1;
        }
        counter
    }
}

fn scope_of(node: &Node) -> Option<(ScopeId, bool)> {
    match &node.kind {
        NodeKind::Program { scope, .. } | NodeKind::With { scope, .. } => scope.map(|s| (s, false)),
        NodeKind::CatchClause { scope, .. } => scope.map(|s| (s, true)),
        NodeKind::FunctionDeclaration { function }
        | NodeKind::FunctionExpression { function }
        | NodeKind::ArrowFunction { function } => function.scope.map(|s| (s, true)),
        NodeKind::ClassExpression { class } => class.scope.map(|s| (s, true)),
        _ => None,
    }
}

fn remove_empty(body: &mut Vec<Node>) {
    body.retain(|statement| !statement.is_empty_statement());
}

impl Visitor for MinifyPass<'_> {
    fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if let Some((scope, renames)) = scope_of(node) {
            let start = match node.kind {
                NodeKind::Program { .. } => 0,
                _ => self.outer_counter(),
            };
            let next = if renames { self.rename(scope, start) } else { start };
            self.counters.push((scope, next));
            return Ok(None);
        }
        if let NodeKind::Identifier { name, symbol: Some(id) } = &mut node.kind {
            if let Some(mangled) = &self.tree.symbol(*id).mangled {
                *name = mangled.clone();
            }
        }
        Ok(None)
    }

    fn leave(&mut self, node: &mut Node, parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if scope_of(node).is_some() {
            self.counters.pop();
        }
        let range = node.range;
        match &mut node.kind {
            NodeKind::Expression { expression } if expression.as_constant().is_some() => {
                return Ok(Some(Node::empty(range)));
            }
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let replacement = match (&mut consequent.kind, alternate.as_deref_mut().map(|a| &mut a.kind)) {
                    (NodeKind::Expression { expression }, None) => Some(NodeKind::Logical {
                        operator: LogicalOperator::And,
                        left: std::mem::replace(test, Box::new(Node::empty(range))),
                        right: std::mem::replace(expression, Box::new(Node::empty(range))),
                    }),
                    (
                        NodeKind::Expression { expression },
                        Some(NodeKind::Expression {
                            expression: otherwise,
                        }),
                    ) => Some(NodeKind::Conditional {
                        test: std::mem::replace(test, Box::new(Node::empty(range))),
                        consequent: std::mem::replace(expression, Box::new(Node::empty(range))),
                        alternate: std::mem::replace(otherwise, Box::new(Node::empty(range))),
                    }),
                    _ => None,
                };
                if let Some(kind) = replacement {
                    return Ok(Some(Node::expression_statement(Node::new(kind, range))));
                }
            }
            NodeKind::Block { body } => {
                remove_empty(body);
                if !matches!(parent, Some(NodeType::Try) | Some(NodeType::CatchClause)) {
                    match body.len() {
                        0 => return Ok(Some(Node::empty(range))),
                        1 if !body[0].is_lexical_declaration() => return Ok(body.pop()),
                        _ => {}
                    }
                }
            }
            NodeKind::Program { body, .. } | NodeKind::SwitchCase { consequent: body, .. } => {
                remove_empty(body);
            }
            NodeKind::FunctionDeclaration { function }
            | NodeKind::FunctionExpression { function }
            | NodeKind::ArrowFunction { function } => remove_empty(&mut function.body),
            _ => {}
        }
        Ok(None)
    }
}
