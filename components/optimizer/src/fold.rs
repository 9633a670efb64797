//! Constant folding and dead code elimination
//!
//! Runs bottom-up after scope analysis. Every node leaves the pass with an
//! accurate `side_effect` flag; literal operands are evaluated with the
//! [`Value`] coercion rules, branches with a constant test collapse, and
//! statements that cannot be reached or cannot be observed are removed.

use core_types::{ErrorKind, JsError, SourceRange, Value};
use parser::ast::{
    bound_names, BinaryOperator, LogicalOperator, Node, NodeKind, NodeType, UnaryOperator, VariableKind,
};
use parser::{apply, ScopeId, ScopeTree, SymbolKind, Visitor};
use tracing::{debug, trace};

/// The constant folding pass
pub struct ConstantFold<'a> {
    tree: &'a ScopeTree,
    scopes: Vec<ScopeId>,
    folded: usize,
}

impl<'a> ConstantFold<'a> {
    /// Create the pass over an analyzed tree
    pub fn new(tree: &'a ScopeTree) -> Self {
        Self {
            tree,
            scopes: Vec::new(),
            folded: 0,
        }
    }

    /// Fold a whole program, returning the number of rewrites performed
    pub fn run(program: &mut Node, tree: &ScopeTree) -> Result<usize, JsError> {
        let mut pass = ConstantFold::new(tree);
        apply(program, &mut pass)?;
        debug!(rewrites = pass.folded, "constant folding pass complete");
        Ok(pass.folded)
    }

    fn optimizable(&self) -> bool {
        self.scopes
            .last()
            .map(|scope| self.tree.is_optimizable(*scope))
            .unwrap_or(false)
    }

    fn replaced(&mut self, node: Node) -> Node {
        self.folded += 1;
        trace!(kind = ?node.node_type(), "folded");
        node
    }

    /// Remove unreachable and unobservable statements from a statement
    /// list. Returns whether anything remains.
    fn prune(&mut self, body: &mut Vec<Node>) -> bool {
        let mut index = 0;
        while index < body.len() {
            if body[index].is_abrupt() {
                let dead: Vec<Node> = body.drain(index + 1..).collect();
                let before = dead.len();
                let salvaged = salvage(dead);
                self.folded += before.saturating_sub(salvaged.len());
                body.extend(salvaged);
                break;
            }
            if body[index].side_effect {
                index += 1;
            } else {
                body.remove(index);
                self.folded += 1;
            }
        }
        !body.is_empty()
    }

    fn fold(&mut self, node: Node, parent: Option<NodeType>) -> Result<Node, JsError> {
        let Node { kind, range, .. } = node;
        let (kind, side_effect) = match kind {
            NodeKind::Identifier { name, symbol } => {
                let implicit = symbol
                    .map(|id| self.tree.symbol(id).kind == SymbolKind::Implicit)
                    .unwrap_or(false);
                if name == "undefined" && implicit && !is_target_position(parent) && self.optimizable() {
                    return Ok(self.replaced(Node::literal(Value::Undefined, range)));
                }
                (NodeKind::Identifier { name, symbol }, false)
            }
            kind @ (NodeKind::This
            | NodeKind::Literal { .. }
            | NodeKind::Name { .. }
            | NodeKind::RegExp { .. }
            | NodeKind::Empty
            | NodeKind::MetaProperty { .. }) => (kind, false),
            NodeKind::FunctionExpression { mut function } => {
                self.prune(&mut function.body);
                (NodeKind::FunctionExpression { function }, false)
            }
            NodeKind::ArrowFunction { mut function } => {
                self.prune(&mut function.body);
                (NodeKind::ArrowFunction { function }, false)
            }
            NodeKind::FunctionDeclaration { mut function } => {
                self.prune(&mut function.body);
                (NodeKind::FunctionDeclaration { function }, true)
            }
            NodeKind::Program {
                mut body,
                source_type,
                scope,
            } => {
                let live = self.prune(&mut body);
                (
                    NodeKind::Program {
                        body,
                        source_type,
                        scope,
                    },
                    live,
                )
            }
            NodeKind::Block { mut body } => {
                let live = self.prune(&mut body);
                if !matches!(parent, Some(NodeType::Try) | Some(NodeType::CatchClause)) {
                    if body.is_empty() {
                        return Ok(self.replaced(pure(NodeKind::Empty, range)));
                    }
                    if body.len() == 1 && !body[0].is_lexical_declaration() {
                        if let Some(single) = body.pop() {
                            return Ok(self.replaced(single));
                        }
                    }
                }
                (NodeKind::Block { body }, live)
            }
            NodeKind::SwitchCase { test, mut consequent } => {
                self.prune(&mut consequent);
                (NodeKind::SwitchCase { test, consequent }, true)
            }
            NodeKind::Expression { expression } => {
                if !expression.side_effect {
                    return Ok(self.replaced(pure(NodeKind::Empty, range)));
                }
                (NodeKind::Expression { expression }, true)
            }
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => return Ok(self.fold_if(*test, *consequent, alternate.map(|n| *n), range)),
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if let Some(value) = test.as_constant() {
                    let branch = if value.is_truthy() { *consequent } else { *alternate };
                    return Ok(self.replaced(branch));
                }
                let side_effect = test.side_effect || consequent.side_effect || alternate.side_effect;
                (
                    NodeKind::Conditional {
                        test,
                        consequent,
                        alternate,
                    },
                    side_effect,
                )
            }
            NodeKind::Logical { operator, left, right } => {
                if let Some(value) = left.as_constant() {
                    let keep_left = (operator == LogicalOperator::Or) == value.is_truthy();
                    return Ok(self.replaced(if keep_left { *left } else { *right }));
                }
                let side_effect = left.side_effect || right.side_effect;
                (NodeKind::Logical { operator, left, right }, side_effect)
            }
            NodeKind::Binary { operator, left, right } => {
                if matches!(operator, BinaryOperator::Instanceof | BinaryOperator::In)
                    && right.as_constant().is_some()
                {
                    return Err(JsError::new(
                        ErrorKind::SemanticTypeError,
                        format!("Right-hand side of '{}' is not an object", operator.as_str()),
                        Some(range),
                    ));
                }
                if let (Some(l), Some(r)) = (left.as_constant(), right.as_constant()) {
                    let value = evaluate_binary(operator, l, r);
                    return Ok(self.replaced(Node::literal(value, range)));
                }
                let side_effect = left.side_effect || right.side_effect;
                (NodeKind::Binary { operator, left, right }, side_effect)
            }
            NodeKind::Unary { operator, argument } => {
                if operator == UnaryOperator::Delete {
                    (NodeKind::Unary { operator, argument }, true)
                } else if operator == UnaryOperator::Void && !argument.side_effect {
                    if matches!(argument.as_constant(), Some(Value::Undefined)) {
                        (NodeKind::Unary { operator, argument }, false)
                    } else {
                        return Ok(self.replaced(Node::literal(Value::Undefined, range)));
                    }
                } else if let Some(value) = argument.as_constant() {
                    let value = evaluate_unary(operator, value);
                    return Ok(self.replaced(Node::literal(value, range)));
                } else {
                    let side_effect = argument.side_effect;
                    (NodeKind::Unary { operator, argument }, side_effect)
                }
            }
            NodeKind::Sequence { mut expressions } => {
                let before = expressions.len();
                if let Some(last) = expressions.pop() {
                    expressions.retain(|expression| expression.side_effect);
                    if expressions.is_empty() && keeps_reference(&last, parent) {
                        expressions.push(Node::literal(Value::Number(0.0), range));
                    }
                    expressions.push(last);
                }
                self.folded += before.saturating_sub(expressions.len());
                if expressions.len() == 1 {
                    if let Some(single) = expressions.pop() {
                        return Ok(self.replaced(single));
                    }
                }
                let side_effect = expressions.iter().any(|e| e.side_effect);
                (NodeKind::Sequence { expressions }, side_effect)
            }
            NodeKind::Array { elements } => {
                let side_effect = elements.iter().flatten().any(|e| e.side_effect);
                (NodeKind::Array { elements }, side_effect)
            }
            NodeKind::Object { properties } => {
                let side_effect = properties.iter().any(|p| p.side_effect);
                (NodeKind::Object { properties }, side_effect)
            }
            NodeKind::Property {
                key,
                value,
                kind,
                computed,
                shorthand,
                method,
            } => {
                let side_effect = (computed && key.side_effect) || value.side_effect;
                (
                    NodeKind::Property {
                        key,
                        value,
                        kind,
                        computed,
                        shorthand,
                        method,
                    },
                    side_effect,
                )
            }
            NodeKind::Template { quasis, expressions } => {
                let side_effect = !expressions.is_empty();
                (NodeKind::Template { quasis, expressions }, side_effect)
            }
            other => (other, true),
        };
        Ok(Node {
            kind,
            range,
            side_effect,
        })
    }

    fn fold_if(&mut self, test: Node, consequent: Node, alternate: Option<Node>, range: SourceRange) -> Node {
        let had_alternate = alternate.is_some();
        let consequent = Some(consequent).filter(|n| n.side_effect);
        let alternate = alternate.filter(|n| n.side_effect);
        if had_alternate && alternate.is_none() {
            self.folded += 1;
        }

        let (test, consequent, alternate) = match (consequent, alternate) {
            (Some(consequent), alternate) => (test, consequent, alternate),
            (None, Some(alternate)) => {
                self.folded += 1;
                (negate(test), alternate, None)
            }
            (None, None) => {
                let statement = if test.side_effect {
                    Node::expression_statement(test)
                } else {
                    pure(NodeKind::Empty, range)
                };
                return self.replaced(statement);
            }
        };

        if let Some(value) = test.as_constant() {
            let branch = if value.is_truthy() {
                consequent
            } else {
                alternate.unwrap_or_else(|| pure(NodeKind::Empty, range))
            };
            return self.replaced(branch);
        }

        let side_effect =
            test.side_effect || consequent.side_effect || alternate.as_ref().map_or(false, |n| n.side_effect);
        Node {
            kind: NodeKind::If {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: alternate.map(Box::new),
            },
            range,
            side_effect,
        }
    }
}

impl Visitor for ConstantFold<'_> {
    fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if let Some(scope) = scope_of(node) {
            self.scopes.push(scope);
        }
        Ok(None)
    }

    fn leave(&mut self, node: &mut Node, parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if scope_of(node).is_some() {
            self.scopes.pop();
        }
        let owned = std::mem::replace(node, Node::empty(node.range));
        *node = self.fold(owned, parent)?;
        Ok(None)
    }
}

fn pure(kind: NodeKind, range: SourceRange) -> Node {
    Node {
        kind,
        range,
        side_effect: false,
    }
}

fn scope_of(node: &Node) -> Option<ScopeId> {
    match &node.kind {
        NodeKind::Program { scope, .. } | NodeKind::With { scope, .. } | NodeKind::CatchClause { scope, .. } => {
            *scope
        }
        NodeKind::FunctionDeclaration { function }
        | NodeKind::FunctionExpression { function }
        | NodeKind::ArrowFunction { function } => function.scope,
        NodeKind::ClassExpression { class } => class.scope,
        _ => None,
    }
}

/// Whether unwrapping a sequence ending in `last` would turn a plain value
/// back into a reference: a method call binding `this`, a direct `eval`, or
/// a `delete`/`typeof` operand
fn keeps_reference(last: &Node, parent: Option<NodeType>) -> bool {
    match parent {
        Some(NodeType::Call | NodeType::TaggedTemplate) => {
            matches!(last.kind, NodeKind::Member { .. }) || last.as_identifier() == Some("eval")
        }
        Some(NodeType::Unary) => matches!(last.kind, NodeKind::Member { .. } | NodeKind::Identifier { .. }),
        _ => false,
    }
}

/// Parents under which an identifier may be written to or bound
fn is_target_position(parent: Option<NodeType>) -> bool {
    matches!(
        parent,
        Some(
            NodeType::Assignment
                | NodeType::Update
                | NodeType::ForIn
                | NodeType::ForOf
                | NodeType::AssignmentPattern
                | NodeType::ArrayPattern
                | NodeType::ObjectPattern
                | NodeType::Property
                | NodeType::Unary
                | NodeType::RestElement
        )
    )
}

fn negate(test: Node) -> Node {
    let range = test.range;
    if let Some(value) = test.as_constant() {
        return Node::literal(Value::Boolean(!value.is_truthy()), range);
    }
    let side_effect = test.side_effect;
    Node {
        kind: NodeKind::Unary {
            operator: UnaryOperator::Not,
            argument: Box::new(test),
        },
        range,
        side_effect,
    }
}

/// Statements after an abrupt completion: function declarations survive,
/// and `var` names stay declared
fn salvage(dead: Vec<Node>) -> Vec<Node> {
    let mut kept = Vec::new();
    let mut names = Vec::new();
    for statement in &dead {
        collect_var_names(statement, &mut names);
    }
    let range = dead.first().map(|n| SourceRange::at(n.range.start)).unwrap_or_default();
    for statement in dead {
        if matches!(statement.kind, NodeKind::FunctionDeclaration { .. }) {
            kept.push(statement);
        }
    }
    if !names.is_empty() {
        let declarations = names
            .into_iter()
            .map(|name| {
                Node::new(
                    NodeKind::VariableDeclarator {
                        id: Box::new(Node::identifier(name, range)),
                        init: None,
                    },
                    range,
                )
            })
            .collect();
        kept.push(Node::new(
            NodeKind::VariableDeclaration {
                kind: VariableKind::Var,
                declarations,
            },
            range,
        ));
    }
    kept
}

fn collect_var_names(statement: &Node, out: &mut Vec<String>) {
    match &statement.kind {
        NodeKind::VariableDeclaration {
            kind: VariableKind::Var,
            declarations,
        } => {
            let mut names = Vec::new();
            for declarator in declarations {
                if let NodeKind::VariableDeclarator { id, .. } = &declarator.kind {
                    bound_names(id, &mut names);
                }
            }
            for name in names {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        NodeKind::Block { body } => body.iter().for_each(|s| collect_var_names(s, out)),
        NodeKind::If {
            consequent, alternate, ..
        } => {
            collect_var_names(consequent, out);
            if let Some(alternate) = alternate {
                collect_var_names(alternate, out);
            }
        }
        NodeKind::For { init, body, .. } => {
            if let Some(init) = init {
                collect_var_names(init, out);
            }
            collect_var_names(body, out);
        }
        NodeKind::ForIn { left, body, .. } | NodeKind::ForOf { left, body, .. } => {
            collect_var_names(left, out);
            collect_var_names(body, out);
        }
        NodeKind::While { body, .. }
        | NodeKind::DoWhile { body, .. }
        | NodeKind::Labeled { body, .. }
        | NodeKind::With { body, .. } => collect_var_names(body, out),
        NodeKind::Switch { cases, .. } => {
            for case in cases {
                if let NodeKind::SwitchCase { consequent, .. } = &case.kind {
                    consequent.iter().for_each(|s| collect_var_names(s, out));
                }
            }
        }
        NodeKind::Try {
            block,
            handler,
            finalizer,
        } => {
            collect_var_names(block, out);
            if let Some(handler) = handler {
                if let NodeKind::CatchClause { body, .. } = &handler.kind {
                    collect_var_names(body, out);
                }
            }
            if let Some(finalizer) = finalizer {
                collect_var_names(finalizer, out);
            }
        }
        _ => {}
    }
}

fn evaluate_binary(operator: BinaryOperator, l: &Value, r: &Value) -> Value {
    let shift = || r.to_uint32() & 31;
    match operator {
        BinaryOperator::Add => l.add(r),
        BinaryOperator::Sub => Value::Number(l.to_number() - r.to_number()),
        BinaryOperator::Mul => Value::Number(l.to_number() * r.to_number()),
        BinaryOperator::Div => Value::Number(l.to_number() / r.to_number()),
        BinaryOperator::Mod => Value::Number(l.to_number() % r.to_number()),
        BinaryOperator::LeftShift => Value::Number(l.to_int32().wrapping_shl(shift()) as f64),
        BinaryOperator::RightShift => Value::Number((l.to_int32() >> shift()) as f64),
        BinaryOperator::UnsignedRightShift => Value::Number((l.to_uint32() >> shift()) as f64),
        BinaryOperator::BitwiseAnd => Value::Number((l.to_int32() & r.to_int32()) as f64),
        BinaryOperator::BitwiseOr => Value::Number((l.to_int32() | r.to_int32()) as f64),
        BinaryOperator::BitwiseXor => Value::Number((l.to_int32() ^ r.to_int32()) as f64),
        BinaryOperator::Lt => Value::Boolean(l.less_than(r) == Some(true)),
        BinaryOperator::Gt => Value::Boolean(r.less_than(l) == Some(true)),
        BinaryOperator::LtEq => Value::Boolean(r.less_than(l) == Some(false)),
        BinaryOperator::GtEq => Value::Boolean(l.less_than(r) == Some(false)),
        BinaryOperator::Eq => Value::Boolean(l.loose_equals(r)),
        BinaryOperator::NotEq => Value::Boolean(!l.loose_equals(r)),
        BinaryOperator::StrictEq => Value::Boolean(l.strict_equals(r)),
        BinaryOperator::StrictNotEq => Value::Boolean(!l.strict_equals(r)),
        // rejected before evaluation
        BinaryOperator::Instanceof | BinaryOperator::In => Value::Boolean(false),
    }
}

fn evaluate_unary(operator: UnaryOperator, value: &Value) -> Value {
    match operator {
        UnaryOperator::Minus => Value::Number(-value.to_number()),
        UnaryOperator::Plus => Value::Number(value.to_number()),
        UnaryOperator::Not => Value::Boolean(!value.is_truthy()),
        UnaryOperator::BitwiseNot => Value::Number(!value.to_int32() as f64),
        UnaryOperator::Typeof => Value::String(value.type_of().to_string()),
        UnaryOperator::Void => Value::Undefined,
        UnaryOperator::Delete => Value::Boolean(true),
    }
}
