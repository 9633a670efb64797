//! Generic enter/leave traversal with node replacement
//!
//! A pass implements [`Visitor`] and is run over a tree with [`apply`].
//! `enter` runs before a node's children and may return a replacement,
//! in which case the children are skipped. `leave` runs after the children
//! and may also return a replacement. Replacements are written back into
//! the slot the original node occupied.

use core_types::JsError;

use crate::ast::{Class, Function, Node, NodeKind, NodeType};

/// Callbacks invoked around every node of a traversal
pub trait Visitor {
    /// Called before the children of `node` are visited
    fn enter(&mut self, _node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        Ok(None)
    }

    /// Called after the children of `node` were visited
    fn leave(&mut self, _node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        Ok(None)
    }
}

/// Run one pass over a whole tree
pub fn apply<V: Visitor + ?Sized>(root: &mut Node, visitor: &mut V) -> Result<(), JsError> {
    traverse(visitor, root, None)
}

/// Visit `node` and its subtree
pub fn traverse<V: Visitor + ?Sized>(
    visitor: &mut V,
    node: &mut Node,
    parent: Option<NodeType>,
) -> Result<(), JsError> {
    if let Some(replacement) = visitor.enter(node, parent)? {
        *node = replacement;
        return Ok(());
    }
    let node_type = node.node_type();
    walk_children(visitor, node, node_type)?;
    if let Some(replacement) = visitor.leave(node, parent)? {
        *node = replacement;
    }
    Ok(())
}

fn visit<V: Visitor + ?Sized>(v: &mut V, child: &mut Node, parent: NodeType) -> Result<(), JsError> {
    traverse(v, child, Some(parent))
}

fn visit_opt<V: Visitor + ?Sized>(
    v: &mut V,
    child: &mut Option<Box<Node>>,
    parent: NodeType,
) -> Result<(), JsError> {
    if let Some(child) = child {
        traverse(v, child, Some(parent))?;
    }
    Ok(())
}

fn visit_list<V: Visitor + ?Sized>(
    v: &mut V,
    children: &mut [Node],
    parent: NodeType,
) -> Result<(), JsError> {
    for child in children {
        traverse(v, child, Some(parent))?;
    }
    Ok(())
}

fn visit_holes<V: Visitor + ?Sized>(
    v: &mut V,
    children: &mut [Option<Node>],
    parent: NodeType,
) -> Result<(), JsError> {
    for child in children.iter_mut().flatten() {
        traverse(v, child, Some(parent))?;
    }
    Ok(())
}

fn visit_function<V: Visitor + ?Sized>(
    v: &mut V,
    function: &mut Function,
    parent: NodeType,
) -> Result<(), JsError> {
    visit_opt(v, &mut function.id, parent)?;
    visit_list(v, &mut function.params, parent)?;
    visit_list(v, &mut function.body, parent)
}

fn visit_class<V: Visitor + ?Sized>(v: &mut V, class: &mut Class, parent: NodeType) -> Result<(), JsError> {
    visit_opt(v, &mut class.id, parent)?;
    visit_opt(v, &mut class.super_class, parent)?;
    visit_list(v, &mut class.body, parent)
}

/// Visit the children of `node` in their fixed, kind-specific order
fn walk_children<V: Visitor + ?Sized>(v: &mut V, node: &mut Node, t: NodeType) -> Result<(), JsError> {
    match &mut node.kind {
        NodeKind::Program { body, .. } | NodeKind::Block { body } => visit_list(v, body, t),

        NodeKind::Empty
        | NodeKind::Debugger
        | NodeKind::Directive { .. }
        | NodeKind::Break { .. }
        | NodeKind::Continue { .. }
        | NodeKind::ExportSpecifier { .. }
        | NodeKind::ExportAll { .. }
        | NodeKind::Identifier { .. }
        | NodeKind::Name { .. }
        | NodeKind::Literal { .. }
        | NodeKind::RegExp { .. }
        | NodeKind::This
        | NodeKind::Super
        | NodeKind::MetaProperty { .. } => Ok(()),

        NodeKind::Expression { expression } => visit(v, expression, t),
        NodeKind::If {
            test,
            consequent,
            alternate,
        } => {
            visit(v, test, t)?;
            visit(v, consequent, t)?;
            visit_opt(v, alternate, t)
        }
        NodeKind::Labeled { body, .. } => visit(v, body, t),
        NodeKind::With { object, body, .. } => {
            visit(v, object, t)?;
            visit(v, body, t)
        }
        NodeKind::Switch {
            discriminant,
            cases,
        } => {
            visit(v, discriminant, t)?;
            visit_list(v, cases, t)
        }
        NodeKind::SwitchCase { test, consequent } => {
            visit_opt(v, test, t)?;
            visit_list(v, consequent, t)
        }
        NodeKind::Return { argument } => visit_opt(v, argument, t),
        NodeKind::Throw { argument } => visit(v, argument, t),
        NodeKind::Try {
            block,
            handler,
            finalizer,
        } => {
            visit(v, block, t)?;
            visit_opt(v, handler, t)?;
            visit_opt(v, finalizer, t)
        }
        NodeKind::CatchClause { param, body, .. } => {
            visit(v, param, t)?;
            visit(v, body, t)
        }
        NodeKind::While { test, body } => {
            visit(v, test, t)?;
            visit(v, body, t)
        }
        NodeKind::DoWhile { body, test } => {
            visit(v, body, t)?;
            visit(v, test, t)
        }
        NodeKind::For {
            init,
            test,
            update,
            body,
        } => {
            visit_opt(v, init, t)?;
            visit_opt(v, test, t)?;
            visit_opt(v, update, t)?;
            visit(v, body, t)
        }
        NodeKind::ForIn { left, right, body } | NodeKind::ForOf { left, right, body } => {
            visit(v, left, t)?;
            visit(v, right, t)?;
            visit(v, body, t)
        }
        NodeKind::VariableDeclaration { declarations, .. } => visit_list(v, declarations, t),
        NodeKind::VariableDeclarator { id, init } => {
            visit(v, id, t)?;
            visit_opt(v, init, t)
        }
        NodeKind::FunctionDeclaration { function }
        | NodeKind::FunctionExpression { function }
        | NodeKind::ArrowFunction { function } => visit_function(v, function, t),
        NodeKind::ClassDeclaration { class } | NodeKind::ClassExpression { class } => {
            visit_class(v, class, t)
        }
        NodeKind::MethodDefinition { key, value, .. } => {
            visit(v, key, t)?;
            visit(v, value, t)
        }
        NodeKind::Import { specifiers, .. } => visit_list(v, specifiers, t),
        NodeKind::ImportSpecifier { local, .. }
        | NodeKind::ImportDefaultSpecifier { local }
        | NodeKind::ImportNamespaceSpecifier { local } => visit(v, local, t),
        NodeKind::ExportNamed {
            declaration,
            specifiers,
            ..
        } => {
            visit_opt(v, declaration, t)?;
            visit_list(v, specifiers, t)
        }
        NodeKind::ExportDefault { declaration } => visit(v, declaration, t),
        NodeKind::Template { expressions, .. } => visit_list(v, expressions, t),
        NodeKind::TaggedTemplate { tag, quasi } => {
            visit(v, tag, t)?;
            visit(v, quasi, t)
        }
        NodeKind::Array { elements } | NodeKind::ArrayPattern { elements } => {
            visit_holes(v, elements, t)
        }
        NodeKind::Object { properties } | NodeKind::ObjectPattern { properties } => {
            visit_list(v, properties, t)
        }
        NodeKind::Property { key, value, .. } => {
            visit(v, key, t)?;
            visit(v, value, t)
        }
        NodeKind::Unary { argument, .. }
        | NodeKind::Update { argument, .. }
        | NodeKind::Spread { argument }
        | NodeKind::RestElement { argument } => visit(v, argument, t),
        NodeKind::Binary { left, right, .. } | NodeKind::Logical { left, right, .. } => {
            visit(v, left, t)?;
            visit(v, right, t)
        }
        NodeKind::Assignment { target, value, .. } => {
            visit(v, target, t)?;
            visit(v, value, t)
        }
        NodeKind::AssignmentPattern { target, default } => {
            visit(v, target, t)?;
            visit(v, default, t)
        }
        NodeKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visit(v, test, t)?;
            visit(v, consequent, t)?;
            visit(v, alternate, t)
        }
        NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
            visit(v, callee, t)?;
            visit_list(v, arguments, t)
        }
        NodeKind::Member {
            object, property, ..
        } => {
            visit(v, object, t)?;
            visit(v, property, t)
        }
        NodeKind::Sequence { expressions } => visit_list(v, expressions, t),
        NodeKind::Yield { argument, .. } => visit_opt(v, argument, t),

        NodeKind::CoveredFormals { .. } => Err(JsError::internal(format!(
            "Unsupported node {:?} at offset {}",
            t, node.range.start
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ErrorKind, SourceRange, Value};

    fn num(n: f64) -> Node {
        Node::literal(Value::Number(n), SourceRange::default())
    }

    fn program(body: Vec<Node>) -> Node {
        Node::new(
            NodeKind::Program {
                body,
                source_type: crate::ast::SourceType::Script,
                scope: None,
            },
            SourceRange::default(),
        )
    }

    struct Recorder {
        events: Vec<String>,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
            self.events.push(format!("enter {:?}", node.node_type()));
            Ok(None)
        }

        fn leave(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
            self.events.push(format!("leave {:?}", node.node_type()));
            Ok(None)
        }
    }

    #[test]
    fn test_enter_leave_order() {
        let mut root = program(vec![Node::expression_statement(num(1.0))]);
        let mut recorder = Recorder { events: vec![] };
        apply(&mut root, &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec![
                "enter Program",
                "enter Expression",
                "enter Literal",
                "leave Literal",
                "leave Expression",
                "leave Program"
            ]
        );
    }

    struct Doubler;

    impl Visitor for Doubler {
        fn leave(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
            if let Some(Value::Number(n)) = node.as_constant() {
                return Ok(Some(num(n * 2.0)));
            }
            Ok(None)
        }
    }

    #[test]
    fn test_leave_replacement_is_spliced() {
        let mut root = program(vec![Node::expression_statement(num(21.0))]);
        apply(&mut root, &mut Doubler).unwrap();
        let NodeKind::Program { body, .. } = &root.kind else {
            panic!("expected program");
        };
        let NodeKind::Expression { expression } = &body[0].kind else {
            panic!("expected expression statement");
        };
        assert_eq!(expression.as_constant(), Some(&Value::Number(42.0)));
    }

    struct SkipExpressions {
        literals_seen: usize,
    }

    impl Visitor for SkipExpressions {
        fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
            match node.kind {
                NodeKind::Expression { .. } => Ok(Some(Node::empty(node.range))),
                NodeKind::Literal { .. } => {
                    self.literals_seen += 1;
                    Ok(None)
                }
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_enter_replacement_skips_children() {
        let mut root = program(vec![Node::expression_statement(num(1.0))]);
        let mut pass = SkipExpressions { literals_seen: 0 };
        apply(&mut root, &mut pass).unwrap();
        assert_eq!(pass.literals_seen, 0);
        let NodeKind::Program { body, .. } = &root.kind else {
            panic!("expected program");
        };
        assert!(body[0].is_empty_statement());
    }

    #[test]
    fn test_unsupported_node_is_internal_error() {
        let covered = Node::new(
            NodeKind::CoveredFormals { expressions: vec![] },
            SourceRange::default(),
        );
        let mut root = program(vec![Node::expression_statement(covered)]);
        let err = apply(&mut root, &mut Recorder { events: vec![] }).unwrap_err();
        assert!(err.is(ErrorKind::InternalError));
    }
}
