//! Declaration hoisting
//!
//! Within every script and function body, function declarations are moved
//! to the front (after the directive prologue) and every `var`-declared
//! name is collected into one leading `var` statement. The original `var`
//! statements turn into plain assignments. This runs on the bare syntax
//! tree, before scope analysis.

use core_types::{JsError, SourceRange};
use parser::ast::{bound_names, AssignmentOperator, Function, Node, NodeKind, NodeType, SourceType, VariableKind};
use parser::{apply, Visitor};
use tracing::debug;

/// Names declared with `var` in one body, and whether that body is hoisted
struct Frame {
    enabled: bool,
    names: Vec<String>,
}

/// The hoisting pass
pub struct HoistPass {
    frames: Vec<Frame>,
    hoisted: usize,
}

impl Default for HoistPass {
    fn default() -> Self {
        Self::new()
    }
}

impl HoistPass {
    /// Create the pass
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            hoisted: 0,
        }
    }

    /// Hoist declarations in a whole program
    pub fn run(program: &mut Node) -> Result<usize, JsError> {
        let mut pass = HoistPass::new();
        apply(program, &mut pass)?;
        debug!(names = pass.hoisted, "hoisted var declarations");
        Ok(pass.hoisted)
    }

    fn enabled(&self) -> bool {
        self.frames.last().map(|frame| frame.enabled).unwrap_or(false)
    }

    fn record(&mut self, target: &Node) {
        if let Some(frame) = self.frames.last_mut() {
            let mut names = Vec::new();
            bound_names(target, &mut names);
            for name in names {
                if !frame.names.contains(&name) {
                    frame.names.push(name);
                }
            }
        }
    }

    /// `var` declarators as one expression, or `None` when none has an
    /// initializer
    fn declarations_to_expression(&mut self, node: &mut Node) -> Option<Node> {
        let NodeKind::VariableDeclaration { declarations, .. } = &mut node.kind else {
            return None;
        };
        let mut expressions = Vec::new();
        for declarator in std::mem::take(declarations) {
            let range = declarator.range;
            if let NodeKind::VariableDeclarator { id, init } = declarator.kind {
                self.record(&id);
                if let Some(init) = init {
                    expressions.push(Node::new(
                        NodeKind::Assignment {
                            operator: AssignmentOperator::Assign,
                            target: id,
                            value: init,
                        },
                        range,
                    ));
                }
            }
        }
        match expressions.len() {
            0 => None,
            1 => expressions.pop(),
            _ => Some(Node::new(NodeKind::Sequence { expressions }, node.range)),
        }
    }

    fn gather(&mut self, body: &mut Vec<Node>, mut exclusive: Vec<String>, range: SourceRange) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if !frame.enabled {
            return;
        }

        let mut first = body
            .iter()
            .take_while(|statement| matches!(statement.kind, NodeKind::Directive { .. }))
            .count();
        let mut index = first;
        while index < body.len() {
            if matches!(body[index].kind, NodeKind::FunctionDeclaration { .. }) {
                let function = body.remove(index);
                if let Some(id) = function.as_function().and_then(|f| f.id.as_deref()) {
                    bound_names(id, &mut exclusive);
                }
                body.insert(first, function);
                first += 1;
            }
            index += 1;
        }

        let declarations: Vec<Node> = frame
            .names
            .into_iter()
            .filter(|name| !exclusive.contains(name))
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
        if !declarations.is_empty() {
            self.hoisted += declarations.len();
            body.insert(
                first,
                Node::new(
                    NodeKind::VariableDeclaration {
                        kind: VariableKind::Var,
                        declarations,
                    },
                    range,
                ),
            );
        }
    }
}

fn is_var_declaration(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::VariableDeclaration {
            kind: VariableKind::Var,
            ..
        }
    )
}

fn parameter_names(function: &Function, with_own_name: bool) -> Vec<String> {
    let mut names = Vec::new();
    for param in &function.params {
        bound_names(param, &mut names);
    }
    if with_own_name {
        if let Some(id) = &function.id {
            bound_names(id, &mut names);
        }
    }
    names
}

impl Visitor for HoistPass {
    fn enter(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        let enabled = self.enabled();
        match &mut node.kind {
            NodeKind::Program { source_type, .. } => {
                self.frames.push(Frame {
                    enabled: *source_type == SourceType::Script,
                    names: Vec::new(),
                });
            }
            NodeKind::FunctionDeclaration { .. }
            | NodeKind::FunctionExpression { .. }
            | NodeKind::ArrowFunction { .. } => {
                self.frames.push(Frame {
                    enabled: true,
                    names: Vec::new(),
                });
            }
            NodeKind::For { init, .. } if enabled => {
                if let Some(head) = init.as_deref_mut() {
                    if is_var_declaration(head) {
                        *init = self.declarations_to_expression(head).map(Box::new);
                    }
                }
            }
            NodeKind::ForIn { left, .. } | NodeKind::ForOf { left, .. } if enabled => {
                if is_var_declaration(left) {
                    if let NodeKind::VariableDeclaration { declarations, .. } = &mut left.kind {
                        if let Some(NodeKind::VariableDeclarator { id, .. }) =
                            declarations.pop().map(|declarator| declarator.kind)
                        {
                            self.record(&id);
                            *left = id;
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn leave(&mut self, node: &mut Node, parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        let range = node.range;
        match &mut node.kind {
            NodeKind::Program { body, .. } => {
                self.gather(body, Vec::new(), SourceRange::at(range.start));
            }
            NodeKind::FunctionDeclaration { function } => {
                let exclusive = parameter_names(function, false);
                self.gather(&mut function.body, exclusive, SourceRange::at(range.start));
            }
            NodeKind::FunctionExpression { function } | NodeKind::ArrowFunction { function } => {
                let exclusive = parameter_names(function, true);
                self.gather(&mut function.body, exclusive, SourceRange::at(range.start));
            }
            NodeKind::VariableDeclaration {
                kind: VariableKind::Var,
                ..
            } if self.enabled() && parent != Some(NodeType::ExportNamed) => {
                let replacement = match self.declarations_to_expression(node) {
                    Some(expression) => Node::expression_statement(expression),
                    None => Node::empty(range),
                };
                return Ok(Some(replacement));
            }
            _ => {}
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::parse_script;

    fn hoisted(source: &str) -> Vec<Node> {
        let mut program = parse_script(source).unwrap();
        HoistPass::run(&mut program).unwrap();
        match program.kind {
            NodeKind::Program { body, .. } => body,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_functions_move_to_front() {
        let body = hoisted("a(); function f() {}");
        assert!(matches!(body[0].kind, NodeKind::FunctionDeclaration { .. }));
        assert!(matches!(body[1].kind, NodeKind::Expression { .. }));
    }

    #[test]
    fn test_vars_collected_after_directives() {
        let body = hoisted("'use strict'; a(); var x = 1, y; if (a) { var z; }");
        assert!(matches!(body[0].kind, NodeKind::Directive { .. }));
        let NodeKind::VariableDeclaration { declarations, .. } = &body[1].kind else {
            panic!("expected hoisted declaration, got {:?}", body[1].kind);
        };
        assert_eq!(declarations.len(), 3);
        assert!(matches!(body[3].kind, NodeKind::Expression { .. }));
    }

    #[test]
    fn test_parameters_are_not_redeclared() {
        let body = hoisted("function f(a) { var a = 1, b = 2; }");
        let function = body[0].as_function().unwrap();
        let NodeKind::VariableDeclaration { declarations, .. } = &function.body[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(declarations.len(), 1);
        let NodeKind::Expression { expression } = &function.body[1].kind else {
            panic!("expected assignments");
        };
        assert!(matches!(expression.kind, NodeKind::Sequence { .. }));
    }

    #[test]
    fn test_for_heads_become_targets() {
        let body = hoisted("for (var i = 0; i < 1; i++); for (var k in o);");
        assert!(matches!(body[0].kind, NodeKind::VariableDeclaration { .. }));
        let NodeKind::For { init, .. } = &body[1].kind else {
            panic!("expected for");
        };
        assert!(matches!(init.as_deref().map(|n| &n.kind), Some(NodeKind::Assignment { .. })));
        let NodeKind::ForIn { left, .. } = &body[2].kind else {
            panic!("expected for-in");
        };
        assert_eq!(left.as_identifier(), Some("k"));
    }

    #[test]
    fn test_let_is_untouched() {
        let body = hoisted("let a = 1;");
        assert!(body[0].is_lexical_declaration());
    }
}
