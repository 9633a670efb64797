//! Contract tests for the parser API
//!
//! These tests exercise the public surface only: lexing, parsing, the
//! visitor protocol and scope analysis.

use core_types::{ErrorKind, JsError, Value};
use parser::ast::{BinaryOperator, VariableKind};
use parser::scope::{Resolution, ScopeKind, SymbolKind};
use parser::{
    apply, parse_module, parse_script, Keyword, Lexer, Node, NodeKind, NodeType, Parser, Punctuator,
    ScopeAnalysis, SourceType, TokenKind, Visitor,
};

fn statements(program: &Node) -> &[Node] {
    match &program.kind {
        NodeKind::Program { body, .. } => body,
        other => panic!("expected program, got {:?}", other),
    }
}

// =============================================================================
// Lexer Contract Tests
// =============================================================================

#[test]
fn test_lexer_next_token_returns_result() {
    let mut lexer = Lexer::new("let x = 42;");
    let result: Result<_, JsError> = lexer.next_token();
    assert!(result.is_ok());
}

#[test]
fn test_lexer_token_sequence() {
    let mut lexer = Lexer::new("if (a) return 0x10;");
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token.is_eof() {
            break;
        }
        kinds.push(token.kind);
    }
    assert_eq!(kinds.len(), 7);
    assert!(matches!(&kinds[0], TokenKind::Identifier(name) if name == "if"));
    assert_eq!(kinds[1], TokenKind::Punctuator(Punctuator::LParen));
    assert_eq!(kinds[5], TokenKind::Number(16.0));
}

#[test]
fn test_lexer_marks_line_breaks() {
    let mut lexer = Lexer::new("a\nb");
    let first = lexer.next_token().unwrap();
    let second = lexer.next_token().unwrap();
    assert!(!first.line_before);
    assert!(second.line_before);
}

#[test]
fn test_escaped_keyword_is_not_a_keyword() {
    let mut lexer = Lexer::new("\\u0069f");
    let token = lexer.next_token().unwrap();
    assert!(token.escaped);
    assert_eq!(token.keyword(), None);
    assert_eq!(token.identifier_name(), Some("if"));
}

#[test]
fn test_keyword_lookup() {
    assert_eq!(Keyword::from_name("instanceof"), Some(Keyword::Instanceof));
    assert_eq!(Keyword::from_name("let"), None);
}

#[test]
fn test_unterminated_string_is_lexical_error() {
    let mut lexer = Lexer::new("'abc");
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.kind, ErrorKind::LexicalError);
}

// =============================================================================
// Parser Contract Tests
// =============================================================================

#[test]
fn test_parse_script_returns_program() {
    let program = parse_script("var a = 1, b; a + b;").unwrap();
    assert_eq!(program.node_type(), NodeType::Program);
    let body = statements(&program);
    assert_eq!(body.len(), 2);
    match &body[0].kind {
        NodeKind::VariableDeclaration { kind, declarations } => {
            assert_eq!(*kind, VariableKind::Var);
            assert_eq!(declarations.len(), 2);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_module_sets_source_type() {
    let program = parse_module("export const a = 1;").unwrap();
    assert!(matches!(
        program.kind,
        NodeKind::Program {
            source_type: SourceType::Module,
            ..
        }
    ));
}

#[test]
fn test_literal_values() {
    let program = parse_script("'s'; 1.5; null; true;").unwrap();
    let values: Vec<Value> = statements(&program)
        .iter()
        .filter_map(|statement| match &statement.kind {
            NodeKind::Expression { expression } => expression.as_constant().cloned(),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        vec![Value::Number(1.5), Value::Null, Value::Boolean(true)]
    );
    // the leading string is a directive
    assert!(matches!(statements(&program)[0].kind, NodeKind::Directive { .. }));
}

#[test]
fn test_syntax_error_carries_range() {
    let err = parse_script("var = 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
    assert!(err.range.is_some());
}

#[test]
fn test_parser_reports_strict_warnings() {
    let mut parser = Parser::new("var eval = 1; with (a) {}");
    parser.parse().unwrap();
    assert_eq!(parser.context().warnings().len(), 2);
    assert!(!parser.context().has_errors());
}

#[test]
fn test_asi_restricted_postfix() {
    let program = parse_script("a\n++\nb").unwrap();
    assert_eq!(statements(&program).len(), 2);
}

#[test]
fn test_hashbang_is_skipped() {
    assert!(parse_script("#!/usr/bin/env node\nfoo()").is_ok());
}

#[test]
fn test_ast_serializes_to_json() {
    let program = parse_script("x = 1 + 2").unwrap();
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["type"], "Program");
    assert_eq!(json["body"][0]["type"], "Expression");
}

// =============================================================================
// Visitor Contract Tests
// =============================================================================

struct SwapAddition;

impl Visitor for SwapAddition {
    fn leave(&mut self, node: &mut Node, _parent: Option<NodeType>) -> Result<Option<Node>, JsError> {
        if let NodeKind::Binary {
            operator: BinaryOperator::Add,
            ..
        } = node.kind
        {
            return Ok(Some(Node::literal(Value::Number(0.0), node.range)));
        }
        Ok(None)
    }
}

#[test]
fn test_visitor_replaces_nodes() {
    let mut program = parse_script("f(1 + 2)").unwrap();
    apply(&mut program, &mut SwapAddition).unwrap();
    let NodeKind::Expression { expression } = &statements(&program)[0].kind else {
        panic!("expected expression statement");
    };
    let NodeKind::Call { arguments, .. } = &expression.kind else {
        panic!("expected call");
    };
    assert_eq!(arguments[0].as_constant(), Some(&Value::Number(0.0)));
}

// =============================================================================
// Scope Analysis Contract Tests
// =============================================================================

#[test]
fn test_scope_analysis_builds_tree() {
    let mut program = parse_script("var a; function f(b) { var c; try {} catch (e) {} }").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();
    let kinds: Vec<ScopeKind> = tree.scopes().iter().map(|scope| scope.kind).collect();
    assert_eq!(kinds, vec![ScopeKind::Global, ScopeKind::Function, ScopeKind::Catch]);

    let global = tree.global();
    assert!(tree.lookup_local(global, "a").is_some());
    assert!(tree.lookup_local(global, "f").is_some());
    assert!(tree.lookup_local(global, "c").is_none());
}

#[test]
fn test_undeclared_names_become_implicit_globals() {
    let mut program = parse_script("function f() { return g; }").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();
    let global = tree.global();
    let symbol = tree.lookup_local(global, "g").expect("implicit global");
    assert_eq!(tree.symbol(symbol).kind, SymbolKind::Implicit);
}

#[test]
fn test_with_blocks_static_resolution() {
    let mut program = parse_script("function f(o) { with (o) { x; } }").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();
    let with_scope = tree
        .scopes()
        .iter()
        .find(|scope| scope.kind == ScopeKind::With)
        .expect("with scope")
        .id;
    assert_eq!(tree.resolve(with_scope, "x"), Resolution::Dynamic);
    assert!(!tree.is_optimizable(with_scope));
}
