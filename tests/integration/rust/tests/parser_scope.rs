//! Parser and ScopeAnalysis Integration Tests
//!
//! Tests the flow: Source -> Parser -> AST -> ScopeAnalysis, including
//! automatic semicolon insertion and scope bookkeeping across crates.

use core_types::ErrorKind;
use parser::{parse_script, Node, NodeKind, ScopeAnalysis, ScopeKind, SymbolKind};

fn statements(source: &str) -> Vec<Node> {
    match parse_script(source).expect("parse failed").kind {
        NodeKind::Program { body, .. } => body,
        other => panic!("expected program, got {:?}", other),
    }
}

/// Test: a line break ends an expression statement
#[test]
fn test_asi_between_identifiers() {
    assert_eq!(statements("a\nb").len(), 2);
}

/// Test: postfix `++` cannot follow a line break
#[test]
fn test_asi_before_prefix_increment() {
    let body = statements("a\n++b");
    assert_eq!(body.len(), 2);
    let NodeKind::Expression { expression } = &body[1].kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(expression.kind, NodeKind::Update { prefix: true, .. }));
}

/// Test: `return` followed by a line break returns nothing
#[test]
fn test_asi_after_return() {
    let body = statements("function f() { return\na }");
    let function = body[0].as_function().unwrap();
    assert_eq!(function.body.len(), 2);
    assert!(matches!(function.body[0].kind, NodeKind::Return { argument: None }));
    assert!(matches!(function.body[1].kind, NodeKind::Expression { .. }));
}

/// Test: a missing semicolon on one line is a syntax error
#[test]
fn test_missing_semicolon_is_an_error() {
    let error = parse_script("a b").unwrap_err();
    assert!(error.is(ErrorKind::SyntaxError));
}

/// Test: scopes nest the way functions and catch clauses nest
#[test]
fn test_scope_tree_shape() {
    let mut program =
        parse_script("var g; function f(p) { try {} catch (e) { var inner; } return function () {}; }").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();

    let kinds: Vec<ScopeKind> = tree.scopes().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![ScopeKind::Global, ScopeKind::Function, ScopeKind::Catch, ScopeKind::Function]
    );
    let catch = &tree.scopes()[2];
    assert_eq!(catch.symbols.len(), 1);
    let function = &tree.scopes()[1];
    let names: Vec<&str> = function.symbols.iter().map(|id| tree.symbol(*id).name.as_str()).collect();
    assert_eq!(names, vec!["p", "inner"]);
}

/// Test: unresolved references become implicit globals
#[test]
fn test_implicit_globals() {
    let mut program = parse_script("'use strict'; function f() { return missing; }").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();

    let implicit: Vec<&str> = tree
        .symbols()
        .iter()
        .filter(|s| s.kind == SymbolKind::Implicit)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(implicit, vec!["missing"]);
}

/// Test: `with` and `eval` clear optimizability outward
#[test]
fn test_dynamic_constructs_block_optimization() {
    let mut program = parse_script("function a() { function b() { eval(''); } } function c() {}").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();
    let flags: Vec<bool> = tree.scopes().iter().map(|s| s.optimizable).collect();
    assert_eq!(flags, vec![false, false, false, true]);

    let mut program = parse_script("function d(o) { with (o) {} }").unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();
    assert!(tree.scopes().iter().all(|s| !s.optimizable));
}

/// Test: the syntax tree survives a JSON round trip
#[test]
fn test_ast_serde_round_trip() {
    let program = parse_script("let [a, ...b] = c; class K extends L { static m() {} }").unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, program);
}
