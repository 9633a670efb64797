//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Parser -> ScopeAnalysis -> Hoist ->
//! ConstantFold -> Minify -> Printer -> Source, and the properties the
//! output must keep.

use std::collections::HashSet;

use core_types::ErrorKind;
use integration_tests::minify;
use optimizer::{compile, print, CompileOptions, MinifyPass};
use parser::{parse_script, ScopeAnalysis, ScopeId, ScopeTree, SymbolKind};

const PROGRAMS: &[&str] = &[
    "var total = 0; function add(value) { total += value; return total; } add(1 + 2);",
    "function outer(a, b) { function inner(c) { return a * c + b; } return inner(a) ? inner(b) : null; }",
    "var list = [1, 2.5, 'three', null]; for (var i = 0; i < list.length; i++) { if (list[i]) log(list[i]); }",
    "function f(o) { try { return o.x; } catch (err) { return err.message; } finally { done(); } }",
    "var fn = (x, y = 2) => x * y, obj = { key: fn, 'quoted-key': 1, nested: { deep: true } };",
    "switch (mode) { case 'a': run(1); break; case 'b': run(2); default: run(0); }",
    "label: for (var k in source) { if (!source.hasOwnProperty(k)) continue label; copy[k] = source[k]; }",
    "class Shape { constructor(size) { this.size = size; } get area() { return this.size * this.size; } }",
    "do { n = n / 2 | 0; } while (n > 1e3 && !stop)",
    "x = typeof y === 'undefined' ? void 0 : -y; z = `a${x}b`;",
];

/// Count implicit globals of a program after analysis
fn implicit_globals(source: &str) -> Vec<String> {
    let mut program = parse_script(source).unwrap();
    let tree = ScopeAnalysis::analyze(&mut program).unwrap();
    let mut names: Vec<String> = tree
        .symbols()
        .iter()
        .filter(|s| s.kind == SymbolKind::Implicit)
        .map(|s| s.name.clone())
        .collect();
    names.sort();
    names
}

/// Test: constant arithmetic folds to one literal
#[test]
fn test_fold_arithmetic() {
    assert_eq!(minify("x = 1 + 2 * 3;"), "x=7");
}

/// Test: string concatenation folds
#[test]
fn test_fold_strings() {
    assert_eq!(minify("x = \"a\" + \"b\";"), "x='ab'");
}

/// Test: `instanceof` with a literal right operand is rejected
#[test]
fn test_fold_instanceof_literal() {
    let error = compile("x instanceof 1;", &CompileOptions::default()).unwrap_err();
    assert!(error.is(ErrorKind::SemanticTypeError));
}

/// Test: everything after `return` is dropped
#[test]
fn test_dead_code_after_return() {
    let code = minify("function f() { return 1; var x; log(x); }");
    assert_eq!(code, "function f(){var _;return 1}");
    assert!(!code.contains("log"));
}

/// Test: `100` is printed in its shortest spelling
#[test]
fn test_comma_callee_keeps_call_semantics() {
    assert_eq!(
        minify("function f(o) { return (0, o.m)(); }"),
        "function f(_){return(0,_.m)()}"
    );
    assert_eq!(minify("x = (0, eval)('1');"), "x=(0,eval)('1')");
    assert_eq!(minify("x = (a, b);"), "x=b");
}

#[test]
fn test_shortest_number() {
    assert_eq!(minify("x = 100;"), "x=100");
    assert_eq!(minify("x = 1000;"), "x=1e3");
    assert_eq!(minify("x = 0.5;"), "x=.5");
    assert_eq!(minify("x = 100 .toString();"), "x=1e2.toString()");
}

/// Test: printed output reparses to the same printed output
#[test]
fn test_round_trip() {
    for source in PROGRAMS {
        let code = minify(source);
        let reparsed = parse_script(&code).unwrap_or_else(|e| panic!("{:?} does not reparse: {}", code, e));
        assert_eq!(print(&reparsed).unwrap(), code, "round trip of {:?}", source);
    }
}

/// Test: minifying minified output changes nothing
#[test]
fn test_idempotence() {
    for source in PROGRAMS {
        let once = minify(source);
        let twice = minify(&once);
        assert_eq!(once, twice, "second pass changed {:?}", source);
    }
}

/// Test: renaming never captures a free reference
#[test]
fn test_renaming_keeps_free_references() {
    for source in PROGRAMS {
        let code = minify(source);
        assert_eq!(
            implicit_globals(source),
            implicit_globals(&code),
            "free names changed for {:?}",
            source
        );
    }
}

fn assert_no_collisions(tree: &ScopeTree, scope: ScopeId) {
    let own: Vec<&str> = tree
        .scope(scope)
        .symbols
        .iter()
        .map(|id| tree.symbol(*id).visible_name())
        .collect();
    let unique: HashSet<&str> = own.iter().copied().collect();
    assert_eq!(unique.len(), own.len(), "duplicate names in {:?}", scope);

    if let Some(parent) = tree.scope(scope).parent {
        for id in &tree.scope(scope).symbols {
            let symbol = tree.symbol(*id);
            if symbol.mangled.is_some() {
                assert!(
                    !tree.is_declared(parent, symbol.visible_name()),
                    "{} shadows an enclosing name",
                    symbol.visible_name()
                );
            }
        }
    }
    for child in &tree.scope(scope).children {
        assert_no_collisions(tree, *child);
    }
}

/// Test: renamed symbols avoid every enclosing name
#[test]
fn test_scope_safety() {
    for source in PROGRAMS {
        let mut program = parse_script(source).unwrap();
        let mut tree = ScopeAnalysis::analyze(&mut program).unwrap();
        MinifyPass::run(&mut program, &mut tree, true).unwrap();
        assert_no_collisions(&tree, tree.global());
    }
}

/// Test: programs using `eval` keep their names
#[test]
fn test_eval_prevents_renaming() {
    assert_eq!(
        minify("function f(secret) { return eval('secret'); }"),
        "function f(secret){return eval('secret')}"
    );
}

/// Test: each pass can be turned off on its own
#[test]
fn test_pass_switches() {
    let source = "function f(value) { var doubled = value * 2; return doubled; }";
    let all_off = CompileOptions::default()
        .with_hoist(false)
        .with_fold(false)
        .with_mangle(false);
    assert_eq!(
        compile(source, &all_off).unwrap().code,
        "function f(value){var doubled=value*2;return doubled}"
    );
    assert_eq!(minify(source), "function f(_){var $;$=_*2;return $}");
}
