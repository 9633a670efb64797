//! Constant folding and dead code removal through the public API

use core_types::ErrorKind;
use optimizer::{compile, CompileOptions};

fn folded(source: &str) -> String {
    let options = CompileOptions::default().with_hoist(false).with_mangle(false);
    compile(source, &options).unwrap().code
}

#[test]
fn test_arithmetic_folds() {
    assert_eq!(folded("x = 1 + 2 * 3;"), "x=7");
    assert_eq!(folded("x = (1 + 2) * 3;"), "x=9");
    assert_eq!(folded("x = 10 / 4;"), "x=2.5");
    assert_eq!(folded("x = 7 % 4;"), "x=3");
}

#[test]
fn test_string_concatenation_folds() {
    assert_eq!(folded("x = 'a' + 'b' + 1;"), "x='ab1'");
    assert_eq!(folded("x = 1 + 2 + 'c';"), "x='3c'");
}

#[test]
fn test_unary_folds() {
    assert_eq!(folded("x = typeof 1;"), "x='number'");
    assert_eq!(folded("x = !0;"), "x=!0");
    assert_eq!(folded("x = -(-3);"), "x=3");
    assert_eq!(folded("x = ~0;"), "x=-1");
    assert_eq!(folded("x = void 1;"), "x=void 0");
}

#[test]
fn test_constant_branches() {
    assert_eq!(folded("if (false) { f(); } else { g(); }"), "g()");
    assert_eq!(folded("if (1) f();"), "f()");
    assert_eq!(folded("x = 0 ? a : b;"), "x=b");
    assert_eq!(folded("x = 1 && a;"), "x=a");
    assert_eq!(folded("x = 0 || a;"), "x=a");
}

#[test]
fn test_unreachable_statements_dropped() {
    assert_eq!(folded("function f() { return 1; g(); }"), "function f(){return 1}");
    assert_eq!(folded("function f() { throw e; g(); h(); }"), "function f(){throw e}");
}

#[test]
fn test_unreachable_declarations_salvaged() {
    assert_eq!(
        folded("function f() { return g; var x = 1; function g() {} }"),
        "function f(){return g;function g(){}var x}"
    );
}

#[test]
fn test_side_effect_free_statements_dropped() {
    assert_eq!(folded("a(); 1; 'text'; b;"), "a()");
}

#[test]
fn test_instanceof_constant_is_an_error() {
    let options = CompileOptions::default();
    let error = compile("x = a instanceof 2;", &options).unwrap_err();
    assert!(error.is(ErrorKind::SemanticTypeError));
    let error = compile("x = 'k' in 'text';", &options).unwrap_err();
    assert!(error.is(ErrorKind::SemanticTypeError));
}

#[test]
fn test_folding_disabled() {
    let options = CompileOptions::default().with_fold(false).with_mangle(false);
    assert_eq!(compile("x = 1 + 2;", &options).unwrap().code, "x=1+2");
}

#[test]
fn test_sequence_keeps_last_value() {
    assert_eq!(folded("x = (a, b);"), "x=b");
    assert_eq!(folded("x = (1, 2, f());"), "x=f()");
    assert_eq!(folded("x = (0, f)();"), "x=f()");
}

#[test]
fn test_sequence_callee_keeps_this_unbound() {
    assert_eq!(folded("x = (0, o.m)();"), "x=(0,o.m)()");
    assert_eq!(folded("x = (1, 2, o.m)();"), "x=(0,o.m)()");
    assert_eq!(folded("x = (0, o.t)`a`;"), "x=(0,o.t)`a`");
}

#[test]
fn test_indirect_eval_stays_indirect() {
    assert_eq!(folded("x = (0, eval)(s);"), "x=(0,eval)(s)");
}

#[test]
fn test_unary_operand_keeps_sequence() {
    assert_eq!(folded("delete (0, o.p);"), "delete(0,o.p)");
    assert_eq!(folded("x = typeof (0, y);"), "x=typeof(0,y)");
    assert_eq!(folded("x = typeof (0, 5);"), "x='number'");
}
