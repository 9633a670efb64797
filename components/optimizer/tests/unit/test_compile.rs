//! End-to-end behavior of `compile`

use core_types::ErrorKind;
use optimizer::{compile, print, CompileOptions};
use parser::{parse_script, Node, SourceType};

#[test]
fn test_compile_counts_work() {
    let output = compile(
        "function f(first) { var second = 2 * 3; return first + second; }",
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(output.code, "function f(_){var $;$=6;return _+$}");
    assert_eq!(output.stats.hoisted, 1);
    assert!(output.stats.folded >= 1);
    assert_eq!(output.stats.renamed, 2);
}

#[test]
fn test_automatic_semicolons() {
    let options = CompileOptions::default();
    assert_eq!(compile("x = 1\ny = 2", &options).unwrap().code, "x=1;y=2");
    assert_eq!(compile("a()\n++b", &options).unwrap().code, "a();++b");
    assert_eq!(
        compile("function f() { return\n1 }", &options).unwrap().code,
        "function f(){return}"
    );
}

#[test]
fn test_output_reparses_to_same_text() {
    let source = "var list = [1, 2, 3]; function sum(items) { var t = 0; for (var i = 0; i < items.length; i++) t += items[i]; return t; } log(sum(list));";
    let output = compile(source, &CompileOptions::default()).unwrap();
    let reparsed = parse_script(&output.code).unwrap();
    assert_eq!(print(&reparsed).unwrap(), output.code);
}

#[test]
fn test_compile_is_idempotent() {
    let source = "function g(a, b) { if (a) { return b * 2; } else { return 1 + 1; } }";
    let options = CompileOptions::default();
    let once = compile(source, &options).unwrap().code;
    let twice = compile(&once, &options).unwrap().code;
    assert_eq!(once, twice);
}

#[test]
fn test_strict_violations_downgraded_in_sloppy_code() {
    let output = compile("with (o) x = 1;", &CompileOptions::default()).unwrap();
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].is(ErrorKind::StrictModeViolation));
    assert!(output.errors.is_empty());
}

#[test]
fn test_strict_violation_is_fatal_in_strict_code() {
    let error = compile("'use strict'; with (o) x = 1;", &CompileOptions::default()).unwrap_err();
    assert!(error.is(ErrorKind::SyntaxError));
}

#[test]
fn test_tolerant_mode_collects_errors() {
    let source = "x = @1;";
    let error = compile(source, &CompileOptions::default()).unwrap_err();
    assert!(error.is(ErrorKind::LexicalError));

    let output = compile(source, &CompileOptions::default().with_tolerant(true)).unwrap();
    assert_eq!(output.code, "x=1");
    assert_eq!(output.errors.len(), 1);
}

#[test]
fn test_module_code() {
    let options = CompileOptions::default().with_source_type(SourceType::Module);
    let output = compile("import { a } from 'lib'; export default a * 2;", &options).unwrap();
    assert_eq!(output.code, "import{a}from'lib';export default a*2");

    let error = compile("var await = 1;", &options).unwrap_err();
    assert!(error.is(ErrorKind::SyntaxError));
}

#[test]
fn test_comments_retained_on_request() {
    let source = "/* keep */ x = 1;";
    let output = compile(source, &CompileOptions::default()).unwrap();
    assert!(output.comments.is_empty());

    let output = compile(source, &CompileOptions::default().with_retain_comments(true)).unwrap();
    assert_eq!(output.comments.len(), 1);
    assert_eq!(output.comments[0].text, " keep ");
}

#[test]
fn test_program_serializes() {
    let output = compile("x = 1;", &CompileOptions::default()).unwrap();
    let json = serde_json::to_string(&output.program).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(print(&back).unwrap(), "x=1");
}
