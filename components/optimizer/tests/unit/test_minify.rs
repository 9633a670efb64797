//! Renaming and statement compaction through the public API

use optimizer::{compile, variable_name, CompileOptions};

fn minified(source: &str) -> String {
    compile(source, &CompileOptions::default()).unwrap().code
}

#[test]
fn test_generated_names() {
    let names: Vec<String> = (0..4).map(variable_name).collect();
    assert_eq!(names, vec!["_", "$", "a", "b"]);
    assert_eq!(variable_name(53), "Z");
    assert_eq!(variable_name(54), "_$");
}

#[test]
fn test_nested_functions_renamed() {
    assert_eq!(
        minified("function outer(a) { function inner(b) { return a + b; } return inner; }"),
        "function outer(_){function $(a){return _+a}return $}"
    );
}

#[test]
fn test_globals_keep_their_names() {
    assert_eq!(minified("var total; total = compute();"), "var total;total=compute()");
}

#[test]
fn test_names_avoid_free_references() {
    assert_eq!(
        minified("function f(x) { return _ + x; }"),
        "function f($){return _+$}"
    );
}

#[test]
fn test_eval_keeps_names() {
    assert_eq!(
        minified("function f(a) { eval('a'); return a; }"),
        "function f(a){eval('a');return a}"
    );
}

#[test]
fn test_mangle_disabled() {
    let options = CompileOptions::default().with_mangle(false);
    assert_eq!(
        compile("function f(value) { return value; }", &options).unwrap().code,
        "function f(value){return value}"
    );
}

#[test]
fn test_if_statements_become_expressions() {
    assert_eq!(minified("if (a) b();"), "a&&b()");
    assert_eq!(minified("if (a) { b(); } else { c(); }"), "a?b():c()");
}

#[test]
fn test_if_with_statement_branch_kept() {
    assert_eq!(minified("if (a) { throw e; }"), "if(a)throw e");
}

#[test]
fn test_empty_statements_removed() {
    assert_eq!(minified(";;a();;;b();"), "a();b()");
}
