//! Printer behavior on unoptimized trees

use optimizer::printer::{glue, quote, Precedence};
use optimizer::{print, Printer};
use parser::{parse_module, parse_script, Node, NodeKind};

fn reprint(source: &str) -> String {
    print(&parse_script(source).unwrap()).unwrap()
}

fn first_expression(source: &str) -> Node {
    let program = parse_script(source).unwrap();
    let NodeKind::Program { mut body, .. } = program.kind else {
        panic!("expected program");
    };
    match body.remove(0).kind {
        NodeKind::Expression { expression } => *expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_minimal_parentheses() {
    assert_eq!(reprint("x = ((a)) + (b * c);"), "x=a+b*c");
    assert_eq!(reprint("x = (a + b) * c;"), "x=(a+b)*c");
    assert_eq!(reprint("x = a * (b * c);"), "x=a*(b*c)");
    assert_eq!(reprint("x = (a = b);"), "x=a=b");
    assert_eq!(reprint("x = !(a && b);"), "x=!(a&&b)");
    assert_eq!(reprint("x = (-a).b;"), "x=(-a).b");
}

#[test]
fn test_expression_in_tight_slot() {
    let node = first_expression("a + b;");
    let mut printer = Printer::new();
    assert_eq!(printer.expression_at(&node, Precedence::Expression, false).unwrap(), "a+b");
    assert_eq!(printer.expression_at(&node, Precedence::Multiplicative, false).unwrap(), "(a+b)");
    assert_eq!(printer.expression_at(&node, Precedence::Additive, true).unwrap(), "(a+b)");
}

#[test]
fn test_glue_separates_tokens() {
    let mut out = String::from("return");
    glue(&mut out, "value");
    assert_eq!(out, "return value");
    glue(&mut out, ";");
    assert_eq!(out, "return value;");

    let mut out = String::from("a+");
    glue(&mut out, "+b");
    assert_eq!(out, "a+ +b");
}

#[test]
fn test_shorter_quote_wins() {
    assert_eq!(quote("plain"), "'plain'");
    assert_eq!(quote("it's"), "\"it's\"");
    assert_eq!(quote("\"'"), "'\"\\''");
}

#[test]
fn test_blocks_drop_final_semicolon() {
    assert_eq!(reprint("{ a(); b(); }"), "{a();b()}");
    assert_eq!(reprint("function f() { a(); }"), "function f(){a()}");
    assert_eq!(reprint("a(); b();"), "a();b()");
}

#[test]
fn test_regexp_and_templates() {
    assert_eq!(reprint("x = /[a-z]+/g.test(s);"), "x=/[a-z]+/g.test(s)");
    assert_eq!(reprint("x = tag`a${b}`;"), "x=tag`a${b}`");
}

#[test]
fn test_module_exports() {
    let program = parse_module("export default function () {} export { a as b } from 'm';").unwrap();
    assert_eq!(print(&program).unwrap(), "export default function(){}export{a as b}from'm'");
}

#[test]
fn test_shorthand_follows_names() {
    assert_eq!(reprint("x = { a, b: c, d: d };"), "x={a,b:c,d}");
    let code = optimizer::compile("function f(a) { return { a }; }", &Default::default())
        .unwrap()
        .code;
    assert_eq!(code, "function f(_){return{a:_}}");
}
