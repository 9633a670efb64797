//! End-to-End CLI Integration Tests
//!
//! Tests the minifier through the js_cli Driver API: file in, text out.
//! This is the highest level integration test short of spawning the binary.

use std::fs;

use js_cli::{read_input, write_output, Cli, CliError, Driver};
use tempfile::TempDir;

/// Test: minify a file into another file
#[test]
fn test_e2e_file_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("app.js");
    let output = dir.path().join("app.min.js");
    fs::write(
        &input,
        "// entry point\nfunction greet(name) {\n  var message = 'Hello, ' + name;\n  return message;\n}\ngreet('world');\n",
    )
    .unwrap();

    let args = Cli::with_input(&input);
    let source = read_input(args.input.as_deref()).unwrap();
    let report = Driver::from_cli(&args).process(&source).unwrap();
    write_output(Some(&output), &report.text).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "function greet(_){var $;$='Hello, '+_;return $}greet('world')"
    );
}

/// Test: module input through the driver
#[test]
fn test_e2e_module() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("lib.mjs");
    fs::write(&input, "export function twice(n) { return n * 2; }").unwrap();

    let mut args = Cli::with_input(&input);
    args.module = true;
    let source = read_input(args.input.as_deref()).unwrap();
    let report = Driver::from_cli(&args).process(&source).unwrap();

    assert_eq!(report.text, "export function twice(_){return _*2}");
}

/// Test: JSON tree output parses as JSON
#[test]
fn test_e2e_ast_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tree.js");
    fs::write(&input, "a = 1 + 1;").unwrap();

    let mut args = Cli::with_input(&input);
    args.ast = true;
    let source = read_input(args.input.as_deref()).unwrap();
    let report = Driver::from_cli(&args).process(&source).unwrap();

    let tree: serde_json::Value = serde_json::from_str(&report.text).unwrap();
    assert!(tree.is_object());
    assert!(report.text.contains("Program"));
}

/// Test: tolerant mode reports the bad character and still produces output
#[test]
fn test_e2e_tolerant() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("noisy.js");
    fs::write(&input, "x = @2;").unwrap();

    let mut args = Cli::with_input(&input);
    let source = read_input(args.input.as_deref()).unwrap();
    assert!(matches!(Driver::from_cli(&args).process(&source), Err(CliError::Js(_))));

    args.tolerant = true;
    let report = Driver::from_cli(&args).process(&source).unwrap();
    assert_eq!(report.text, "x=2");
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].contains("LexicalError"));
}
