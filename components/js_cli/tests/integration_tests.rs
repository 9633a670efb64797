//! Integration tests for the complete CLI workflow
//!
//! These tests run the built `jsmin` binary end to end

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn jsmin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jsmin"))
}

/// Test minifying a file to standard output
#[test]
fn integration_file_to_stdout() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("test.js");
    fs::write(&file_path, "var answer = 6 * 7;\n").unwrap();

    let output = jsmin().arg(&file_path).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "var answer;answer=42\n");
}

/// Test minifying standard input
#[test]
fn integration_stdin() {
    let mut child = jsmin()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"if (a) { b(); }")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a&&b()\n");
}

/// Test writing to an output file
#[test]
fn integration_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.js");
    let out = dir.path().join("out.js");
    fs::write(&input, "function f(value) { return value; }").unwrap();

    let status = jsmin().arg(&input).arg("-o").arg(&out).status().unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(&out).unwrap(), "function f(_){return _}");
}

/// Test the JSON syntax tree output
#[test]
fn integration_ast_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.js");
    fs::write(&input, "x = 1;").unwrap();

    let output = jsmin().arg(&input).arg("--ast").output().unwrap();

    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(tree.is_object());
}

/// Test that syntax errors exit with failure and a rendered diagnostic
#[test]
fn integration_syntax_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.js");
    fs::write(&input, "var = 1;").unwrap();

    let output = jsmin().arg(&input).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Line 1:5-6"));
    assert!(stderr.contains("var = 1;"));
}

/// Test that a missing input file is reported
#[test]
fn integration_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = jsmin().arg(dir.path().join("nope.js")).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
}
