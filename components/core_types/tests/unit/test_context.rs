//! Unit tests for the diagnostic Context

use core_types::{Context, ErrorKind, JsError};

fn lexical(message: &str) -> JsError {
    JsError::new(ErrorKind::LexicalError, message, None)
}

#[test]
fn test_strict_context_returns_errors() {
    let mut ctx = Context::default();
    assert!(!ctx.is_tolerant());
    let result = ctx.report_error(lexical("bad"));
    assert_eq!(result, Err(lexical("bad")));
    assert!(!ctx.has_errors());
}

#[test]
fn test_tolerant_context_collects_errors() {
    let mut ctx = Context::new(true);
    ctx.report_error(lexical("first")).unwrap();
    ctx.report_error(lexical("second")).unwrap();
    assert_eq!(ctx.errors().len(), 2);
    assert_eq!(ctx.last_error().map(|e| e.message.as_str()), Some("second"));
}

#[test]
fn test_warnings_always_recorded() {
    let mut ctx = Context::new(false);
    ctx.report_warning(JsError::new(ErrorKind::StrictModeViolation, "with", None));
    assert_eq!(ctx.warnings().len(), 1);
}

#[test]
fn test_rollback_and_take() {
    let mut ctx = Context::new(true);
    ctx.report_error(lexical("kept")).unwrap();
    let checkpoint = ctx.checkpoint();
    ctx.report_error(lexical("dropped")).unwrap();
    ctx.report_warning(lexical("dropped too"));
    ctx.rollback(checkpoint);

    let (errors, warnings) = ctx.take();
    assert_eq!(errors, vec![lexical("kept")]);
    assert!(warnings.is_empty());
    assert!(ctx.errors().is_empty());
}
