//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, SourceRange};

#[test]
fn test_error_display() {
    let error = JsError::new(ErrorKind::SyntaxError, "Unexpected token", Some(SourceRange::new(0, 1)));
    assert_eq!(error.to_string(), "SyntaxError: Unexpected token");
}

#[test]
fn test_every_kind_displays_its_name() {
    let kinds = [
        (ErrorKind::LexicalError, "LexicalError"),
        (ErrorKind::SyntaxError, "SyntaxError"),
        (ErrorKind::StrictModeViolation, "StrictModeViolation"),
        (ErrorKind::SemanticTypeError, "SemanticTypeError"),
        (ErrorKind::InternalError, "InternalError"),
    ];
    for (kind, name) in kinds {
        assert_eq!(kind.to_string(), name);
    }
}

#[test]
fn test_internal_error_has_no_range() {
    let error = JsError::internal("unknown node");
    assert!(error.is(ErrorKind::InternalError));
    assert_eq!(error.range, None);
}

#[test]
fn test_with_kind_keeps_message_and_range() {
    let range = SourceRange::new(3, 7);
    let error = JsError::new(ErrorKind::StrictModeViolation, "octal literal", Some(range))
        .with_kind(ErrorKind::SyntaxError);
    assert!(error.is(ErrorKind::SyntaxError));
    assert_eq!(error.message, "octal literal");
    assert_eq!(error.range, Some(range));
}

#[test]
fn test_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&JsError::internal("boom"));
}

#[test]
fn test_error_serde() {
    let error = JsError::new(ErrorKind::LexicalError, "bad", Some(SourceRange::at(2)));
    let json = serde_json::to_string(&error).unwrap();
    let back: JsError = serde_json::from_str(&json).unwrap();
    assert_eq!(back, error);
}
