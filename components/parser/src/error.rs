//! Error constructors shared by the lexer and parser

use core_types::{ErrorKind, JsError, SourceRange};

/// Create a syntax error at a given range
pub fn syntax_error(message: impl Into<String>, range: SourceRange) -> JsError {
    JsError::new(ErrorKind::SyntaxError, message, Some(range))
}

/// Create a lexical error at a given range
pub fn lexical_error(message: impl Into<String>, range: SourceRange) -> JsError {
    JsError::new(ErrorKind::LexicalError, message, Some(range))
}

/// Create a strict-mode violation; the parser decides whether it is fatal
pub fn strict_violation(message: impl Into<String>, range: SourceRange) -> JsError {
    JsError::new(ErrorKind::StrictModeViolation, message, Some(range))
}

/// Create an unexpected token error
pub fn unexpected_token(expected: &str, got: &str, range: SourceRange) -> JsError {
    syntax_error(format!("Expected {}, got {}", expected, got), range)
}

/// Create an unexpected end of input error
pub fn unexpected_eof(range: SourceRange) -> JsError {
    syntax_error("Unexpected end of input", range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error() {
        let err = syntax_error("test", SourceRange::new(0, 1));
        assert!(matches!(err.kind, ErrorKind::SyntaxError));
        assert_eq!(err.range, Some(SourceRange::new(0, 1)));
    }

    #[test]
    fn test_unexpected_token() {
        let err = unexpected_token("identifier", "number", SourceRange::at(3));
        assert!(err.message.contains("Expected identifier"));
    }

    #[test]
    fn test_strict_violation_kind() {
        let err = strict_violation("octal", SourceRange::at(0));
        assert!(err.is(ErrorKind::StrictModeViolation));
    }
}
