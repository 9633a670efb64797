//! Compilation error types.
//!
//! Every stage of the pipeline reports failures through [`JsError`], tagged
//! with an [`ErrorKind`] and, where known, the offending source range.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SourceRange;

/// The kind of compilation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed literal, illegal character or unterminated construct
    LexicalError,
    /// Token or production mismatch during parsing
    SyntaxError,
    /// Construct that is legal in sloppy mode but forbidden in strict mode
    StrictModeViolation,
    /// Constant folding of an operator that cannot be evaluated statically
    SemanticTypeError,
    /// Broken invariant inside the toolchain itself
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::LexicalError => "LexicalError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::StrictModeViolation => "StrictModeViolation",
            ErrorKind::SemanticTypeError => "SemanticTypeError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// A compilation error with message and source range.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, SourceRange};
///
/// let error = JsError::new(
///     ErrorKind::SyntaxError,
///     "Unexpected token",
///     Some(SourceRange::new(4, 5)),
/// );
///
/// assert_eq!(error.to_string(), "SyntaxError: Unexpected token");
/// assert!(error.is(ErrorKind::SyntaxError));
/// ```
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source range where the error occurred
    pub range: Option<SourceRange>,
}

impl JsError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>, range: Option<SourceRange>) -> Self {
        Self {
            kind,
            message: message.into(),
            range,
        }
    }

    /// Internal error without a source range
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message, None)
    }

    /// Check the error kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Re-tag the error with a different kind, keeping message and range
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }
}
