//! Error types for the CLI

use core_types::{JsError, LineMap};
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Parse or optimization failure
    #[error("{0}")]
    Js(#[from] JsError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Syntax tree serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Human-readable message; source errors point into `source`
    pub fn render(&self, source: &str) -> String {
        match self {
            CliError::Js(error) => LineMap::new(source).render(error),
            other => other.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ErrorKind, SourceRange};

    #[test]
    fn test_js_error_rendered_against_source() {
        let error = CliError::from(JsError::new(
            ErrorKind::SyntaxError,
            "Unexpected token",
            Some(SourceRange::new(4, 5)),
        ));
        let rendered = error.render("var = 1;");
        assert!(rendered.starts_with("Line 1:5-6: SyntaxError: Unexpected token"));
        assert!(rendered.ends_with("    ^"));
    }

    #[test]
    fn test_io_error_display() {
        let error = CliError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(error.render(""), "File error: missing");
    }
}
