//! Diagnostic sink shared by the lexer and parser.

use crate::JsError;

/// Collects errors and warnings for one compilation.
///
/// In the default mode [`Context::report_error`] hands the error straight
/// back so the caller can abort with `?`. A tolerant context records the
/// error and lets scanning continue past it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    tolerant: bool,
    errors: Vec<JsError>,
    warnings: Vec<JsError>,
}

impl Context {
    /// Create a context, tolerant or not
    pub fn new(tolerant: bool) -> Self {
        Self {
            tolerant,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether errors are collected instead of returned
    pub fn is_tolerant(&self) -> bool {
        self.tolerant
    }

    /// Report an error.
    ///
    /// Returns `Err(error)` unless the context is tolerant.
    pub fn report_error(&mut self, error: JsError) -> Result<(), JsError> {
        if self.tolerant {
            self.errors.push(error);
            Ok(())
        } else {
            Err(error)
        }
    }

    /// Record a warning; never fails
    pub fn report_warning(&mut self, warning: JsError) {
        self.warnings.push(warning);
    }

    /// Errors recorded in tolerant mode
    pub fn errors(&self) -> &[JsError] {
        &self.errors
    }

    /// Warnings recorded so far
    pub fn warnings(&self) -> &[JsError] {
        &self.warnings
    }

    /// Most recent recorded error
    pub fn last_error(&self) -> Option<&JsError> {
        self.errors.last()
    }

    /// True if any error was recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Snapshot of how many diagnostics have been recorded
    pub fn checkpoint(&self) -> (usize, usize) {
        (self.errors.len(), self.warnings.len())
    }

    /// Drop diagnostics recorded after a [`Context::checkpoint`]
    pub fn rollback(&mut self, checkpoint: (usize, usize)) {
        self.errors.truncate(checkpoint.0);
        self.warnings.truncate(checkpoint.1);
    }

    /// Move the collected diagnostics out, leaving the context empty
    pub fn take(&mut self) -> (Vec<JsError>, Vec<JsError>) {
        (
            std::mem::take(&mut self.errors),
            std::mem::take(&mut self.warnings),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn lexical() -> JsError {
        JsError::new(ErrorKind::LexicalError, "illegal character", None)
    }

    #[test]
    fn test_strict_context_returns_error() {
        let mut ctx = Context::new(false);
        assert!(ctx.report_error(lexical()).is_err());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_tolerant_context_collects() {
        let mut ctx = Context::new(true);
        ctx.report_error(lexical()).unwrap();
        ctx.report_error(lexical()).unwrap();
        assert_eq!(ctx.errors().len(), 2);
        assert!(ctx.last_error().is_some());
    }

    #[test]
    fn test_warnings_always_recorded() {
        let mut ctx = Context::new(false);
        ctx.report_warning(JsError::new(ErrorKind::StrictModeViolation, "octal", None));
        assert_eq!(ctx.warnings().len(), 1);
        let (errors, warnings) = ctx.take();
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_rollback_discards_later_diagnostics() {
        let mut ctx = Context::new(true);
        ctx.report_warning(JsError::new(ErrorKind::StrictModeViolation, "first", None));
        let mark = ctx.checkpoint();
        ctx.report_warning(JsError::new(ErrorKind::StrictModeViolation, "second", None));
        ctx.report_error(lexical()).unwrap();
        ctx.rollback(mark);
        assert_eq!(ctx.warnings().len(), 1);
        assert!(!ctx.has_errors());
    }
}
