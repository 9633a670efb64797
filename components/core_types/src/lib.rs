//! Shared vocabulary for the front-end toolchain.
//!
//! This crate provides the types every stage of the pipeline agrees on:
//! source ranges and line mapping, the error type, the diagnostic context,
//! and the compile-time constant value model used by constant folding.
//!
//! # Overview
//!
//! - [`SourceRange`] - Half-open character range into the source text
//! - [`LineMap`] - Offset to line/column mapping for diagnostics
//! - [`JsError`] - Compilation error with kind, message and range
//! - [`Context`] - Error/warning sink with an optional tolerant mode
//! - [`Value`] - Primitive constant with the language's coercion rules
//!
//! # Examples
//!
//! ```
//! use core_types::{Context, ErrorKind, JsError, SourceRange, Value};
//!
//! let sum = Value::Number(1.0).add(&Value::String("a".to_string()));
//! assert_eq!(sum, Value::String("1a".to_string()));
//!
//! let mut ctx = Context::new(true);
//! let err = JsError::new(ErrorKind::LexicalError, "bad", Some(SourceRange::new(0, 1)));
//! assert!(ctx.report_error(err).is_ok());
//! assert_eq!(ctx.errors().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod context;
mod error;
mod source;
mod value;

pub use context::Context;
pub use error::{ErrorKind, JsError};
pub use source::{LineMap, SourcePosition, SourceRange};
pub use value::{number_to_string, Value};
