//! JavaScript minifier
//!
//! Rewrites a parsed program into a shorter equivalent and prints it back as
//! compact source text.
//!
//! # Overview
//!
//! - [`HoistPass`] - Gathers `var` names and function declarations at the
//!   top of every body
//! - [`ConstantFold`] - Evaluates constant expressions and drops dead code
//! - [`MinifyPass`] - Renames locals and compacts statements
//! - [`Printer`] - Emits the shortest text with minimal parentheses
//! - [`Optimizer`] - Runs the passes in order
//! - [`compile`] - Parse, optimize and print in one call
//!
//! # Example
//!
//! ```
//! use optimizer::{compile, CompileOptions};
//!
//! let output = compile("var answer = 6 * 7;", &CompileOptions::default()).unwrap();
//! assert_eq!(output.code, "var answer;answer=42");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fold;
pub mod hoist;
pub mod minify;
pub mod optimizer;
pub mod printer;

pub use fold::ConstantFold;
pub use hoist::HoistPass;
pub use minify::{variable_name, MinifyPass};
pub use optimizer::{OptimizeStats, Optimizer};
pub use printer::{print, Printer};

use core_types::{Context, JsError};
use parser::{Comment, Node, Parser, SourceType};
use tracing::debug;

/// Settings for one [`compile`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Parse as a script or a module
    pub source_type: SourceType,
    /// Record recoverable errors instead of failing on the first one
    pub tolerant: bool,
    /// Run the hoisting pass
    pub hoist: bool,
    /// Run constant folding and dead code removal
    pub fold: bool,
    /// Rename local symbols
    pub mangle: bool,
    /// Keep comments found before the first token
    pub retain_comments: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            tolerant: false,
            hoist: true,
            fold: true,
            mangle: true,
            retain_comments: false,
        }
    }
}

impl CompileOptions {
    /// Parse as `source_type`
    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    /// Enable or disable tolerant parsing
    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    /// Enable or disable hoisting
    pub fn with_hoist(mut self, hoist: bool) -> Self {
        self.hoist = hoist;
        self
    }

    /// Enable or disable folding
    pub fn with_fold(mut self, fold: bool) -> Self {
        self.fold = fold;
        self
    }

    /// Enable or disable renaming
    pub fn with_mangle(mut self, mangle: bool) -> Self {
        self.mangle = mangle;
        self
    }

    /// Enable or disable comment retention
    pub fn with_retain_comments(mut self, retain: bool) -> Self {
        self.retain_comments = retain;
        self
    }

    fn optimizer(&self) -> Optimizer {
        Optimizer::new()
            .with_hoist(self.hoist)
            .with_fold(self.fold)
            .with_mangle(self.mangle)
    }
}

/// Result of [`compile`]
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Minified source text
    pub code: String,
    /// Optimized syntax tree
    pub program: Node,
    /// Strict-mode downgrades and other non-fatal findings
    pub warnings: Vec<JsError>,
    /// Errors recorded in tolerant mode
    pub errors: Vec<JsError>,
    /// Retained comments
    pub comments: Vec<Comment>,
    /// Pass counters
    pub stats: OptimizeStats,
}

/// Parse, optimize and print `source`
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput, JsError> {
    let mut parser = Parser::new(source)
        .with_source_type(options.source_type)
        .with_context(Context::new(options.tolerant))
        .with_comments(options.retain_comments);
    let mut program = parser.parse()?;
    let comments = parser.comments().to_vec();
    let (errors, warnings) = parser.into_context().take();

    let stats = options.optimizer().optimize(&mut program)?;
    let code = print(&program)?;
    debug!(
        input = source.len(),
        output = code.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "compiled"
    );

    Ok(CompileOutput {
        code,
        program,
        warnings,
        errors,
        comments,
        stats,
    })
}
