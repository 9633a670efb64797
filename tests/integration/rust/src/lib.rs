//! Integration test suite for the JavaScript minifier
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

use optimizer::{compile, CompileOptions};

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use js_cli;
    pub use optimizer;
    pub use parser;
}

/// Minify `source` as a script with every pass enabled
pub fn minify(source: &str) -> String {
    match compile(source, &CompileOptions::default()) {
        Ok(output) => output.code,
        Err(e) => panic!("compile failed for {:?}: {}", source, e),
    }
}
