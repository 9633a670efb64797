//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use optimizer::CompileOptions;
use parser::SourceType;

/// Minify JavaScript source
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "jsmin", version, about = "Minify JavaScript source")]
pub struct Cli {
    /// Input file; standard input when omitted
    pub input: Option<PathBuf>,

    /// Write the result to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Parse the input as an ES module
    #[arg(long)]
    pub module: bool,

    /// Report recoverable errors and keep going
    #[arg(long)]
    pub tolerant: bool,

    /// Skip declaration hoisting
    #[arg(long)]
    pub no_hoist: bool,

    /// Skip constant folding and dead code removal
    #[arg(long)]
    pub no_fold: bool,

    /// Keep local names
    #[arg(long)]
    pub no_mangle: bool,

    /// Print the optimized syntax tree as JSON
    #[arg(long)]
    pub ast: bool,

    /// Log pass statistics to standard error
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments for minifying `path` with default settings
    pub fn with_input(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Some(path.into()),
            ..Self::default()
        }
    }

    /// Compile settings selected by the flags
    pub fn options(&self) -> CompileOptions {
        let source_type = if self.module {
            SourceType::Module
        } else {
            SourceType::Script
        };
        CompileOptions::default()
            .with_source_type(source_type)
            .with_tolerant(self.tolerant)
            .with_hoist(!self.no_hoist)
            .with_fold(!self.no_fold)
            .with_mangle(!self.no_mangle)
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
