//! Reads input, runs the compiler and writes the result
//!
//! The [`Driver`] owns the settings chosen on the command line. It keeps
//! I/O at the edges so the compile step can be tested on plain strings.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use core_types::LineMap;
use optimizer::{compile, CompileOptions, CompileOutput};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::CliResult;

/// Text produced for one input, plus diagnostics for standard error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Minified source or JSON syntax tree
    pub text: String,
    /// Rendered warnings and tolerated errors
    pub diagnostics: Vec<String>,
}

/// Compiles one input according to the command line
#[derive(Debug, Clone)]
pub struct Driver {
    options: CompileOptions,
    print_ast: bool,
}

impl Driver {
    /// Create a driver with the given compile settings
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            print_ast: false,
        }
    }

    /// Create a driver from parsed arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.options()).with_print_ast(cli.ast)
    }

    /// Emit the syntax tree as JSON instead of source text
    pub fn with_print_ast(mut self, enabled: bool) -> Self {
        self.print_ast = enabled;
        self
    }

    /// Check if JSON output is enabled
    pub fn is_print_ast_enabled(&self) -> bool {
        self.print_ast
    }

    /// Compile settings in use
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `source` into its output text
    pub fn process(&self, source: &str) -> CliResult<Report> {
        let output = compile(source, &self.options)?;
        debug!(
            hoisted = output.stats.hoisted,
            folded = output.stats.folded,
            renamed = output.stats.renamed,
            "compile statistics"
        );
        let diagnostics = diagnostics(source, &output);
        let text = if self.print_ast {
            serde_json::to_string_pretty(&output.program)?
        } else {
            output.code
        };
        Ok(Report { text, diagnostics })
    }
}

fn diagnostics(source: &str, output: &CompileOutput) -> Vec<String> {
    if output.errors.is_empty() && output.warnings.is_empty() {
        return Vec::new();
    }
    let lines = LineMap::new(source);
    output
        .errors
        .iter()
        .map(|error| lines.render(error))
        .chain(output.warnings.iter().map(|warning| format!("warning: {}", lines.render(warning))))
        .collect()
}

/// Read a file, or standard input when `path` is `None`
pub fn read_input(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading input");
            Ok(fs::read_to_string(path)?)
        }
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Write to a file, or to standard output followed by a newline
pub fn write_output(path: Option<&Path>, text: &str) -> CliResult<()> {
    match path {
        Some(path) => {
            fs::write(path, text)?;
            info!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
