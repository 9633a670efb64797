//! `jsmin` command line tool
//!
//! Argument parsing, error reporting and the read-compile-write driver
//! behind the `jsmin` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod driver;
pub mod error;

pub use cli::Cli;
pub use driver::{read_input, write_output, Driver, Report};
pub use error::{CliError, CliResult};
