//! `jsmin` entry point
//!
//! Parses arguments, installs logging and runs the driver on one input.

use clap::Parser as ClapParser;
use js_cli::{read_input, write_output, Cli, CliResult, Driver};
use tracing_subscriber::EnvFilter;

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, source: &str) -> CliResult<()> {
    let report = Driver::from_cli(cli).process(source)?;
    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic);
    }
    write_output(cli.output.as_deref(), &report.text)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let source = match read_input(cli.input.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&cli, &source) {
        eprintln!("{}", e.render(&source));
        std::process::exit(1);
    }
}
