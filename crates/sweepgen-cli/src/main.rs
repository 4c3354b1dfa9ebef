use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    count::{self, CountArgs},
    expand::{self, ExpandArgs},
    validate::{self, ValidateArgs},
    version::{self, VersionArgs},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "sweepgen", about = "Expand experiment descriptions into scenario documents")]
struct Cli {
    /// Log debug detail to stderr (otherwise RUST_LOG or warnings only).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every scenario document of an experiment.
    Expand(ExpandArgs),
    /// Print how many scenarios an experiment produces.
    Count(CountArgs),
    /// Check sweep references and substitution keys without expanding.
    Validate(ValidateArgs),
    /// Print version information.
    Version(VersionArgs),
}

/// `--verbose` forces debug; otherwise `RUST_LOG` applies, falling back to warn
/// when it is unset or unparseable.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new(Level::DEBUG.as_str());
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(Level::WARN.as_str()))
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Expand(args) => expand::run(&args),
        Command::Count(args) => count::run(&args),
        Command::Validate(args) => validate::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
