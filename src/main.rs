//! Branch-clean: delete stale git branches and tags.
//!
//! This is the main entry point for the `branch-clean` CLI. It parses
//! arguments, sets up logging, runs the clean command, and maps errors to
//! exit codes.

mod cli;
mod commands;
mod config;
mod deletion;
mod error;
mod exit_codes;
mod git;
mod protection;
mod refs;
mod stats;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    match commands::cmd_clean(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Logs go to stderr so they never mix with the report on stdout.
/// `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        "info,branch_clean=debug"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
