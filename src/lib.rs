//! Core library entry for the `firehose` CLI.
//!
//! A firehose config names an upstream repository to track and the chunk
//! spec of a stratum morphology that should follow it. A landing run picks
//! the best upstream ref for every config and rewrites the morphologies of
//! the landing branch to point at it.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod landing;
pub mod morph;
pub mod ports;
pub mod reconcile;
pub mod report;
pub mod select;
pub mod store;
pub mod tracking;
pub mod version;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an explicit log filter.
pub const LOG_ENV: &str = "FIREHOSE_LOG";

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    init_tracing(cli.global.verbose);
    commands::dispatch(&cli)
}

/// Installs the stderr log subscriber; later calls are no-ops.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_without_subcommand() {
        assert!(run(["firehose"]).is_err());
    }

    #[test]
    fn check_without_configs_is_rejected() {
        let err = run(["firehose", "check"]).unwrap_err();
        assert_eq!(err, "expected at least one firehose config");
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        assert!(run(["firehose", "unknown"]).is_err());
    }
}
