//! Command dispatch and handlers.

pub mod check;
pub mod land;

use std::path::PathBuf;

use crate::cli::{Cli, Command};
use crate::config::TrackingConfig;
use crate::context::ServiceContext;
use crate::error::{FirehoseError, Result};
use crate::ports::filesystem::FileSystem;

/// Dispatch a parsed command to its handler using live adapters.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli) -> std::result::Result<(), String> {
    let ctx = ServiceContext::live();
    match &cli.command {
        Command::Land(args) => land::run(&ctx, &cli.global, args),
        Command::Check { configs } => check::run(&ctx, configs),
    }
}

/// Loads every config named on the command line, in order.
///
/// # Errors
///
/// Returns [`FirehoseError::EmptyBatch`] when no paths were given, or the
/// first load error.
pub fn load_batch(fs: &dyn FileSystem, paths: &[PathBuf]) -> Result<Vec<TrackingConfig>> {
    if paths.is_empty() {
        return Err(FirehoseError::EmptyBatch);
    }
    paths.iter().map(|path| TrackingConfig::load(fs, path)).collect()
}
