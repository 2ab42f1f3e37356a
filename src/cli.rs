//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `firehose`.
#[derive(Debug, Parser)]
#[command(name = "firehose", version, about = "Land upstream refs into build morphologies")]
pub struct Cli {
    /// Settings shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Run settings, each with an environment fallback.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Directory holding the landing checkout.
    #[arg(long, global = true, env = "FIREHOSE_WORKSPACE", default_value = "firehose-ws")]
    pub workspace: PathBuf,

    /// Directory for source repository mirrors [default: <WORKSPACE>/.gits].
    #[arg(long, global = true, env = "FIREHOSE_CACHE")]
    pub cache_dir: Option<PathBuf>,

    /// Repository alias, e.g. `upstream=git://git.baserock.org/delta/%s`.
    #[arg(
        long = "repo-alias",
        value_name = "PREFIX=URL",
        global = true,
        env = "FIREHOSE_REPO_ALIASES",
        value_delimiter = ','
    )]
    pub repo_aliases: Vec<String>,

    /// Log at debug level (`FIREHOSE_LOG` takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Mirror cache directory, defaulting to `<workspace>/.gits`.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| self.workspace.join(".gits"))
    }
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select refs for every config and update the landing morphologies.
    Land(LandArgs),
    /// Validate configs without touching any repository.
    Check {
        /// Firehose config files.
        #[arg(value_name = "CONFIG")]
        configs: Vec<PathBuf>,
    },
}

/// Arguments of `firehose land`.
#[derive(Debug, Args)]
pub struct LandArgs {
    /// Firehose config files.
    #[arg(value_name = "CONFIG")]
    pub configs: Vec<PathBuf>,

    /// Apply updates in memory and report without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Commit the updated morphologies on the landing branch.
    #[arg(long, conflicts_with = "dry_run")]
    pub commit: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}
