//! `firehose check` command.

use std::path::PathBuf;

use super::load_batch;
use crate::config::{Landing, TrackingConfig};
use crate::context::ServiceContext;
use crate::error::Result;
use crate::landing::validate_batch;
use crate::tracking::TrackingPolicy;

/// Execute the `check` command.
///
/// Prints the shared landing target and one line per config.
///
/// # Errors
///
/// Returns an error string if a config cannot be loaded, the batch is
/// inconsistent, or a tracking policy is invalid.
pub fn run(ctx: &ServiceContext, configs: &[PathBuf]) -> std::result::Result<(), String> {
    let (landing, batch) = execute(ctx, configs).map_err(|e| e.to_string())?;

    println!("Landing {} ({} from {})", landing.repo, landing.myref, landing.baseref);
    for config in &batch {
        // Already validated by `execute`.
        let stratum = config.landing_stratum().unwrap_or_default();
        let chunk = config.landing_chunk().unwrap_or_default();
        let mode = config.tracking_mode().unwrap_or_default();
        println!("  {stratum}:{chunk}  {mode}  {}", config.source_name());
    }
    println!("\n{} config(s) OK.", batch.len());
    Ok(())
}

/// Loads and validates a batch without touching any repository.
///
/// # Errors
///
/// Returns the first load, consistency or policy error.
pub fn execute(ctx: &ServiceContext, configs: &[PathBuf]) -> Result<(Landing, Vec<TrackingConfig>)> {
    let batch = load_batch(ctx.fs.as_ref(), configs)?;
    let landing = validate_batch(&batch)?;
    for config in &batch {
        TrackingPolicy::from_config(config)?;
    }
    Ok((landing, batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::clock::LiveClock;
    use crate::adapters::live::command::LiveCommandRunner;
    use crate::error::FirehoseError;
    use crate::store::tests::MemFs;

    fn config(chunk: &str, tracking: &str) -> String {
        format!(
            "kind: firehose\nlanding:\n  repo: r\n  baseref: master\n  myref: fh\n  stratum: core\n  chunk: {chunk}\ntracking:\n{tracking}"
        )
    }

    fn context(fs: MemFs) -> ServiceContext {
        ServiceContext { clock: Box::new(LiveClock), fs: Box::new(fs), commands: Box::new(LiveCommandRunner) }
    }

    #[test]
    fn valid_batch_reports_landing() {
        let fs = MemFs::default()
            .with("/c/a.yaml", &config("a", "  mode: follow-tip\n  ref: refs/heads/master\n"))
            .with("/c/b.yaml", &config("b", "  mode: refs\n  filters: ['refs/tags/']\n  transforms: []\n"));
        let ctx = context(fs);

        let (landing, batch) =
            execute(&ctx, &[PathBuf::from("/c/a.yaml"), PathBuf::from("/c/b.yaml")]).unwrap();
        assert_eq!(landing.myref, "fh");
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn bad_policy_is_reported() {
        let fs = MemFs::default().with("/c/a.yaml", &config("a", "  mode: refs\n"));
        let ctx = context(fs);

        let err = execute(&ctx, &[PathBuf::from("/c/a.yaml")]).unwrap_err();
        assert!(matches!(err, FirehoseError::ConfigPath { ref path, .. } if path == "tracking.filters"));
    }
}
