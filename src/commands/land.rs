//! `firehose land` command.

use std::fmt::Write as _;

use tracing::info;

use super::load_batch;
use crate::adapters::live::{GitLandingWorkspace, GitRefCatalog};
use crate::cli::{GlobalArgs, LandArgs};
use crate::config::RepoAliases;
use crate::context::ServiceContext;
use crate::error::{FirehoseError, Result};
use crate::landing::validate_batch;
use crate::morph::MorphologySet;
use crate::ports::{LandingWorkspace, RefCatalog};
use crate::reconcile::{apply_batch, AppliedUpdate};
use crate::report::LandingReport;
use crate::store::FileMorphologyStore;

/// Result of a landing run.
#[derive(Debug)]
pub struct LandOutcome {
    /// The landing report.
    pub report: LandingReport,
    /// `git diff` of the checkout when morphologies were rewritten.
    pub diff: Option<String>,
}

/// Execute the `land` command with live adapters and print its report.
///
/// # Errors
///
/// Returns an error string if any stage of the run fails.
pub fn run(ctx: &ServiceContext, global: &GlobalArgs, args: &LandArgs) -> std::result::Result<(), String> {
    let aliases = RepoAliases::from_entries(&global.repo_aliases)?;
    let catalog = GitRefCatalog::new(
        ctx.commands.as_ref(),
        ctx.fs.as_ref(),
        &global.cache_dir(),
        aliases.clone(),
    );
    let workspace =
        GitLandingWorkspace::new(ctx.commands.as_ref(), ctx.fs.as_ref(), &global.workspace, aliases);

    let outcome = execute(ctx, &catalog, &workspace, args).map_err(|e| e.to_string())?;

    if args.json {
        let json = outcome.report.to_json().map_err(|e| format!("Failed to serialize report: {e}"))?;
        println!("{json}");
        return Ok(());
    }
    print!("{}", outcome.report.render_table());
    if let Some(diff) = outcome.diff.filter(|d| !d.is_empty()) {
        println!("\n{diff}");
    }
    Ok(())
}

/// Runs a landing against the given catalog and workspace.
///
/// Configs are loaded and validated before the workspace is touched. With
/// `--dry-run` the updates are applied in memory only; with `--commit` a
/// run that changed anything ends with a commit on the landing branch.
///
/// # Errors
///
/// Returns the first error of any stage.
pub fn execute(
    ctx: &ServiceContext,
    catalog: &dyn RefCatalog,
    workspace: &dyn LandingWorkspace,
    args: &LandArgs,
) -> Result<LandOutcome> {
    let batch = load_batch(ctx.fs.as_ref(), &args.configs)?;
    let landing = validate_batch(&batch)?;

    let checkout = workspace
        .prepare(&landing)
        .map_err(|source| FirehoseError::Workspace { context: "prepare checkout".into(), source })?;
    let store = FileMorphologyStore::new(ctx.fs.as_ref(), &checkout, landing.repo.clone());
    let mut graph = MorphologySet::load(&store)?;

    let updates = apply_batch(&batch, catalog, &mut graph)?;
    let changed = if args.dry_run { graph.has_changes() } else { graph.flush(&store)? };

    let diff = if changed && !args.dry_run {
        let diff = workspace
            .diff(&checkout)
            .map_err(|source| FirehoseError::Workspace { context: "diff checkout".into(), source })?;
        if args.commit {
            workspace
                .commit(&checkout, &commit_message(&updates))
                .map_err(|source| FirehoseError::Workspace { context: "commit".into(), source })?;
            info!(branch = %landing.myref, "committed landing");
        }
        Some(diff)
    } else {
        None
    };

    Ok(LandOutcome {
        report: LandingReport { generated_at: ctx.clock.now(), landing, changed, updates },
        diff,
    })
}

fn commit_message(updates: &[AppliedUpdate]) -> String {
    let mut message = String::from("Update firehose refs\n\n");
    for update in updates {
        let _ = writeln!(
            message,
            "{}:{} -> {} ({})",
            update.stratum, update.chunk, update.selection.display_name, update.selection.commit
        );
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::clock::FixedClock;
    use crate::adapters::live::command::LiveCommandRunner;
    use crate::config::Landing;
    use crate::ports::RefCandidate;
    use crate::store::tests::MemFs;
    use chrono::{TimeZone, Utc};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    const CONFIG: &str = "\
kind: firehose
landing:
  repo: baserock:definitions
  baseref: master
  myref: firehose/all
  stratum: core
  chunk: linux
tracking:
  mode: follow-tip
  ref: refs/heads/master
";

    const CORE: &str = "name: core\nkind: stratum\nchunks:\n- name: linux\n  repo: upstream:linux\n  ref: old\n";

    struct OneRepo;

    impl RefCatalog for OneRepo {
        fn list_refs(
            &self,
            _repo: &str,
        ) -> std::result::Result<Vec<RefCandidate>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(vec![RefCandidate::new("refs/heads/master", "new")])
        }
    }

    #[derive(Default)]
    struct FakeWorkspace {
        prepared: Mutex<Vec<Landing>>,
        commits: Mutex<Vec<String>>,
    }

    impl LandingWorkspace for FakeWorkspace {
        fn prepare(
            &self,
            landing: &Landing,
        ) -> std::result::Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
            self.prepared.lock().unwrap().push(landing.clone());
            Ok(PathBuf::from("/ws/defs"))
        }

        fn diff(&self, _checkout: &Path) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok("-  ref: old\n+  ref: new\n".to_string())
        }

        fn commit(
            &self,
            _checkout: &Path,
            message: &str,
        ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.commits.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    fn context(fs: MemFs) -> ServiceContext {
        ServiceContext {
            clock: Box::new(FixedClock(Utc.with_ymd_and_hms(2014, 8, 1, 0, 0, 0).unwrap())),
            fs: Box::new(fs),
            commands: Box::new(LiveCommandRunner),
        }
    }

    fn args(dry_run: bool, commit: bool) -> LandArgs {
        LandArgs { configs: vec![PathBuf::from("/c/linux.yaml")], dry_run, commit, json: false }
    }

    fn files() -> MemFs {
        MemFs::default().with("/c/linux.yaml", CONFIG).with("/ws/defs/strata/core.morph", CORE)
    }

    #[test]
    fn land_rewrites_and_commits() {
        let ctx = context(files());
        let workspace = FakeWorkspace::default();

        let outcome = execute(&ctx, &OneRepo, &workspace, &args(false, true)).unwrap();

        assert!(outcome.report.changed);
        assert_eq!(outcome.report.updates[0].selection.commit, "new");
        assert!(outcome.diff.is_some());
        let written = ctx.fs.read_to_string(Path::new("/ws/defs/strata/core.morph")).unwrap();
        assert!(written.contains("ref: new"));
        assert!(written.contains("unpetrify-ref: master"));
        let commits = workspace.commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].contains("core:linux -> master (new)"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let ctx = context(files());
        let workspace = FakeWorkspace::default();

        let outcome = execute(&ctx, &OneRepo, &workspace, &args(true, false)).unwrap();

        assert!(outcome.report.changed);
        assert!(outcome.diff.is_none());
        let written = ctx.fs.read_to_string(Path::new("/ws/defs/strata/core.morph")).unwrap();
        assert_eq!(written, CORE);
        assert!(workspace.commits.lock().unwrap().is_empty());
    }

    #[test]
    fn invalid_batch_never_prepares_workspace() {
        let ctx = context(files().with("/c/dup.yaml", CONFIG));
        let workspace = FakeWorkspace::default();
        let mut args = args(false, false);
        args.configs.push(PathBuf::from("/c/dup.yaml"));

        let err = execute(&ctx, &OneRepo, &workspace, &args).unwrap_err();

        assert!(matches!(err, FirehoseError::DuplicateLandingTarget { .. }));
        assert!(workspace.prepared.lock().unwrap().is_empty());
    }

    #[test]
    fn commit_message_lists_updates() {
        let ctx = context(files());
        let outcome = execute(&ctx, &OneRepo, &FakeWorkspace::default(), &args(true, false)).unwrap();
        let message = commit_message(&outcome.report.updates);
        assert_eq!(message, "Update firehose refs\n\ncore:linux -> master (new)\n");
    }
}
