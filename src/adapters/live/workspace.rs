//! Git checkout of the landing repository.
//!
//! The checkout lives at `<workspace>/<repo>` with `:` in the repo name
//! turned into a directory separator, so `baserock:baserock/definitions`
//! lands in `<workspace>/baserock/baserock/definitions`. Empty, `.` and `..`
//! segments are dropped, so the checkout never leaves the workspace.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::git::git;
use crate::config::{Landing, RepoAliases};
use crate::ports::command::CommandRunner;
use crate::ports::filesystem::FileSystem;
use crate::ports::workspace::LandingWorkspace;

/// Committer name used for landing commits.
pub const BOT_NAME: &str = "Firehose merge bot";
/// Committer email used for landing commits.
pub const BOT_EMAIL: &str = "firehose@merge.bot";

/// Installs the bot identity in a repository's local config and puts the
/// previous values back when dropped.
pub struct GitIdentityGuard<'a> {
    runner: &'a dyn CommandRunner,
    repo: PathBuf,
    previous: [(&'static str, Option<String>); 2],
}

impl<'a> GitIdentityGuard<'a> {
    /// Records the current `user.name`/`user.email` of `repo` and replaces
    /// them with the bot identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read or written.
    pub fn install(
        runner: &'a dyn CommandRunner,
        repo: &Path,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut previous = [("user.name", None), ("user.email", None)];
        for (key, value) in &mut previous {
            let output = runner.run("git", &["config", "--local", *key], Some(repo))?;
            // Exit status 1 means the key is unset.
            *value = output.success().then(|| output.stdout.trim().to_string());
        }
        let guard = Self { runner, repo: repo.to_path_buf(), previous };
        git(runner, &["config", "--local", "user.name", BOT_NAME], Some(repo))?;
        git(runner, &["config", "--local", "user.email", BOT_EMAIL], Some(repo))?;
        Ok(guard)
    }
}

impl Drop for GitIdentityGuard<'_> {
    fn drop(&mut self) {
        let repo = self.repo.as_path();
        for (key, value) in &self.previous {
            let key: &str = key;
            let result = match value {
                Some(value) => {
                    git(self.runner, &["config", "--local", key, value.as_str()], Some(repo))
                }
                None => git(self.runner, &["config", "--local", "--unset", key], Some(repo)),
            };
            if let Err(e) = result {
                warn!(key, repo = %self.repo.display(), "failed to restore git identity: {e}");
            }
        }
    }
}

/// Manages the landing checkout with the `git` CLI.
pub struct GitLandingWorkspace<'a> {
    runner: &'a dyn CommandRunner,
    fs: &'a dyn FileSystem,
    root: PathBuf,
    aliases: RepoAliases,
}

impl<'a> GitLandingWorkspace<'a> {
    /// Creates a workspace rooted at `root`.
    #[must_use]
    pub fn new(
        runner: &'a dyn CommandRunner,
        fs: &'a dyn FileSystem,
        root: &Path,
        aliases: RepoAliases,
    ) -> Self {
        Self { runner, fs, root: root.to_path_buf(), aliases }
    }

    /// Where the checkout of `landing.repo` lives.
    #[must_use]
    pub fn checkout_dir(&self, landing: &Landing) -> PathBuf {
        landing
            .repo
            .split([':', '/'])
            .filter(|segment| !matches!(*segment, "" | "." | ".."))
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    fn has_ref(&self, checkout: &Path, name: &str) -> bool {
        self.runner
            .run("git", &["rev-parse", "--verify", "--quiet", name], Some(checkout))
            .is_ok_and(|output| output.success())
    }

    fn checkout_branch(
        &self,
        checkout: &Path,
        landing: &Landing,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let myref = landing.myref.as_str();
        if self.has_ref(checkout, &format!("refs/heads/{myref}")) {
            git(self.runner, &["checkout", myref], Some(checkout))?;
        } else if self.has_ref(checkout, &format!("refs/remotes/origin/{myref}")) {
            let start = format!("origin/{myref}");
            git(self.runner, &["checkout", "-b", myref, start.as_str()], Some(checkout))?;
        } else {
            info!(branch = myref, from = %landing.baseref, "creating landing branch");
            let start = format!("origin/{}", landing.baseref);
            git(self.runner, &["checkout", "-b", myref, start.as_str()], Some(checkout))?;
        }
        Ok(())
    }

    /// Moves index and tree to `origin/<baseref>` while the branch keeps its
    /// head, so the next commit on the branch carries the base's tree.
    fn reset_to_baseref(
        &self,
        checkout: &Path,
        baseref: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let head = git(self.runner, &["rev-parse", "HEAD"], Some(checkout))?;
        let head = head.trim();
        let base = format!("origin/{baseref}");
        git(self.runner, &["reset", "--hard", base.as_str()], Some(checkout))?;
        git(self.runner, &["reset", "--soft", head], Some(checkout))?;
        Ok(())
    }
}

impl LandingWorkspace for GitLandingWorkspace<'_> {
    fn prepare(
        &self,
        landing: &Landing,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let checkout = self.checkout_dir(landing);
        if self.fs.is_dir(&checkout.join(".git")) {
            debug!(checkout = %checkout.display(), "fetching landing repo");
            git(self.runner, &["fetch", "--prune", "origin"], Some(checkout.as_path()))?;
        } else {
            let url = self.aliases.expand(&landing.repo);
            info!(url, checkout = %checkout.display(), "cloning landing repo");
            let target = checkout.to_string_lossy().into_owned();
            git(self.runner, &["clone", url.as_str(), target.as_str()], None)?;
        }
        self.checkout_branch(&checkout, landing)?;
        self.reset_to_baseref(&checkout, &landing.baseref)?;
        Ok(checkout)
    }

    fn diff(&self, checkout: &Path) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        git(self.runner, &["diff"], Some(checkout))
    }

    fn commit(
        &self,
        checkout: &Path,
        message: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let _identity = GitIdentityGuard::install(self.runner, checkout)?;
        git(self.runner, &["add", "--all"], Some(checkout))?;
        git(self.runner, &["commit", "--message", message], Some(checkout))?;
        Ok(())
    }
}
