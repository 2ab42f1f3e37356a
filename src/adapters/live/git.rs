//! Git-backed ref catalog: a bare mirror per source repository, listed with
//! `git for-each-ref`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::RepoAliases;
use crate::ports::command::CommandRunner;
use crate::ports::filesystem::FileSystem;
use crate::ports::refs::{RefCandidate, RefCatalog};

/// Runs `git` and returns its stdout, failing on a non-zero exit.
pub(crate) fn git(
    runner: &dyn CommandRunner,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let output = runner.run("git", args, cwd)?;
    if !output.success() {
        let stderr = output.stderr.trim();
        return Err(format!("git {} failed: {stderr}", args.join(" ")).into());
    }
    Ok(output.stdout)
}

/// One line of `git for-each-ref` output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RefLine<'a> {
    object: &'a str,
    object_type: &'a str,
    name: &'a str,
}

fn parse_for_each_ref<'a>(
    output: &'a str,
) -> Result<Vec<RefLine<'a>>, Box<dyn std::error::Error + Send + Sync>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| -> Result<RefLine<'a>, Box<dyn std::error::Error + Send + Sync>> {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(object), Some(object_type), Some(name)) => {
                    Ok(RefLine { object, object_type, name })
                }
                _ => Err(format!("Unexpected for-each-ref line: {line:?}").into()),
            }
        })
        .collect()
}

/// Directory name for the mirror of `url`.
fn mirror_name(url: &str) -> String {
    url.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Lists refs of source repositories through cached bare mirrors.
pub struct GitRefCatalog<'a> {
    runner: &'a dyn CommandRunner,
    fs: &'a dyn FileSystem,
    cache_dir: PathBuf,
    aliases: RepoAliases,
}

impl<'a> GitRefCatalog<'a> {
    /// Creates a catalog keeping its mirrors under `cache_dir`.
    #[must_use]
    pub fn new(
        runner: &'a dyn CommandRunner,
        fs: &'a dyn FileSystem,
        cache_dir: &Path,
        aliases: RepoAliases,
    ) -> Self {
        Self { runner, fs, cache_dir: cache_dir.to_path_buf(), aliases }
    }

    /// Clones the mirror of `url` on first use, updates it afterwards.
    fn updated_mirror(
        &self,
        url: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let mirror = self.cache_dir.join(mirror_name(url));
        if self.fs.is_dir(&mirror) {
            debug!(url, mirror = %mirror.display(), "updating mirror");
            git(self.runner, &["remote", "update", "--prune"], Some(mirror.as_path()))?;
        } else {
            info!(url, mirror = %mirror.display(), "cloning mirror");
            let target = mirror.to_string_lossy().into_owned();
            git(self.runner, &["clone", "--mirror", url, target.as_str()], None)?;
        }
        Ok(mirror)
    }
}

impl RefCatalog for GitRefCatalog<'_> {
    fn list_refs(
        &self,
        repo: &str,
    ) -> Result<Vec<RefCandidate>, Box<dyn std::error::Error + Send + Sync>> {
        let url = self.aliases.expand(repo);
        let mirror = self.updated_mirror(&url)?;
        let listing = git(self.runner, &["for-each-ref"], Some(mirror.as_path()))?;

        let mut refs = Vec::new();
        for line in parse_for_each_ref(&listing)? {
            let commit = if line.object_type == "tag" {
                git(self.runner, &["rev-list", "-1", line.object], Some(mirror.as_path()))?
                    .trim()
                    .to_string()
            } else {
                line.object.to_string()
            };
            refs.push(RefCandidate::new(line.name, commit));
        }
        debug!(repo, count = refs.len(), "listed refs");
        Ok(refs)
    }
}
