//! Ref catalog port for enumerating a source repository's refs.

use serde::Serialize;

/// A ref as listed by the source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefCandidate {
    /// Full ref name, e.g. `refs/tags/v3.14`.
    pub name: String,
    /// Commit the ref resolves to; annotated tags are already peeled.
    pub commit: String,
}

impl RefCandidate {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: impl Into<String>, commit: impl Into<String>) -> Self {
        Self { name: name.into(), commit: commit.into() }
    }
}

/// Lists every ref of a repository.
pub trait RefCatalog: Send + Sync {
    /// Returns all refs of `repo` as (name, commit) pairs, with tag objects
    /// resolved to the commit they annotate.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be fetched or listed.
    fn list_refs(
        &self,
        repo: &str,
    ) -> Result<Vec<RefCandidate>, Box<dyn std::error::Error + Send + Sync>>;
}
