//! Landing workspace port: the checkout morphologies are edited in.

use std::path::{Path, PathBuf};

use crate::config::Landing;

/// Manages the checkout of the landing repository.
pub trait LandingWorkspace: Send + Sync {
    /// Checks out `landing.myref` with its tree reset to `landing.baseref`
    /// and returns the checkout directory.
    ///
    /// # Errors
    ///
    /// Returns an error if cloning, fetching or checking out fails.
    fn prepare(
        &self,
        landing: &Landing,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns the uncommitted diff of the checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the diff cannot be computed.
    fn diff(&self, checkout: &Path) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Stages every change in the checkout and commits it.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    fn commit(
        &self,
        checkout: &Path,
        message: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
