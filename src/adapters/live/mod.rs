//! Live adapters for real external interactions.

pub mod clock;
pub mod command;
pub mod filesystem;
pub mod git;
pub mod workspace;

pub use git::GitRefCatalog;
pub use workspace::{GitIdentityGuard, GitLandingWorkspace};
