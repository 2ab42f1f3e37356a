//! Service context bundling the port trait objects a run needs.

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::command::LiveCommandRunner;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::ports::clock::Clock;
use crate::ports::command::CommandRunner;
use crate::ports::filesystem::FileSystem;

/// Bundles the low-level ports into a single context.
///
/// Git-backed adapters (ref catalog, landing workspace) and the morphology
/// store borrow from this context, so one context serves a whole run.
pub struct ServiceContext {
    /// Clock for stamping reports.
    pub clock: Box<dyn Clock>,
    /// Filesystem for configs and morphologies.
    pub fs: Box<dyn FileSystem>,
    /// Runner for `git` invocations.
    pub commands: Box<dyn CommandRunner>,
}

impl ServiceContext {
    /// Creates a context backed by the real system.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            commands: Box::new(LiveCommandRunner),
        }
    }
}
