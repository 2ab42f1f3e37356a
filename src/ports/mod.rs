//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the landing core and an
//! external system (time, filesystem, processes, git, morphology storage).
//! Implementations live in `src/adapters/` and `src/store/`.

pub mod clock;
pub mod command;
pub mod filesystem;
pub mod morphology;
pub mod refs;
pub mod workspace;

pub use clock::Clock;
pub use command::{CommandOutput, CommandRunner};
pub use filesystem::FileSystem;
pub use morphology::MorphologyStore;
pub use refs::{RefCandidate, RefCatalog};
pub use workspace::LandingWorkspace;
