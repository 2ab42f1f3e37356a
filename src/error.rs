//! Error taxonomy for a landing run.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by port implementations.
pub type PortError = Box<dyn StdError + Send + Sync>;

/// Errors that abort a landing run.
///
/// None of these are recovered locally; they propagate to the command layer
/// which reports them and exits non-zero.
#[derive(Debug, Error)]
pub enum FirehoseError {
    /// A required configuration path is absent (or explicitly null).
    #[error("{source_name}: unknown element (@ {path})")]
    ConfigPath {
        /// Where the config was read from.
        source_name: String,
        /// Dotted path walked up to and including the failing segment.
        path: String,
    },

    /// A configuration path exists but holds the wrong kind of value.
    #[error("{source_name}: expected {expected} (@ {path})")]
    ConfigType {
        /// Where the config was read from.
        source_name: String,
        /// Dotted path of the offending value.
        path: String,
        /// Human description of the expected value.
        expected: &'static str,
    },

    /// The document is not a firehose config at all.
    #[error("{source_name}: not a firehose document: {reason}")]
    InvalidDocument {
        /// Where the document was read from.
        source_name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A batch with no configurations was handed to the validator.
    #[error("expected at least one firehose config")]
    EmptyBatch,

    /// Configurations disagree on where they land.
    #[error("not all firehoses have the same landing {field}")]
    InconsistentLanding {
        /// The landing field that differs (`repo`, `baseref` or `myref`).
        field: &'static str,
    },

    /// Two configurations would update the same chunk spec.
    #[error("not all firehoses have unique landing locations ({stratum}:{chunk} appears more than once)")]
    DuplicateLandingTarget {
        /// Stratum of the duplicated target.
        stratum: String,
        /// Chunk of the duplicated target.
        chunk: String,
    },

    /// `tracking.mode` holds a value other than `follow-tip` or `refs`.
    #[error("{source_name}: unknown tracking mode {value:?} (@ tracking.mode)")]
    UnknownTrackingMode {
        /// Where the config was read from.
        source_name: String,
        /// The rejected mode value.
        value: String,
    },

    /// A filter or transform pattern does not compile.
    #[error("{source_name}: invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// Where the config was read from.
        source_name: String,
        /// The offending pattern.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// No ref in the source repository satisfied the tracking policy.
    #[error("{source_name}: no ref matches the tracking policy")]
    NoMatchingRef {
        /// Where the config was read from.
        source_name: String,
    },

    /// A canonical ref name could not be ordered as a version.
    #[error("cannot order ref {name:?} as a version: {reason}")]
    UnparseableVersion {
        /// The canonical name that failed to parse.
        name: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The (stratum, chunk) lookup did not find exactly one chunk spec.
    #[error("expected 1 chunk matching {stratum}:{chunk} (got {found})")]
    AmbiguousOrMissingChunk {
        /// Stratum name searched for.
        stratum: String,
        /// Chunk name searched for.
        chunk: String,
        /// Number of matching specs.
        found: usize,
    },

    /// A morphology file could not be understood.
    #[error("invalid morphology {}: {reason}", .path.display())]
    InvalidMorphology {
        /// File the morphology came from.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Listing refs of a source repository failed.
    #[error("failed to list refs of {repo}: {source}")]
    RefCatalog {
        /// Repository whose refs were requested.
        repo: String,
        /// Underlying adapter failure.
        #[source]
        source: PortError,
    },

    /// Loading or saving morphologies failed.
    #[error("morphology store: {context}: {source}")]
    Store {
        /// Operation that failed.
        context: String,
        /// Underlying adapter failure.
        #[source]
        source: PortError,
    },

    /// Preparing, diffing or committing the landing checkout failed.
    #[error("workspace: {context}: {source}")]
    Workspace {
        /// Operation that failed.
        context: String,
        /// Underlying adapter failure.
        #[source]
        source: PortError,
    },
}

/// Shorthand result type for the landing core.
pub type Result<T, E = FirehoseError> = std::result::Result<T, E>;
