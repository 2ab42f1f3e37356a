//! Firehose configuration.
//!
//! A firehose config is a YAML document tagged `kind: firehose` that says
//! where to land (`landing.*`) and what to track (`tracking.*`). Values are
//! looked up by path on demand so that a missing field is reported with the
//! exact path that was requested.

mod aliases;
mod tracking;

pub use aliases::RepoAliases;
pub use tracking::{Landing, TrackingConfig, Transform, DOCUMENT_KIND};
