//! Batch checks: every config lands in the same place, and no two configs
//! update the same chunk.

use std::collections::{BTreeSet, HashSet};

use crate::config::{Landing, TrackingConfig};
use crate::error::{FirehoseError, Result};

/// Validates a batch of configs and returns their shared landing target.
///
/// Only one integration branch is checked out per run, so `landing.repo`,
/// `landing.baseref` and `landing.myref` must agree across the batch. The
/// same upstream may be tracked by several configs as long as each one
/// lands in a different `(stratum, chunk)`.
///
/// # Errors
///
/// Returns [`FirehoseError::EmptyBatch`], a config path error,
/// [`FirehoseError::InconsistentLanding`] naming the first field that
/// differs, or [`FirehoseError::DuplicateLandingTarget`].
pub fn validate_batch(batch: &[TrackingConfig]) -> Result<Landing> {
    let first = batch.first().ok_or(FirehoseError::EmptyBatch)?;

    ensure_uniform(batch, "repo", TrackingConfig::landing_repo)?;
    ensure_uniform(batch, "baseref", TrackingConfig::landing_baseref)?;
    ensure_uniform(batch, "myref", TrackingConfig::landing_myref)?;

    let mut targets = HashSet::with_capacity(batch.len());
    for conf in batch {
        let stratum = conf.landing_stratum()?;
        let chunk = conf.landing_chunk()?;
        if !targets.insert((stratum, chunk)) {
            return Err(FirehoseError::DuplicateLandingTarget {
                stratum: stratum.to_string(),
                chunk: chunk.to_string(),
            });
        }
    }

    first.landing()
}

fn ensure_uniform(
    batch: &[TrackingConfig],
    field: &'static str,
    read: fn(&TrackingConfig) -> Result<&str>,
) -> Result<()> {
    let mut values = BTreeSet::new();
    for conf in batch {
        values.insert(read(conf)?);
    }
    if values.len() > 1 {
        return Err(FirehoseError::InconsistentLanding { field });
    }
    Ok(())
}
