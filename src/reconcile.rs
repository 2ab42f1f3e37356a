//! Applying a batch of firehose configs to the morphology set.

use serde::Serialize;
use tracing::info;

use crate::config::TrackingConfig;
use crate::error::{FirehoseError, Result};
use crate::landing::validate_batch;
use crate::morph::MorphologySet;
use crate::ports::{MorphologyStore, RefCatalog};
use crate::select::{select, Selection};
use crate::tracking::TrackingPolicy;

/// What one config changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedUpdate {
    /// Config the update came from.
    pub config: String,
    /// Stratum holding the updated chunk spec.
    pub stratum: String,
    /// Name of the updated chunk spec.
    pub chunk: String,
    /// Source repository the refs were listed from.
    pub repo: String,
    /// The winning ref.
    pub selection: Selection,
}

/// Points one chunk spec at the best ref its config tracks.
///
/// # Errors
///
/// Returns any config, lookup, ref listing or selection error. The set is
/// only modified once a ref has been selected.
pub fn apply_config(
    config: &TrackingConfig,
    catalog: &dyn RefCatalog,
    graph: &mut MorphologySet,
) -> Result<AppliedUpdate> {
    let stratum = config.landing_stratum()?;
    let chunk = config.landing_chunk()?;
    let repo = graph.chunk_repo(stratum, chunk)?;
    let policy = TrackingPolicy::from_config(config)?;

    let candidates = catalog
        .list_refs(&repo)
        .map_err(|source| FirehoseError::RefCatalog { repo: repo.clone(), source })?;
    let selection = select(&policy, &candidates)?;

    graph.apply(stratum, chunk, &selection.commit, &selection.display_name)?;
    info!(
        config = config.source_name(),
        stratum,
        chunk,
        refname = %selection.display_name,
        commit = %selection.commit,
        "selected ref"
    );

    Ok(AppliedUpdate {
        config: config.source_name().to_string(),
        stratum: stratum.to_string(),
        chunk: chunk.to_string(),
        repo,
        selection,
    })
}

/// Validates the batch, then applies every config in order.
///
/// Stops at the first failing config; updates already applied stay in
/// memory but nothing is saved.
///
/// # Errors
///
/// Returns the first validation or application error.
pub fn apply_batch(
    batch: &[TrackingConfig],
    catalog: &dyn RefCatalog,
    graph: &mut MorphologySet,
) -> Result<Vec<AppliedUpdate>> {
    validate_batch(batch)?;
    batch.iter().map(|config| apply_config(config, catalog, graph)).collect()
}

/// Runs a whole batch: validate, apply, then flush.
///
/// Returns whether any morphology was saved.
///
/// # Errors
///
/// Returns the first error of any stage. Nothing is saved unless every
/// config applied.
pub fn reconcile(
    batch: &[TrackingConfig],
    catalog: &dyn RefCatalog,
    graph: &mut MorphologySet,
    store: &dyn MorphologyStore,
) -> Result<bool> {
    apply_batch(batch, catalog, graph)?;
    graph.flush(store)
}
