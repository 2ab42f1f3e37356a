//! Picking the winning ref for a config.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::{FirehoseError, Result};
use crate::ports::RefCandidate;
use crate::tracking::TrackingPolicy;
use crate::version::DebianVersion;

/// The ref chosen for one config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Name after the transform pipeline; this is what gets ranked.
    pub canonical: String,
    /// Name as listed by the source repository.
    pub raw_name: String,
    /// Commit the ref resolves to.
    pub commit: String,
    /// `raw_name` without its `refs/<kind>/` prefix, as written to the
    /// morphology's `unpetrify-ref`.
    pub display_name: String,
}

struct Survivor<'a> {
    canonical: String,
    candidate: &'a RefCandidate,
}

/// Selects the highest-ranked interesting ref.
///
/// Interesting candidates are ranked by their canonical name read as a
/// Debian version (with `/` turned into `-`). Equal versions fall back to
/// the canonical name and then the raw name, so the result never depends on
/// the order refs were listed in.
///
/// # Errors
///
/// Returns [`FirehoseError::NoMatchingRef`] when nothing is interesting and
/// [`FirehoseError::UnparseableVersion`] when two or more distinct canonical
/// names must be ranked and one of them is not a valid version.
pub fn select(policy: &TrackingPolicy, candidates: &[RefCandidate]) -> Result<Selection> {
    let survivors: Vec<Survivor<'_>> = candidates
        .iter()
        .filter(|candidate| policy.interesting(&candidate.name))
        .map(|candidate| Survivor { canonical: policy.rewrite(&candidate.name), candidate })
        .collect();
    debug!(
        config = policy.source_name(),
        listed = candidates.len(),
        interesting = survivors.len(),
        "filtered refs"
    );

    let distinct: BTreeSet<&str> = survivors.iter().map(|s| s.canonical.as_str()).collect();
    let winner = if distinct.len() > 1 {
        let mut ranked = Vec::with_capacity(survivors.len());
        for survivor in survivors {
            let version = parse_version(&survivor.canonical)?;
            ranked.push((version, survivor));
        }
        ranked
            .into_iter()
            .max_by(|(va, a), (vb, b)| {
                va.cmp(vb)
                    .then_with(|| a.canonical.cmp(&b.canonical))
                    .then_with(|| a.candidate.name.cmp(&b.candidate.name))
            })
            .map(|(_, survivor)| survivor)
    } else {
        // Identical canonical names need no version parse.
        survivors.into_iter().max_by(|a, b| a.candidate.name.cmp(&b.candidate.name))
    };

    let winner = winner.ok_or_else(|| FirehoseError::NoMatchingRef {
        source_name: policy.source_name().to_string(),
    })?;
    Ok(Selection {
        display_name: display_name(&winner.candidate.name),
        canonical: winner.canonical,
        raw_name: winner.candidate.name.clone(),
        commit: winner.candidate.commit.clone(),
    })
}

fn parse_version(canonical: &str) -> Result<DebianVersion> {
    canonical.replace('/', "-").parse::<DebianVersion>().map_err(|e| {
        FirehoseError::UnparseableVersion { name: canonical.to_string(), reason: e.to_string() }
    })
}

/// Strips a leading `refs/<kind>/` from a ref name.
///
/// `refs/heads/foo/bar` becomes `foo/bar`; names outside `refs/` are
/// returned unchanged.
#[must_use]
pub fn display_name(raw: &str) -> String {
    if raw.starts_with("refs/") {
        raw.split('/').skip(2).collect::<Vec<_>>().join("/")
    } else {
        raw.to_string()
    }
}
