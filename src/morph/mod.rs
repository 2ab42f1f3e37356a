//! The morphology set: every build descriptor of the landing checkout,
//! held in memory with a per-morphology dirty flag.
//!
//! Strata list their chunks under `chunks`; systems list their strata under
//! `strata`. A chunk spec is addressed by the name of the stratum holding it
//! plus its own `name`.

mod defaults;

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::error::{FirehoseError, Result};
use crate::ports::MorphologyStore;

pub use defaults::unset_defaults;

/// Key holding the resolved commit of a spec.
pub const REF_KEY: &str = "ref";
/// Key holding the human ref name a spec was resolved from.
pub const UNPETRIFY_REF_KEY: &str = "unpetrify-ref";

/// Persistence state of a morphology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Matches what was loaded or last saved.
    #[default]
    Clean,
    /// Has in-memory changes that have not been saved.
    Dirty,
}

/// Which spec list a morphology kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    /// `strata` of a system.
    Strata,
    /// `chunks` of a stratum.
    Chunks,
}

impl SpecKind {
    /// The YAML key the specs live under.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Strata => "strata",
            Self::Chunks => "chunks",
        }
    }

    fn of_kind(kind: &str) -> Option<Self> {
        match kind {
            "system" => Some(Self::Strata),
            "stratum" => Some(Self::Chunks),
            _ => None,
        }
    }
}

/// One morphology document.
#[derive(Debug, Clone, PartialEq)]
pub struct Morphology {
    repo_url: String,
    filename: PathBuf,
    kind: String,
    name: String,
    content: Mapping,
    state: NodeState,
}

impl Morphology {
    /// Wraps parsed YAML content, which must carry string `kind` and `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::InvalidMorphology`] if either field is
    /// missing or not a string.
    pub fn new(repo_url: impl Into<String>, filename: impl Into<PathBuf>, content: Mapping) -> Result<Self> {
        let filename = filename.into();
        let field = |key: &str| -> Result<String> {
            content.get(key).and_then(Value::as_str).map(str::to_string).ok_or_else(|| {
                FirehoseError::InvalidMorphology {
                    path: filename.clone(),
                    reason: format!("missing string field {key:?}"),
                }
            })
        };
        let kind = field("kind")?;
        let name = field("name")?;
        Ok(Self { repo_url: repo_url.into(), filename, kind, name, content, state: NodeState::Clean })
    }

    /// Parses a morphology from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::InvalidMorphology`] if the text is not a YAML
    /// mapping with string `kind` and `name`.
    pub fn from_yaml(repo_url: impl Into<String>, filename: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let filename = filename.into();
        let content: Mapping = serde_yaml::from_str(text).map_err(|e| {
            FirehoseError::InvalidMorphology { path: filename.clone(), reason: e.to_string() }
        })?;
        Self::new(repo_url, filename, content)
    }

    /// Serializes the current content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be represented as YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.content)
    }

    /// Repository the morphology was loaded from.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Path of the morphology relative to its repository.
    #[must_use]
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// `name` field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == NodeState::Dirty
    }

    fn spec_kind(&self) -> Option<SpecKind> {
        SpecKind::of_kind(&self.kind)
    }

    fn specs(&self, kind: SpecKind) -> impl Iterator<Item = &Mapping> {
        self.content
            .get(kind.key())
            .and_then(Value::as_sequence)
            .into_iter()
            .flatten()
            .filter_map(Value::as_mapping)
    }

    fn spec_mut(&mut self, kind: SpecKind, index: usize) -> Option<&mut Mapping> {
        self.content
            .get_mut(kind.key())
            .and_then(Value::as_sequence_mut)?
            .iter_mut()
            .filter_map(Value::as_mapping_mut)
            .nth(index)
    }
}

/// Where a spec sits: morphology index and position among its specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpecLocation {
    morph: usize,
    spec: usize,
    kind: SpecKind,
}

/// All morphologies of a checkout.
#[derive(Debug, Clone, Default)]
pub struct MorphologySet {
    morphologies: Vec<Morphology>,
}

impl MorphologySet {
    /// Builds a set from already-loaded morphologies, keeping their order.
    #[must_use]
    pub fn new(morphologies: Vec<Morphology>) -> Self {
        Self { morphologies }
    }

    /// Loads every morphology from a store.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::Store`] if the store fails.
    pub fn load(store: &dyn MorphologyStore) -> Result<Self> {
        let morphologies = store
            .load_all()
            .map_err(|source| FirehoseError::Store { context: "load morphologies".into(), source })?;
        debug!(count = morphologies.len(), "loaded morphologies");
        Ok(Self::new(morphologies))
    }

    /// The morphologies, in load order.
    #[must_use]
    pub fn morphologies(&self) -> &[Morphology] {
        &self.morphologies
    }

    /// Looks up a morphology by kind and name.
    #[must_use]
    pub fn find(&self, kind: &str, name: &str) -> Option<&Morphology> {
        self.morphologies.iter().find(|m| m.kind == kind && m.name == name)
    }

    /// Whether any morphology has unsaved changes.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.morphologies.iter().any(Morphology::is_dirty)
    }

    /// Visits every spec accepted by `wanted`.
    ///
    /// `wanted` sees the owning morphology, the spec list kind and the spec.
    /// `visit` may edit the spec and returns whether it did; an edit marks
    /// the owning morphology dirty. Returns the number of specs visited.
    pub fn traverse_specs<W, V>(&mut self, wanted: W, mut visit: V) -> usize
    where
        W: FnMut(&Morphology, SpecKind, &Mapping) -> bool,
        V: FnMut(&mut Mapping) -> bool,
    {
        let locations = self.locate(wanted);
        for location in &locations {
            let morph = &mut self.morphologies[location.morph];
            if let Some(spec) = morph.spec_mut(location.kind, location.spec) {
                if visit(spec) {
                    morph.state = NodeState::Dirty;
                }
            }
        }
        locations.len()
    }

    /// The `repo` of the one chunk spec named `chunk` in stratum `stratum`.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::AmbiguousOrMissingChunk`] unless exactly one
    /// spec matches, or [`FirehoseError::InvalidMorphology`] if it has no
    /// string `repo`.
    pub fn chunk_repo(&self, stratum: &str, chunk: &str) -> Result<String> {
        let location = self.locate_chunk(stratum, chunk)?;
        let morph = &self.morphologies[location.morph];
        morph
            .specs(location.kind)
            .nth(location.spec)
            .and_then(|spec| spec.get("repo"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| FirehoseError::InvalidMorphology {
                path: morph.filename.clone(),
                reason: format!("chunk {chunk:?} has no repo"),
            })
    }

    /// Points the chunk spec `stratum:chunk` at `commit`, recording
    /// `display_name` as its `unpetrify-ref`, and marks its stratum dirty.
    ///
    /// The stratum is marked dirty even if the values were already set.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::AmbiguousOrMissingChunk`] unless exactly one
    /// spec matches; nothing is modified in that case.
    pub fn apply(
        &mut self,
        stratum: &str,
        chunk: &str,
        commit: &str,
        display_name: &str,
    ) -> Result<()> {
        self.locate_chunk(stratum, chunk)?;
        self.traverse_specs(chunk_spec(stratum, chunk), |spec| {
            spec.insert(Value::from(REF_KEY), Value::from(commit));
            spec.insert(Value::from(UNPETRIFY_REF_KEY), Value::from(display_name));
            true
        });
        Ok(())
    }

    /// Saves every dirty morphology and marks it clean.
    ///
    /// Default-valued fields are stripped before saving. Morphologies are
    /// written in load order; a failed save stops the flush and leaves that
    /// morphology (and any after it) dirty.
    ///
    /// Returns `false` without touching the store when nothing is dirty.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::Store`] if a save fails.
    pub fn flush(&mut self, store: &dyn MorphologyStore) -> Result<bool> {
        if !self.has_changes() {
            return Ok(false);
        }
        for morph in self.morphologies.iter_mut().filter(|m| m.is_dirty()) {
            unset_defaults(morph);
            store.save(morph).map_err(|source| FirehoseError::Store {
                context: format!("save {}", morph.filename.display()),
                source,
            })?;
            morph.state = NodeState::Clean;
            info!(morphology = %morph.filename.display(), "saved");
        }
        Ok(true)
    }

    fn locate<W>(&self, mut wanted: W) -> Vec<SpecLocation>
    where
        W: FnMut(&Morphology, SpecKind, &Mapping) -> bool,
    {
        let mut locations = Vec::new();
        for (morph_index, morph) in self.morphologies.iter().enumerate() {
            let Some(kind) = morph.spec_kind() else { continue };
            for (spec_index, spec) in morph.specs(kind).enumerate() {
                if wanted(morph, kind, spec) {
                    locations.push(SpecLocation { morph: morph_index, spec: spec_index, kind });
                }
            }
        }
        locations
    }

    fn locate_chunk(&self, stratum: &str, chunk: &str) -> Result<SpecLocation> {
        let locations = self.locate(chunk_spec(stratum, chunk));
        match locations.as_slice() {
            [only] => Ok(*only),
            _ => Err(FirehoseError::AmbiguousOrMissingChunk {
                stratum: stratum.to_string(),
                chunk: chunk.to_string(),
                found: locations.len(),
            }),
        }
    }
}

/// Matches the chunk spec `chunk` listed by the stratum named `stratum`.
fn chunk_spec<'a>(
    stratum: &'a str,
    chunk: &'a str,
) -> impl Fn(&Morphology, SpecKind, &Mapping) -> bool + 'a {
    move |morph, kind, spec| {
        kind == SpecKind::Chunks
            && morph.name == stratum
            && spec.get("name").and_then(Value::as_str) == Some(chunk)
    }
}
