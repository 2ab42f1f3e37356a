//! Path-addressed access to a firehose tracking document.

use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::{FirehoseError, Result};
use crate::ports::filesystem::FileSystem;

/// Value the `kind` field must hold for a document to be accepted.
pub const DOCUMENT_KIND: &str = "firehose";

/// The integration target shared by every config in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Landing {
    /// Repository holding the morphologies (may use a repo alias).
    pub repo: String,
    /// Branch the landing branch is rebuilt from.
    pub baseref: String,
    /// Branch the updated morphologies land on.
    pub myref: String,
}

/// One `{match, replacement}` rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    /// Regular expression to search for.
    pub pattern: String,
    /// Replacement text; `\1` and `\g<name>` refer to capture groups.
    pub replacement: String,
}

/// Read-only view over one firehose document.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    source_name: String,
    content: Value,
}

impl TrackingConfig {
    /// Parses a document, checking its `kind` tag.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::InvalidDocument`] if the text is not a YAML
    /// mapping or its `kind` is not `firehose`.
    pub fn parse(source_name: impl Into<String>, text: &str) -> Result<Self> {
        let source_name = source_name.into();
        let content: Value = serde_yaml::from_str(text).map_err(|e| {
            FirehoseError::InvalidDocument { source_name: source_name.clone(), reason: e.to_string() }
        })?;

        if !content.is_mapping() {
            return Err(FirehoseError::InvalidDocument {
                source_name,
                reason: "top level is not a mapping".to_string(),
            });
        }
        match content.get("kind").and_then(Value::as_str) {
            Some(DOCUMENT_KIND) => Ok(Self { source_name, content }),
            Some(other) => Err(FirehoseError::InvalidDocument {
                source_name,
                reason: format!("kind is {other:?}, expected {DOCUMENT_KIND:?}"),
            }),
            None => Err(FirehoseError::InvalidDocument {
                source_name,
                reason: "missing kind".to_string(),
            }),
        }
    }

    /// Reads and parses a config file through the filesystem port.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::InvalidDocument`] if the file cannot be read
    /// or is not a firehose document.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let text = fs.read_to_string(path).map_err(|e| FirehoseError::InvalidDocument {
            source_name: source_name.clone(),
            reason: format!("cannot read: {e}"),
        })?;
        Self::parse(source_name, &text)
    }

    /// Name used for this config in errors and reports.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Looks up a value by path, one mapping level per segment.
    ///
    /// # Errors
    ///
    /// Returns [`FirehoseError::ConfigPath`] carrying the path walked so far
    /// as soon as a segment is missing, null, or reached through a
    /// non-mapping value.
    pub fn get(&self, path: &[&str]) -> Result<&Value> {
        let mut node = &self.content;
        for (depth, segment) in path.iter().enumerate() {
            match node.as_mapping().and_then(|map| map.get(*segment)) {
                Some(next) if !next.is_null() => node = next,
                _ => return Err(self.path_error(&path[..=depth])),
            }
        }
        Ok(node)
    }

    /// `landing.repo`
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn landing_repo(&self) -> Result<&str> {
        self.get_str(&["landing", "repo"])
    }

    /// `landing.baseref`
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn landing_baseref(&self) -> Result<&str> {
        self.get_str(&["landing", "baseref"])
    }

    /// `landing.myref`
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn landing_myref(&self) -> Result<&str> {
        self.get_str(&["landing", "myref"])
    }

    /// `landing.stratum`
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn landing_stratum(&self) -> Result<&str> {
        self.get_str(&["landing", "stratum"])
    }

    /// `landing.chunk`
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn landing_chunk(&self) -> Result<&str> {
        self.get_str(&["landing", "chunk"])
    }

    /// The repo/baseref/myref triple.
    ///
    /// # Errors
    ///
    /// Fails on the first missing landing field.
    pub fn landing(&self) -> Result<Landing> {
        Ok(Landing {
            repo: self.landing_repo()?.to_string(),
            baseref: self.landing_baseref()?.to_string(),
            myref: self.landing_myref()?.to_string(),
        })
    }

    /// `tracking.mode`
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn tracking_mode(&self) -> Result<&str> {
        self.get_str(&["tracking", "mode"])
    }

    /// `tracking.ref`, only meaningful in `follow-tip` mode.
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or not a string.
    pub fn tracking_ref(&self) -> Result<&str> {
        self.get_str(&["tracking", "ref"])
    }

    /// `tracking.filters`, only meaningful in `refs` mode.
    ///
    /// # Errors
    ///
    /// Fails if the field is missing, not a sequence, or holds non-strings.
    pub fn tracking_filters(&self) -> Result<Vec<&str>> {
        let path = ["tracking", "filters"];
        self.get_seq(&path)?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().ok_or_else(|| {
                    self.type_error(&format!("{}.{i}", path.join(".")), "a string pattern")
                })
            })
            .collect()
    }

    /// `tracking.transforms`, only meaningful in `refs` mode.
    ///
    /// # Errors
    ///
    /// Fails if the field is missing or any entry lacks a string `match` or
    /// `replacement`.
    pub fn tracking_transforms(&self) -> Result<Vec<Transform>> {
        let path = ["tracking", "transforms"];
        self.get_seq(&path)?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let prefix = format!("{}.{i}", path.join("."));
                Ok(Transform {
                    pattern: self.entry_str(item, &prefix, "match")?.to_string(),
                    replacement: self.entry_str(item, &prefix, "replacement")?.to_string(),
                })
            })
            .collect()
    }

    fn get_str(&self, path: &[&str]) -> Result<&str> {
        self.get(path)?.as_str().ok_or_else(|| self.type_error(&path.join("."), "a string"))
    }

    fn get_seq(&self, path: &[&str]) -> Result<&[Value]> {
        self.get(path)?
            .as_sequence()
            .map(Vec::as_slice)
            .ok_or_else(|| self.type_error(&path.join("."), "a sequence"))
    }

    fn entry_str<'v>(&self, entry: &'v Value, prefix: &str, key: &str) -> Result<&'v str> {
        match entry.as_mapping().and_then(|map| map.get(key)) {
            Some(value) if !value.is_null() => {
                value.as_str().ok_or_else(|| self.type_error(&format!("{prefix}.{key}"), "a string"))
            }
            _ => Err(FirehoseError::ConfigPath {
                source_name: self.source_name.clone(),
                path: format!("{prefix}.{key}"),
            }),
        }
    }

    fn path_error(&self, walked: &[&str]) -> FirehoseError {
        FirehoseError::ConfigPath { source_name: self.source_name.clone(), path: walked.join(".") }
    }

    fn type_error(&self, path: &str, expected: &'static str) -> FirehoseError {
        FirehoseError::ConfigType {
            source_name: self.source_name.clone(),
            path: path.to_string(),
            expected,
        }
    }
}
