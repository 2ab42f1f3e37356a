//! Tracking policies: which upstream refs are interesting, and what they
//! are called once rewritten.

use std::fmt::Write as _;

use regex::Regex;

use crate::config::TrackingConfig;
use crate::error::{FirehoseError, Result};

/// `tracking.mode` value for following a single ref.
pub const MODE_FOLLOW_TIP: &str = "follow-tip";
/// `tracking.mode` value for pattern-filtered refs.
pub const MODE_REFS: &str = "refs";

#[derive(Debug, Clone)]
enum Mode {
    FollowTip { tracking_ref: String },
    Refs { filters: Vec<Regex>, transforms: Vec<(Regex, String)> },
}

/// A compiled tracking policy for one config.
///
/// Patterns are compiled with the `regex` crate, so lookaround and
/// backreferences are rejected with [`FirehoseError::InvalidPattern`].
/// Replacements are written the way `re.sub` reads them: `\1` and
/// `\g<name>` refer to groups and `$` is literal.
#[derive(Debug, Clone)]
pub struct TrackingPolicy {
    source_name: String,
    mode: Mode,
}

impl TrackingPolicy {
    /// Reads `tracking.*` from a config and compiles its patterns.
    ///
    /// Only the fields the mode needs are read: `tracking.ref` for
    /// `follow-tip`, `tracking.filters` and `tracking.transforms` for `refs`.
    ///
    /// # Errors
    ///
    /// Returns a config path error for a missing field,
    /// [`FirehoseError::UnknownTrackingMode`] for an unrecognised mode and
    /// [`FirehoseError::InvalidPattern`] for a pattern that does not compile.
    pub fn from_config(config: &TrackingConfig) -> Result<Self> {
        let source_name = config.source_name().to_string();
        let mode = match config.tracking_mode()? {
            MODE_FOLLOW_TIP => Mode::FollowTip { tracking_ref: config.tracking_ref()?.to_string() },
            MODE_REFS => {
                let filters = config
                    .tracking_filters()?
                    .into_iter()
                    .map(|pattern| compile(&source_name, pattern))
                    .collect::<Result<Vec<_>>>()?;
                let transforms = config
                    .tracking_transforms()?
                    .into_iter()
                    .map(|t| {
                        Ok((compile(&source_name, &t.pattern)?, expand_template(&t.replacement)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Mode::Refs { filters, transforms }
            }
            other => {
                return Err(FirehoseError::UnknownTrackingMode {
                    source_name,
                    value: other.to_string(),
                })
            }
        };
        Ok(Self { source_name, mode })
    }

    /// Name of the config this policy came from.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether `name` is a candidate under this policy.
    ///
    /// `follow-tip` wants an exact match. `refs` wants any filter to match
    /// at the start of the name; the match need not reach the end.
    #[must_use]
    pub fn interesting(&self, name: &str) -> bool {
        match &self.mode {
            Mode::FollowTip { tracking_ref } => name == tracking_ref,
            Mode::Refs { filters, .. } => filters
                .iter()
                .any(|filter| filter.find(name).is_some_and(|m| m.start() == 0)),
        }
    }

    /// Canonical name for `name`: every transform applied in order, each
    /// replacing all matches in the output of the previous one.
    #[must_use]
    pub fn rewrite(&self, name: &str) -> String {
        match &self.mode {
            Mode::FollowTip { .. } => name.to_string(),
            Mode::Refs { transforms, .. } => {
                transforms.iter().fold(name.to_string(), |current, (pattern, replacement)| {
                    pattern.replace_all(&current, replacement.as_str()).into_owned()
                })
            }
        }
    }
}

fn compile(source_name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| FirehoseError::InvalidPattern {
        source_name: source_name.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Turns a `\1` / `\g<name>` replacement into `regex` expansion syntax.
fn expand_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.next() {
                Some(first @ '0'..='9') => {
                    let mut group = String::from(first);
                    if let Some(second) = chars.next_if(char::is_ascii_digit) {
                        group.push(second);
                    }
                    let _ = write!(out, "${{{group}}}");
                }
                Some('g') if chars.peek() == Some(&'<') => {
                    chars.next();
                    let name: String = chars.by_ref().take_while(|&c| c != '>').collect();
                    let _ = write!(out, "${{{name}}}");
                }
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}
