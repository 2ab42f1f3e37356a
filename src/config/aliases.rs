//! Repository alias expansion (`upstream:linux` style URLs).

use std::collections::BTreeMap;

/// Maps short repository prefixes to URL templates.
///
/// A template containing `%s` has the remainder substituted in place;
/// otherwise the remainder is appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoAliases {
    templates: BTreeMap<String, String>,
}

impl RepoAliases {
    /// Builds aliases from `PREFIX=TEMPLATE` entries.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the first malformed entry.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut templates = BTreeMap::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let (prefix, template) = entry
                .split_once('=')
                .filter(|(prefix, template)| !prefix.is_empty() && !template.is_empty())
                .ok_or_else(|| format!("Invalid repo alias {entry:?}: expected PREFIX=URL"))?;
            templates.insert(prefix.to_string(), template.to_string());
        }
        Ok(Self { templates })
    }

    /// Expands `repo` if it starts with a known `prefix:`.
    #[must_use]
    pub fn expand(&self, repo: &str) -> String {
        let Some((prefix, rest)) = repo.split_once(':') else {
            return repo.to_string();
        };
        match self.templates.get(prefix) {
            Some(template) if template.contains("%s") => template.replacen("%s", rest, 1),
            Some(template) => format!("{template}{rest}"),
            None => repo.to_string(),
        }
    }
}
