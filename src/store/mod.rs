//! Morphology store: `*.morph` files of a checkout, read and written through
//! the `FileSystem` port.
//!
//! Morphologies are found by walking the checkout, skipping hidden
//! directories such as `.git`:
//!
//! ```text
//! <checkout>/
//!   ├── strata/core.morph
//!   ├── strata/bsp-x86_64.morph
//!   └── systems/devel-system-x86_64.morph
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::morph::Morphology;
use crate::ports::{FileSystem, MorphologyStore};

const MORPH_EXTENSION: &str = "morph";

/// Persistence layer for the morphologies of one checkout.
///
/// All I/O goes through `fs` so that the store can be exercised against an
/// in-memory tree.
pub struct FileMorphologyStore<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    repo_url: String,
}

impl<'a> FileMorphologyStore<'a> {
    /// Creates a store for the checkout at `root`, which holds `repo_url`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, root: &Path, repo_url: impl Into<String>) -> Self {
        Self { fs, root: root.to_path_buf(), repo_url: repo_url.into() }
    }

    /// Relative paths of every morphology file under the root, sorted.
    fn morph_files(&self) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
        let mut found = Vec::new();
        let mut pending = vec![PathBuf::new()];
        while let Some(relative) = pending.pop() {
            let dir = self.root.join(&relative);
            for name in self.fs.list_dir(&dir)? {
                if name.starts_with('.') {
                    continue;
                }
                let child = relative.join(&name);
                if self.fs.is_dir(&self.root.join(&child)) {
                    pending.push(child);
                } else if child.extension().is_some_and(|ext| ext == MORPH_EXTENSION) {
                    found.push(child);
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

impl MorphologyStore for FileMorphologyStore<'_> {
    fn load_all(&self) -> Result<Vec<Morphology>, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.morph_files()?;
        debug!(root = %self.root.display(), count = files.len(), "found morphologies");
        files
            .into_iter()
            .map(|relative| -> Result<Morphology, Box<dyn std::error::Error + Send + Sync>> {
                let text = self
                    .fs
                    .read_to_string(&self.root.join(&relative))
                    .map_err(|e| format!("Failed to read {}: {e}", relative.display()))?;
                Ok(Morphology::from_yaml(self.repo_url.clone(), relative, &text)?)
            })
            .collect()
    }

    fn save(&self, morph: &Morphology) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let yaml = morph
            .to_yaml()
            .map_err(|e| format!("Failed to serialize {}: {e}", morph.filename().display()))?;
        let path = self.root.join(morph.filename());
        self.fs
            .write(&path, &yaml)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()).into())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory filesystem for testing without touching disk.
    #[derive(Default)]
    pub(crate) struct MemFs {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    impl MemFs {
        pub(crate) fn with(self, path: &str, contents: &str) -> Self {
            self.files.lock().unwrap().insert(PathBuf::from(path), contents.to_string());
            self
        }

        pub(crate) fn get(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(Path::new(path)).cloned()
        }
    }

    impl FileSystem for MemFs {
        fn read_to_string(
            &self,
            path: &Path,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            let files = self.files.lock().unwrap();
            files
                .get(path)
                .cloned()
                .ok_or_else(|| format!("File not found: {}", path.display()).into())
        }

        fn write(
            &self,
            path: &Path,
            contents: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let mut files = self.files.lock().unwrap();
            files.insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }

        fn is_dir(&self, path: &Path) -> bool {
            let files = self.files.lock().unwrap();
            files.keys().any(|k| k.starts_with(path) && k != path)
        }

        fn list_dir(
            &self,
            path: &Path,
        ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
            let files = self.files.lock().unwrap();
            let mut names: Vec<String> = files
                .keys()
                .filter_map(|k| k.strip_prefix(path).ok())
                .filter_map(|rest| rest.components().next())
                .map(|first| first.as_os_str().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names.dedup();
            Ok(names)
        }
    }

    fn checkout() -> MemFs {
        MemFs::default()
            .with("/ws/defs/strata/core.morph", "name: core\nkind: stratum\nchunks: []\n")
            .with("/ws/defs/strata/bsp.morph", "name: bsp\nkind: stratum\nchunks: []\n")
            .with("/ws/defs/systems/devel.morph", "name: devel\nkind: system\nstrata: []\n")
            .with("/ws/defs/README", "not a morphology\n")
            .with("/ws/defs/.git/stale.morph", "name: stale\nkind: chunk\n")
    }

    #[test]
    fn load_all_walks_checkout_in_sorted_order() {
        let fs = checkout();
        let store = FileMorphologyStore::new(&fs, Path::new("/ws/defs"), "baserock:definitions");
        let morphs = store.load_all().unwrap();

        let names: Vec<&str> = morphs.iter().map(Morphology::name).collect();
        assert_eq!(names, vec!["bsp", "core", "devel"]);
        assert_eq!(morphs[0].filename(), Path::new("strata/bsp.morph"));
        assert_eq!(morphs[0].repo_url(), "baserock:definitions");
    }

    #[test]
    fn load_all_rejects_broken_morphology() {
        let fs = checkout().with("/ws/defs/strata/broken.morph", "kind: stratum\n");
        let store = FileMorphologyStore::new(&fs, Path::new("/ws/defs"), "defs");
        let err = store.load_all().unwrap_err();
        assert!(err.to_string().contains("strata/broken.morph"));
    }

    #[test]
    fn save_writes_back_to_the_loaded_path() {
        let fs = checkout();
        let store = FileMorphologyStore::new(&fs, Path::new("/ws/defs"), "defs");
        let morphs = store.load_all().unwrap();

        store.save(&morphs[1]).unwrap();
        let written = fs.get("/ws/defs/strata/core.morph").unwrap();
        assert_eq!(written, "name: core\nkind: stratum\nchunks: []\n");
    }
}
