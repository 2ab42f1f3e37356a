//! Live filesystem adapter using `std::fs`.

use std::path::Path;

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LiveFileSystem;
        let path = dir.path().join("strata").join("core.morph");

        fs.write(&path, "name: core\n").unwrap();

        assert!(fs.is_dir(&dir.path().join("strata")));
        assert!(!fs.is_dir(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "name: core\n");
    }

    #[test]
    fn list_dir_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LiveFileSystem;
        for name in ["systems", "clusters", "strata"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }

        assert_eq!(fs.list_dir(dir.path()).unwrap(), vec!["clusters", "strata", "systems"]);
    }

    #[test]
    fn reading_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LiveFileSystem;
        let missing = dir.path().join("missing.yaml");
        assert!(!fs.is_dir(&missing));
        assert!(fs.read_to_string(&missing).is_err());
    }
}
