//! Flat on-disk storage for generated files
//!
//! All output lands in a single root directory under names produced by
//! [`crate::naming`]. Writes overwrite silently; when two generations
//! resolve to the same filename the last writer wins and the metadata rows
//! keep pointing at the shared path.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Directory-backed store for rendered output.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens the storage root, creating it if necessary.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<FileStorage> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(FileStorage { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Writes `bytes` under `filename` and returns the full path.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(filename);
        std::fs::write(&path, bytes)?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Removes a stored file, reporting failures without raising them.
    /// Metadata cleanup proceeds even when the file is already gone.
    pub fn remove(&self, path: &Path) -> bool {
        match std::fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("file already missing: {}", path.display());
                false
            }
            Err(e) => {
                warn!("could not remove {}: {}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_persists_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("generated")).unwrap();

        let path = storage.write("a.docx", b"contents").unwrap();
        assert_eq!(path, storage.path_for("a.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"contents");
    }

    #[test]
    fn write_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.write("a.docx", b"old").unwrap();
        let path = storage.write("a.docx", b"new").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }

    #[test]
    fn remove_reports_missing_files_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let path = storage.write("a.docx", b"contents").unwrap();
        assert!(storage.remove(&path));
        assert!(!path.exists());
        assert!(!storage.remove(&path));
    }
}
