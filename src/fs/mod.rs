// src/fs/mod.rs

//! Filesystem facility used by the scanner.
//!
//! The watcher only ever needs four primitives: an existence check, a
//! directory check, the last modification time of a path and a
//! non-recursive child listing. Keeping them behind a trait lets tests run
//! the whole detection pipeline against [`mock::MockFileSystem`] with fully
//! controlled timestamps.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Last modification time of `path`.
    ///
    /// Errors are expected during normal operation (a file removed by an
    /// editor between listing and querying) and callers treat them as
    /// transient.
    fn modified(&self, path: &Path) -> Result<SystemTime>;

    /// Return the immediate children of a directory, files and
    /// subdirectories alike. Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let meta = fs::metadata(path).with_context(|| format!("reading metadata of {:?}", path))?;
        meta.modified()
            .with_context(|| format!("reading modification time of {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry of {:?}", path))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_fs_lists_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let fs = RealFileSystem;
        let mut children = fs.read_dir(dir.path()).unwrap();
        children.sort();

        assert_eq!(
            children,
            vec![dir.path().join("a.txt"), dir.path().join("sub")]
        );
        assert!(fs.is_dir(&dir.path().join("sub")));
        assert!(!fs.is_dir(&dir.path().join("a.txt")));
    }

    #[test]
    fn real_fs_reports_missing_paths_as_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let fs = RealFileSystem;
        assert!(!fs.exists(&missing));
        assert!(fs.modified(&missing).is_err());
        assert!(fs.read_dir(&missing).is_err());
    }
}
