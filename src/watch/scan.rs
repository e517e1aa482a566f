// src/watch/scan.rs

//! One scan pass over a watched path.
//!
//! The walk uses an explicit stack rather than native recursion so that
//! pathologically deep trees cannot overflow the thread's stack. Each
//! directory level still costs exactly one non-recursive listing.
//!
//! Every visited path has its modification time queried first. A path whose
//! timestamp or listing cannot be read is skipped for this pass: files are
//! routinely deleted or replaced by editors between the listing and the
//! query, and the next pass will pick up whatever settled.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{trace, warn};

use crate::fs::FileSystem;

/// Counters describing a finished pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Paths compared against the baseline.
    pub leaves: usize,
    /// Directories whose children were listed.
    pub directories: usize,
    /// Paths dropped because their metadata could not be read.
    pub skipped: usize,
}

/// Walk `root` and call `on_leaf` for every leaf with its modification time.
///
/// A leaf is any non-directory, or any directory when `recursive` is false
/// (in which case its contents are never looked at). Iteration order among
/// siblings follows the filesystem listing and carries no meaning.
pub fn scan_tree<F>(fs: &dyn FileSystem, root: &Path, recursive: bool, mut on_leaf: F) -> ScanStats
where
    F: FnMut(&Path, SystemTime),
{
    let mut stats = ScanStats::default();
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(path) = stack.pop() {
        let modified = match fs.modified(&path) {
            Ok(t) => t,
            Err(err) => {
                warn!(path = ?path, error = %err, "skipping path with unreadable modification time");
                stats.skipped += 1;
                continue;
            }
        };

        if recursive && fs.is_dir(&path) {
            match fs.read_dir(&path) {
                Ok(children) => {
                    stats.directories += 1;
                    stack.extend(children);
                }
                Err(err) => {
                    warn!(path = ?path, error = %err, "skipping unreadable directory");
                    stats.skipped += 1;
                }
            }
            continue;
        }

        trace!(path = ?path, "comparing leaf");
        stats.leaves += 1;
        on_leaf(&path, modified);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::collections::BTreeSet;

    fn sample_tree() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt");
        fs.add_file("/w/sub/b.txt");
        fs.add_file("/w/sub/deeper/c.txt");
        fs.add_dir("/w/empty");
        fs
    }

    fn collect(fs: &MockFileSystem, recursive: bool) -> (BTreeSet<PathBuf>, ScanStats) {
        let mut seen = BTreeSet::new();
        let stats = scan_tree(fs, Path::new("/w"), recursive, |p, _| {
            seen.insert(p.to_path_buf());
        });
        (seen, stats)
    }

    #[test]
    fn recursive_scan_visits_every_file() {
        let fs = sample_tree();
        let (seen, stats) = collect(&fs, true);

        let expected: BTreeSet<PathBuf> = ["/w/a.txt", "/w/sub/b.txt", "/w/sub/deeper/c.txt"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(seen, expected);
        assert_eq!(stats.directories, 4);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn non_recursive_scan_treats_root_as_leaf() {
        let fs = sample_tree();
        let (seen, stats) = collect(&fs, false);

        assert_eq!(seen, BTreeSet::from([PathBuf::from("/w")]));
        assert_eq!(stats.directories, 0);
        assert_eq!(stats.leaves, 1);
    }

    #[test]
    fn unreadable_paths_are_skipped_not_fatal() {
        let fs = sample_tree();
        fs.fail_modified("/w/a.txt");
        fs.fail_read_dir("/w/sub");

        let (seen, stats) = collect(&fs, true);

        assert!(seen.is_empty());
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn very_deep_trees_do_not_recurse_natively() {
        let fs = MockFileSystem::new();
        let mut deep = PathBuf::from("/w");
        for i in 0..1_000 {
            deep.push(format!("d{i}"));
        }
        fs.add_file(deep.join("leaf.txt"));

        let (seen, stats) = collect(&fs, true);
        assert_eq!(seen.len(), 1);
        assert_eq!(stats.directories, 1_001);
    }
}
