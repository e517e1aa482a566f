// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Clone)]
struct MockNode {
    entry: MockEntry,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct MockState {
    nodes: HashMap<PathBuf, MockNode>,
    /// Paths whose modification time query fails, simulating a file that
    /// vanished or became unreadable mid-scan.
    failing: HashSet<PathBuf>,
    /// Paths whose listing fails.
    unlistable: HashSet<PathBuf>,
    clock: u64,
}

/// In-memory filesystem with a logical clock.
///
/// Every mutation stamps the touched entry with a fresh, strictly increasing
/// modification time, so tests never depend on the resolution of the host
/// filesystem's timestamps.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

/// Base of the logical clock; whole seconds after the epoch.
const CLOCK_BASE_SECS: u64 = 1_700_000_000;

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir(Vec::new()));
    }

    /// Bump the modification time of an existing entry.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        let now = state.tick();
        if let Some(node) = state.nodes.get_mut(path.as_ref()) {
            node.modified = now;
        }
    }

    /// Force a specific modification time (e.g. to move a file back in time).
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut state = self.state();
        if let Some(node) = state.nodes.get_mut(path.as_ref()) {
            node.modified = modified;
        }
    }

    /// Remove an entry and everything below it. The parent directory's
    /// modification time advances, as it would on a real filesystem.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state();
        state.nodes.retain(|p, _| !p.starts_with(path));

        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let now = state.tick();
            if let Some(node) = state.nodes.get_mut(parent) {
                if let MockEntry::Dir(children) = &mut node.entry {
                    children.retain(|c| c.as_str() != name.to_string_lossy());
                }
                node.modified = now;
            }
        }
    }

    /// Make `modified` fail for this path until [`Self::heal`] is called.
    pub fn fail_modified(&self, path: impl AsRef<Path>) {
        self.state().failing.insert(path.as_ref().to_path_buf());
    }

    /// Make `read_dir` fail for this path until [`Self::heal`] is called.
    pub fn fail_read_dir(&self, path: impl AsRef<Path>) {
        self.state().unlistable.insert(path.as_ref().to_path_buf());
    }

    pub fn heal(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        state.failing.remove(path.as_ref());
        state.unlistable.remove(path.as_ref());
    }

    /// Modification time currently recorded for `path`, if present.
    pub fn modified_of(&self, path: impl AsRef<Path>) -> Option<SystemTime> {
        self.state().nodes.get(path.as_ref()).map(|n| n.modified)
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut state = self.state();
        let now = state.tick();
        let is_new = !state.nodes.contains_key(path);
        state.nodes.insert(
            path.to_path_buf(),
            MockNode {
                entry,
                modified: now,
            },
        );
        if is_new {
            state.link_to_parent(path, now);
        }
    }
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(CLOCK_BASE_SECS + self.clock)
    }

    /// Register `path` with its parent, creating missing ancestors on the way.
    fn link_to_parent(&mut self, path: &Path, now: SystemTime) {
        let Some(parent) = path.parent() else {
            return;
        };
        if parent.as_os_str().is_empty() || parent == path {
            return;
        }

        if !self.nodes.contains_key(parent) {
            self.nodes.insert(
                parent.to_path_buf(),
                MockNode {
                    entry: MockEntry::Dir(Vec::new()),
                    modified: now,
                },
            );
            self.link_to_parent(parent, now);
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            if let (MockEntry::Dir(children), Some(name)) = (&mut node.entry, path.file_name()) {
                let name = name.to_string_lossy().into_owned();
                if !children.contains(&name) {
                    children.push(name);
                }
            }
            node.modified = now;
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.state().nodes.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.state().nodes.get(path),
            Some(MockNode {
                entry: MockEntry::Dir(_),
                ..
            })
        )
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let state = self.state();
        if state.failing.contains(path) {
            return Err(anyhow!("Injected failure reading mtime of {:?}", path));
        }
        state
            .nodes
            .get(path)
            .map(|n| n.modified)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state();
        if state.unlistable.contains(path) {
            return Err(anyhow!("Injected failure listing {:?}", path));
        }
        match state.nodes.get(path) {
            Some(MockNode {
                entry: MockEntry::Dir(children),
                ..
            }) => Ok(children.iter().map(|name| path.join(name)).collect()),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_file_creates_parents_and_bumps_their_mtime() {
        let fs = MockFileSystem::new();
        fs.add_dir("/root");
        let before = fs.modified_of("/root").unwrap();

        fs.add_file("/root/a/b/c.txt");

        assert!(fs.is_dir(Path::new("/root/a")));
        assert!(fs.is_dir(Path::new("/root/a/b")));
        assert_eq!(
            fs.read_dir(Path::new("/root/a/b")).unwrap(),
            vec![PathBuf::from("/root/a/b/c.txt")]
        );
        assert!(fs.modified_of("/root").unwrap() > before);
    }

    #[test]
    fn touch_only_advances_the_touched_entry() {
        let fs = MockFileSystem::new();
        fs.add_file("/root/a.txt");
        let dir_before = fs.modified_of("/root").unwrap();
        let file_before = fs.modified_of("/root/a.txt").unwrap();

        fs.touch("/root/a.txt");

        assert!(fs.modified_of("/root/a.txt").unwrap() > file_before);
        assert_eq!(fs.modified_of("/root").unwrap(), dir_before);
    }

    #[test]
    fn injected_failures_are_reported_until_healed() {
        let fs = MockFileSystem::new();
        fs.add_file("/root/a.txt");
        fs.fail_modified("/root/a.txt");
        fs.fail_read_dir("/root");

        assert!(fs.modified(Path::new("/root/a.txt")).is_err());
        assert!(fs.read_dir(Path::new("/root")).is_err());

        fs.heal("/root/a.txt");
        fs.heal("/root");
        assert!(fs.modified(Path::new("/root/a.txt")).is_ok());
        assert!(fs.read_dir(Path::new("/root")).is_ok());
    }

    #[test]
    fn remove_drops_subtree() {
        let fs = MockFileSystem::new();
        fs.add_file("/root/sub/a.txt");
        fs.remove("/root/sub");

        assert!(!fs.exists(Path::new("/root/sub")));
        assert!(!fs.exists(Path::new("/root/sub/a.txt")));
        assert!(fs.read_dir(Path::new("/root")).unwrap().is_empty());
    }
}
