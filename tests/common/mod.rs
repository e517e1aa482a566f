#![allow(dead_code, unused_imports)]

use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::FileTime;

pub use hotreload_test_utils::{
    CallRecorder, ManualScheduler, QueueDispatcher, eventually, init_tracing, with_timeout,
};

/// Set `path`'s modification time `secs` seconds into the future.
///
/// Explicit timestamps keep the tests independent of the host filesystem's
/// mtime resolution.
pub fn bump_mtime(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() + Duration::from_secs(secs));
}

pub fn set_mtime(path: &Path, when: SystemTime) {
    filetime::set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

/// Create `root/a/b/c/leaf.txt` plus a file at every level.
pub fn nested_tree(root: &Path) {
    let deep = root.join("a").join("b").join("c");
    std::fs::create_dir_all(&deep).unwrap();
    std::fs::write(root.join("top.txt"), b"top").unwrap();
    std::fs::write(root.join("a").join("one.txt"), b"one").unwrap();
    std::fs::write(root.join("a").join("b").join("two.txt"), b"two").unwrap();
    std::fs::write(deep.join("leaf.txt"), b"leaf").unwrap();
}
