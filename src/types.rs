// src/types.rs

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Default poll interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// What the very first scan pass does once it has established a baseline.
///
/// - `Silent`: the first pass only records the newest modification time seen
///   in the tree. A stable tree never fires a callback on startup. A path
///   that could not be read during that pass is not part of the baseline: if
///   it later becomes readable with a newer timestamp, it is reported once.
/// - `Notify`: the first pass also requests one delivery, so the embedding
///   application gets a "load now" call without waiting for an edit. This
///   holds for an empty directory too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedPolicy {
    Silent,
    Notify,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::Silent
    }
}

impl FromStr for SeedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Ok(SeedPolicy::Silent),
            "notify" => Ok(SeedPolicy::Notify),
            other => Err(format!(
                "invalid seed policy: {other} (expected \"silent\" or \"notify\")"
            )),
        }
    }
}

/// Tunables for a single watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Time between two scan passes.
    pub interval: Duration,
    /// Descend into directories. When false a directory is compared by its
    /// own modification time only.
    pub recursive: bool,
    /// Run one synchronous scan pass during construction, before the first
    /// scheduled tick.
    pub run_immediately: bool,
    pub seed: SeedPolicy,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            recursive: true,
            run_immediately: true,
            seed: SeedPolicy::default(),
        }
    }
}
