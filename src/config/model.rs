// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{DEFAULT_INTERVAL_MS, SeedPolicy, WatchOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// path = "assets"
/// interval_ms = 250
/// recursive = true
/// run_immediately = true
/// notify_on_seed = false
///
/// [on_change]
/// cmd = "make reload"
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub on_change: OnChangeSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// File or directory to watch. Usually given on the command line instead.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Run one scan pass at startup instead of waiting a full interval.
    #[serde(default = "default_true")]
    pub run_immediately: bool,

    /// Fire the command once for the startup scan.
    #[serde(default)]
    pub notify_on_seed: bool,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_true() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            path: None,
            interval_ms: default_interval_ms(),
            recursive: true,
            run_immediately: true,
            notify_on_seed: false,
        }
    }
}

/// `[on_change]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnChangeSection {
    /// Shell command run after every detected change.
    #[serde(default)]
    pub cmd: Option<String>,
}

/// Validated configuration.
///
/// Constructed via `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: Option<PathBuf>,
    options: WatchOptions,
    command: Option<String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        let seed = if raw.watch.notify_on_seed {
            SeedPolicy::Notify
        } else {
            SeedPolicy::Silent
        };

        Self {
            path: raw.watch.path.map(PathBuf::from),
            options: WatchOptions {
                interval: Duration::from_millis(raw.watch.interval_ms),
                recursive: raw.watch.recursive,
                run_immediately: raw.watch.run_immediately,
                seed,
            },
            command: raw.on_change.cmd.map(|c| c.trim().to_string()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}
