// src/watch/mod.rs

//! Polling change detection.
//!
//! This module is responsible for:
//! - Walking the watched path and reading modification times ([`scan`]).
//! - Tracking the newest timestamp seen so far ([`tracker`]).
//! - Turning an advance of that timestamp into one coalesced callback
//!   delivery ([`watcher`]).
//!
//! Detection is mtime-only; file contents are never read.

pub mod scan;
pub mod tracker;
pub mod watcher;

pub use scan::{ScanStats, scan_tree};
pub use tracker::ModTimeTracker;
pub use watcher::{ChangeCallback, Watcher, WatcherBuilder};
