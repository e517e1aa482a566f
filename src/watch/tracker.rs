// src/watch/tracker.rs

use std::time::SystemTime;

/// Highest modification time observed across the watched tree.
///
/// The stored value only ever moves forward: a file rewound to an older
/// timestamp, or removed entirely, is never reported as a change.
#[derive(Debug, Default, Clone)]
pub struct ModTimeTracker {
    last_modified: Option<SystemTime>,
    seeded: bool,
}

impl ModTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Whether a full scan pass has completed since construction.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn mark_seeded(&mut self) {
        self.seeded = true;
    }

    /// Record `modified` if it is strictly newer than anything seen so far.
    ///
    /// Returns `true` when the stored timestamp advanced.
    pub fn advance(&mut self, modified: SystemTime) -> bool {
        match self.last_modified {
            Some(current) if modified <= current => false,
            _ => {
                self.last_modified = Some(modified);
                true
            }
        }
    }
}
