// src/watch/watcher.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, trace, warn};

use crate::errors::{PreconditionError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::schedule::{Coalescer, DispatchOutcome, Dispatcher, ScheduleHandle, Scheduler, Tick};
use crate::types::{SeedPolicy, WatchOptions};
use crate::watch::scan::scan_tree;
use crate::watch::tracker::ModTimeTracker;

/// User callback invoked with the watched root whenever a change is seen.
pub type ChangeCallback = Arc<dyn Fn(&Path) + Send + Sync + 'static>;

/// Polling watcher for a single file or directory tree.
///
/// Every tick of the injected [`Scheduler`] runs one scan pass. When any leaf
/// turns out newer than the newest timestamp seen so far, a delivery is
/// requested through a [`Coalescer`], which runs the callback on the injected
/// [`Dispatcher`]'s context. Any number of changes detected before that
/// delivery runs collapse into one callback.
///
/// The callback always receives the watched root, never the descendant that
/// changed.
///
/// Dropping the watcher stops it; see [`Watcher::stop`].
pub struct Watcher {
    shared: Arc<Shared>,
    schedule: Box<dyn ScheduleHandle>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("path", &self.shared.path)
            .field("options", &self.shared.options)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Watcher {
    pub fn builder(path: impl Into<PathBuf>) -> WatcherBuilder {
        WatcherBuilder::new(path)
    }

    /// Construct and arm a watcher on the real filesystem.
    pub fn start<F>(
        path: impl Into<PathBuf>,
        callback: F,
        options: WatchOptions,
        scheduler: &dyn Scheduler,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self>
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        Self::builder(path)
            .callback(callback)
            .options(options)
            .start(scheduler, dispatcher)
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn options(&self) -> &WatchOptions {
        &self.shared.options
    }

    /// Newest modification time observed so far, if any leaf was readable.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.shared.tracker().last_modified()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// True while a delivery has been requested but has not started yet.
    pub fn is_pending(&self) -> bool {
        self.shared.coalescer.is_pending()
    }

    /// Run one scan pass now, on the calling thread.
    ///
    /// This is what every scheduler tick does. Embedders that drive their own
    /// loop can call it directly.
    pub fn poll(&self) {
        self.shared.poll();
    }

    /// Invoke the callback now, on the calling thread, unless stopped.
    pub fn deliver(&self) {
        self.shared.deliver();
    }

    /// Stop polling.
    ///
    /// Future ticks are cancelled and the watcher is marked inactive, so a
    /// delivery that was already queued runs without invoking the callback.
    /// A scan pass in progress on another thread is left to finish. Calling
    /// this more than once is harmless.
    pub fn stop(&self) {
        if self.shared.running.swap(false, Ordering::AcqRel) {
            info!(path = ?self.shared.path, "stopping watcher");
        }
        self.schedule.cancel();
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Step-by-step construction of a [`Watcher`].
///
/// Preconditions are checked in [`WatcherBuilder::start`]:
/// - a callback must have been supplied,
/// - the path must exist,
/// - the interval must be non-zero.
pub struct WatcherBuilder {
    path: PathBuf,
    callback: Option<ChangeCallback>,
    options: WatchOptions,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for WatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherBuilder")
            .field("path", &self.path)
            .field("has_callback", &self.callback.is_some())
            .field("options", &self.options)
            .field("fs", &self.fs)
            .finish()
    }
}

impl WatcherBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            callback: None,
            options: WatchOptions::default(),
            fs: Arc::new(RealFileSystem),
        }
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Use an already shared callback.
    pub fn shared_callback(mut self, callback: ChangeCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    pub fn interval_ms(self, millis: u64) -> Self {
        self.interval(Duration::from_millis(millis))
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.options.recursive = recursive;
        self
    }

    pub fn run_immediately(mut self, run_immediately: bool) -> Self {
        self.options.run_immediately = run_immediately;
        self
    }

    pub fn seed(mut self, seed: SeedPolicy) -> Self {
        self.options.seed = seed;
        self
    }

    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Validate, optionally run the initial scan, and register with the
    /// scheduler.
    pub fn start(self, scheduler: &dyn Scheduler, dispatcher: Arc<dyn Dispatcher>) -> Result<Watcher> {
        let callback = self.callback.ok_or(PreconditionError::MissingCallback)?;
        if !self.fs.exists(&self.path) {
            return Err(PreconditionError::PathNotFound(self.path).into());
        }
        if self.options.interval.is_zero() {
            return Err(PreconditionError::ZeroInterval.into());
        }

        let shared = Arc::new(Shared {
            path: self.path,
            callback,
            options: self.options,
            fs: self.fs,
            tracker: Mutex::new(ModTimeTracker::new()),
            coalescer: Coalescer::new(dispatcher),
            running: AtomicBool::new(true),
        });

        info!(
            path = ?shared.path,
            interval_ms = shared.options.interval.as_millis() as u64,
            recursive = shared.options.recursive,
            seed = ?shared.options.seed,
            "starting watcher"
        );

        if shared.options.run_immediately {
            shared.poll();
        }

        // The schedule must not keep the watcher alive.
        let weak: Weak<Shared> = Arc::downgrade(&shared);
        let on_tick: Tick = Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.poll();
            }
        });
        let schedule = scheduler.register(shared.options.interval, on_tick);

        Ok(Watcher { shared, schedule })
    }
}

/// State reachable from both the tick context and the dispatch context.
struct Shared {
    path: PathBuf,
    callback: ChangeCallback,
    options: WatchOptions,
    fs: Arc<dyn FileSystem>,
    tracker: Mutex<ModTimeTracker>,
    coalescer: Coalescer,
    running: AtomicBool,
}

impl Shared {
    fn tracker(&self) -> MutexGuard<'_, ModTimeTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poll(self: &Arc<Self>) {
        if !self.running.load(Ordering::Acquire) {
            return;
        }

        // The first pass has no baseline to compare against; it only seeds.
        let seeding = !self.tracker().is_seeded();

        let stats = scan_tree(self.fs.as_ref(), &self.path, self.options.recursive, |leaf, modified| {
            let advanced = self.tracker().advance(modified);
            if advanced && !seeding {
                self.request_delivery(leaf);
            }
        });

        if seeding {
            self.tracker().mark_seeded();
            if self.options.seed == SeedPolicy::Notify {
                self.request_delivery(&self.path);
            }
        }
        trace!(path = ?self.path, ?stats, "scan pass finished");
    }

    fn request_delivery(self: &Arc<Self>, changed: &Path) {
        let weak = Arc::downgrade(self);
        let outcome = self.coalescer.request(move || {
            if let Some(shared) = weak.upgrade() {
                shared.deliver();
            }
        });

        match outcome {
            DispatchOutcome::Scheduled => {
                debug!(root = ?self.path, changed = ?changed, "change detected; delivery requested");
            }
            DispatchOutcome::Coalesced => {}
            // The baseline already moved past this change, so no later
            // pass will report it again.
            DispatchOutcome::Failed => {
                warn!(
                    root = ?self.path,
                    changed = ?changed,
                    "change detected but delivery could not be scheduled; it will not be reported"
                );
            }
        }
    }

    fn deliver(&self) {
        if !self.running.load(Ordering::Acquire) {
            debug!(path = ?self.path, "watcher stopped; dropping queued delivery");
            return;
        }

        info!(path = ?self.path, "invoking change callback");
        (self.callback)(&self.path);
    }
}
