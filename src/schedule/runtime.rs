// src/schedule/runtime.rs

//! Tokio-backed scheduler and dispatcher.
//!
//! - [`TokioScheduler`] drives each registration from its own async task.
//!   The tick function runs on the blocking pool and is awaited before the
//!   next tick is considered, so a slow directory walk pushes the cadence
//!   out to "interval + scan time" instead of piling up overlapping scans.
//! - [`TokioDispatcher`] owns one blocking worker that runs jobs in order.
//!   Callbacks therefore never overlap, and a panicking callback is logged
//!   and contained instead of tearing down the worker.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::{Dispatcher, Job, ScheduleHandle, Scheduler, Tick};

/// Periodic scheduler running on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the calling context.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| anyhow!("no tokio runtime: {e}"))?;
        Ok(Self::new(handle))
    }
}

impl Scheduler for TokioScheduler {
    fn register(&self, interval: Duration, on_tick: Tick) -> Box<dyn ScheduleHandle> {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        // tokio panics on a zero period.
        let interval = interval.max(Duration::from_millis(1));

        let task = self.handle.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let tick = on_tick.clone();
                        if let Err(err) = tokio::task::spawn_blocking(move || tick()).await {
                            warn!(error = %err, "poll tick did not complete");
                        }
                    }
                    // Fires on explicit cancel and when the handle is dropped.
                    _ = &mut cancel_rx => break,
                }
            }

            debug!("poll schedule stopped");
        });

        Box::new(TokioScheduleHandle {
            cancel: Mutex::new(Some(cancel_tx)),
            _task: task,
        })
    }
}

struct TokioScheduleHandle {
    cancel: Mutex<Option<oneshot::Sender<()>>>,
    _task: JoinHandle<()>,
}

impl ScheduleHandle for TokioScheduleHandle {
    fn cancel(&self) {
        let sender = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = sender {
            let _ = tx.send(());
        }
    }
}

/// Serial dispatcher backed by a single tokio blocking worker.
///
/// The worker exits once every clone of the sender (i.e. the dispatcher) is
/// dropped and the queue has drained.
pub struct TokioDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl fmt::Debug for TokioDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioDispatcher")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl TokioDispatcher {
    pub fn new(handle: &Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        handle.spawn_blocking(move || {
            while let Some(job) = rx.blocking_recv() {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!("change callback panicked; dispatch worker keeps running");
                }
            }
            debug!("dispatch worker finished");
        });

        Self { tx }
    }

    /// Bind to the runtime of the calling context.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| anyhow!("no tokio runtime: {e}"))?;
        Ok(Self::new(&handle))
    }
}

impl Dispatcher for TokioDispatcher {
    fn dispatch(&self, job: Job) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| anyhow!("dispatch worker has shut down"))
    }
}
