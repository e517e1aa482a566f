use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotreload::schedule::{Dispatcher, Job, ScheduleHandle, Scheduler, Tick};

struct Registration {
    interval: Duration,
    on_tick: Tick,
    cancelled: Arc<AtomicBool>,
}

/// A scheduler that only ticks when the test says so.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    registrations: Arc<Mutex<Vec<Registration>>>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("live", &self.live())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every registration that has not been cancelled.
    ///
    /// Returns how many tick functions ran.
    pub fn tick(&self) -> usize {
        let ticks: Vec<Tick> = self
            .registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.cancelled.load(Ordering::SeqCst))
            .map(|r| Arc::clone(&r.on_tick))
            .collect();

        for tick in &ticks {
            tick();
        }
        ticks.len()
    }

    /// Number of registrations still active.
    pub fn live(&self) -> usize {
        self.registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Intervals requested so far, in registration order.
    pub fn intervals(&self) -> Vec<Duration> {
        self.registrations
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.interval)
            .collect()
    }
}

struct ManualHandle {
    cancelled: Arc<AtomicBool>,
}

impl ScheduleHandle for ManualHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Scheduler for ManualScheduler {
    fn register(&self, interval: Duration, on_tick: Tick) -> Box<dyn ScheduleHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.registrations.lock().unwrap().push(Registration {
            interval,
            on_tick,
            cancelled: Arc::clone(&cancelled),
        });
        Box::new(ManualHandle { cancelled })
    }
}

/// A dispatcher that queues jobs until the test drains them.
#[derive(Clone, Default)]
pub struct QueueDispatcher {
    jobs: Arc<Mutex<VecDeque<Job>>>,
}

impl fmt::Debug for QueueDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueDispatcher")
            .field("queued", &self.queued())
            .finish()
    }
}

impl QueueDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Run queued jobs, including any enqueued while draining.
    ///
    /// Returns how many jobs ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = self.jobs.lock().unwrap().pop_front();
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, job: Job) -> anyhow::Result<()> {
        self.jobs.lock().unwrap().push_back(job);
        Ok(())
    }
}
