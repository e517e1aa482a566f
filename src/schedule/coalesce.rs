// src/schedule/coalesce.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use super::Dispatcher;

/// Result of [`Coalescer::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new job was handed to the dispatcher.
    Scheduled,
    /// Folded into a job that has not started yet.
    Coalesced,
    /// The dispatcher refused the job; nothing will run.
    Failed,
}

/// Collapses bursts of dispatch requests into a single job.
///
/// The pending flag is raised by [`Coalescer::request`] and lowered on the
/// dispatch context right before the job runs. Requests arriving while the
/// flag is up are dropped; requests arriving while the job itself is running
/// schedule a fresh job.
pub struct Coalescer {
    dispatcher: Arc<dyn Dispatcher>,
    pending: Arc<AtomicBool>,
}

impl fmt::Debug for Coalescer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coalescer")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl Coalescer {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            dispatcher,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True between a successful request and the start of its job.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Ask for `on_dispatch` to run once on the dispatch context.
    ///
    pub fn request<F>(&self, on_dispatch: F) -> DispatchOutcome
    where
        F: FnOnce() + Send + 'static,
    {
        if self.pending.swap(true, Ordering::AcqRel) {
            debug!("dispatch already pending; coalescing request");
            return DispatchOutcome::Coalesced;
        }

        let pending = Arc::clone(&self.pending);
        let job = Box::new(move || {
            pending.store(false, Ordering::Release);
            on_dispatch();
        });

        match self.dispatcher.dispatch(job) {
            Ok(()) => DispatchOutcome::Scheduled,
            Err(err) => {
                // Nothing will ever lower the flag otherwise.
                self.pending.store(false, Ordering::Release);
                warn!(error = %err, "failed to schedule dispatch");
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Job;
    use anyhow::{Result, anyhow};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Queue {
        jobs: Mutex<VecDeque<Job>>,
        closed: AtomicBool,
    }

    impl Queue {
        fn run_one(&self) -> bool {
            let job = self.jobs.lock().unwrap().pop_front();
            match job {
                Some(job) => {
                    job();
                    true
                }
                None => false,
            }
        }
    }

    impl Dispatcher for Queue {
        fn dispatch(&self, job: Job) -> Result<()> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(anyhow!("closed"));
            }
            self.jobs.lock().unwrap().push_back(job);
            Ok(())
        }
    }

    #[test]
    fn burst_of_requests_yields_one_job() {
        let queue = Arc::new(Queue::default());
        let coalescer = Coalescer::new(queue.clone());
        let runs = Arc::new(AtomicUsize::new(0));

        for i in 0..5 {
            let runs = Arc::clone(&runs);
            let outcome = coalescer.request(move || {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            let expected = if i == 0 {
                DispatchOutcome::Scheduled
            } else {
                DispatchOutcome::Coalesced
            };
            assert_eq!(outcome, expected);
        }

        assert!(coalescer.is_pending());
        assert_eq!(queue.jobs.lock().unwrap().len(), 1);

        assert!(queue.run_one());
        assert!(!queue.run_one());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!coalescer.is_pending());
    }

    #[test]
    fn request_after_delivery_schedules_again() {
        let queue = Arc::new(Queue::default());
        let coalescer = Coalescer::new(queue.clone());

        assert_eq!(coalescer.request(|| {}), DispatchOutcome::Scheduled);
        assert!(queue.run_one());
        assert_eq!(coalescer.request(|| {}), DispatchOutcome::Scheduled);
        assert_eq!(queue.jobs.lock().unwrap().len(), 1);
    }

    #[test]
    fn failed_dispatch_does_not_wedge_the_flag() {
        let queue = Arc::new(Queue::default());
        queue.closed.store(true, Ordering::SeqCst);
        let coalescer = Coalescer::new(queue.clone());

        assert_eq!(coalescer.request(|| {}), DispatchOutcome::Failed);
        assert!(!coalescer.is_pending());

        queue.closed.store(false, Ordering::SeqCst);
        assert_eq!(coalescer.request(|| {}), DispatchOutcome::Scheduled);
    }
}
