// src/schedule/mod.rs

//! Execution contexts the watcher runs on.
//!
//! A watcher never owns a thread or an event loop. It is handed two
//! collaborators:
//! - a [`Scheduler`] that calls a tick function on a fixed interval until
//!   the returned [`ScheduleHandle`] is cancelled, and
//! - a [`Dispatcher`] that runs a job once on its own context, separate
//!   from the ticking context.
//!
//! [`Coalescer`] sits on top of a dispatcher and guarantees at most one
//! undelivered job per watcher. The tokio-backed implementations used in
//! production live in [`runtime`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub mod coalesce;
pub mod runtime;

pub use coalesce::{Coalescer, DispatchOutcome};
pub use runtime::{TokioDispatcher, TokioScheduler};

/// Function invoked on every scheduler tick.
pub type Tick = Arc<dyn Fn() + Send + Sync + 'static>;

/// One-shot unit of work for a dispatcher.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Periodic timer facility.
pub trait Scheduler: Send + Sync {
    /// Invoke `on_tick` every `interval` until the handle is cancelled.
    ///
    /// The first tick happens one full interval after registration.
    fn register(&self, interval: Duration, on_tick: Tick) -> Box<dyn ScheduleHandle>;
}

/// Registration returned by [`Scheduler::register`].
pub trait ScheduleHandle: Send + Sync {
    /// Stop future ticks. Calling this more than once is a no-op.
    ///
    /// A tick that is already running is not interrupted.
    fn cancel(&self);
}

/// Deferred execution facility.
pub trait Dispatcher: Send + Sync {
    /// Run `job` exactly once on a future turn of the dispatch context.
    ///
    /// Fails when the context has shut down and the job can never run.
    fn dispatch(&self, job: Job) -> Result<()>;
}
