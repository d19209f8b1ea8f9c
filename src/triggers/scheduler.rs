//! # Scheduler seam for deferred jobs and alarms.
//!
//! Deferred jobs and revival alarms are handed to something outside the supervisor's own
//! timers: an OS job service, an alarm manager, a cron-like daemon. [`Scheduler`] is that
//! seam. A registration is identified by name; registering an existing name replaces it.
//!
//! [`LocalScheduler`](crate::LocalScheduler) implements the seam on tokio timers.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SchedulingError;

/// What a job callback reports back to its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCompletion {
    /// Work done; run again at the normal cadence.
    Success,
    /// Could not do the work; the scheduler should retry sooner.
    Retry,
}

/// Callback invoked by the scheduler; must return quickly.
pub type JobCallback = Arc<dyn Fn() -> JobCompletion + Send + Sync>;

/// When a registration runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Batched periodic job.
    Periodic {
        /// Period between runs.
        every: Duration,
        /// Never runs sooner than this after registration.
        min_latency: Duration,
        /// Optional "run no later than" hint.
        deadline: Option<Duration>,
    },
    /// Repeating wall-clock alarm that wakes the host.
    Alarm {
        /// Period between alarms.
        every: Duration,
    },
}

/// A named, scheduled callback.
#[derive(Clone)]
pub struct Registration {
    /// Unique name within the scheduler.
    pub name: Cow<'static, str>,
    /// When it runs.
    pub cadence: Cadence,
    /// What runs.
    pub callback: JobCallback,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("cadence", &self.cadence)
            .finish_non_exhaustive()
    }
}

/// External scheduling mechanism.
pub trait Scheduler: Send + Sync + 'static {
    /// Installs `registration`, replacing any registration with the same name.
    fn register(&self, registration: Registration) -> Result<(), SchedulingError>;

    /// True if a registration with `name` is currently installed.
    fn is_registered(&self, name: &str) -> bool;

    /// Removes a registration; returns false if it was not installed.
    fn cancel(&self, name: &str) -> bool;
}
