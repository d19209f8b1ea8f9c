//! # Supervision policy: how often to check, how many restarts, how long to back off.
//!
//! [`SupervisionPolicy`] is the single immutable configuration shared read-only by the
//! supervisor and every trigger. It is parameterized by:
//! - [`SupervisionPolicy::check_interval`] cadence of the periodic in-process timer;
//! - [`SupervisionPolicy::max_restart_attempts`] starts issued before a backoff window opens;
//! - [`SupervisionPolicy::base_backoff`] unit of the backoff windows;
//! - [`SupervisionPolicy::settle`] how long a freshly started worker may stay unobservable
//!   (opt-in, off by default).
//!
//! Backoff windows are linear in the attempt count:
//! ```text
//! attempts reach max       → backoff_until = now + base_backoff × attempts
//! start issuance failed    → backoff_until = now + base_backoff / 2
//! ```
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use keepalive::SupervisionPolicy;
//!
//! let policy = SupervisionPolicy {
//!     max_restart_attempts: 3,
//!     base_backoff: Duration::from_millis(300_000),
//!     ..SupervisionPolicy::default()
//! };
//!
//! assert_eq!(policy.exhausted_backoff(3), Duration::from_millis(900_000));
//! assert_eq!(policy.failure_backoff(), Duration::from_millis(150_000));
//! ```

use std::time::Duration;

/// Smallest backoff unit; keeps every backoff window strictly in the future.
const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// Restart budget and backoff parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupervisionPolicy {
    /// Interval of the periodic in-process check.
    pub check_interval: Duration,
    /// Start issuances allowed before a backoff window is opened (min 1).
    pub max_restart_attempts: u32,
    /// Base unit of every backoff window (min 1ms).
    pub base_backoff: Duration,
    /// After a successful start, a worker that still probes dead is not started again
    /// until this much time has passed (`0` = disabled).
    pub settle: Duration,
}

impl Default for SupervisionPolicy {
    /// Returns a policy with:
    /// - `check_interval = 30s`;
    /// - `max_restart_attempts = 3`;
    /// - `base_backoff = 5min`;
    /// - `settle = 0` (disabled).
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            max_restart_attempts: 3,
            base_backoff: Duration::from_secs(300),
            settle: Duration::ZERO,
        }
    }
}

impl SupervisionPolicy {
    /// Returns the restart budget clamped to a minimum of 1.
    #[inline]
    pub fn attempt_limit(&self) -> u32 {
        self.max_restart_attempts.max(1)
    }

    /// Returns the backoff unit clamped to a minimum of 1ms.
    #[inline]
    pub fn base_backoff_clamped(&self) -> Duration {
        self.base_backoff.max(MIN_BACKOFF)
    }

    /// Window opened when the attempt count reaches the budget: `base × attempts`.
    ///
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn exhausted_backoff(&self, attempts: u32) -> Duration {
        self.base_backoff_clamped().saturating_mul(attempts.max(1))
    }

    /// Window opened immediately when the start operation itself fails: `base / 2`.
    pub fn failure_backoff(&self) -> Duration {
        (self.base_backoff_clamped() / 2).max(MIN_BACKOFF)
    }

    /// Returns the settle window as an `Option` (`None` when disabled).
    #[inline]
    pub fn settle_window(&self) -> Option<Duration> {
        if self.settle == Duration::ZERO {
            None
        } else {
            Some(self.settle)
        }
    }

    /// Returns the periodic check interval clamped to a minimum of 1ms.
    #[inline]
    pub fn check_interval_clamped(&self) -> Duration {
        self.check_interval.max(Duration::from_millis(1))
    }
}
