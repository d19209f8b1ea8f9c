//! # Runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the supervisor and its triggers.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `SupervisorBuilder::new(config)`
//! 2. **Trigger wiring**: `TriggerSet::new(cell, scheduler, &config)`
//!
//! ## Sentinel values
//! - `cycle_timeout = 0s` → no per-cycle budget
//! - `grace = 0s` → shutdown does not wait for an in-flight cycle

use std::time::Duration;

use crate::policies::SupervisionPolicy;
use crate::triggers::TriggerConfig;

/// Global configuration for the keepalive runtime.
///
/// ## Field semantics
/// - `policy`: restart budget, backoff unit, check interval, settle window
/// - `cycle_timeout`: wall-clock budget of one `check_and_restart` (`0s` = unbounded)
/// - `grace`: how long shutdown waits for an in-flight cycle
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `check_queue`: pending check requests before new ones are folded (min 1)
/// - `triggers`: deferred job / alarm / jitter settings
///
/// ## Notes
/// All fields are public. Prefer the accessors to sprinkling sentinel checks around.
#[derive(Clone, Debug)]
pub struct Config {
    /// Supervision policy shared by the ledger and the periodic trigger.
    pub policy: SupervisionPolicy,

    /// Budget for one supervision cycle.
    ///
    /// A probe still pending when the budget runs out abandons the rest of the cycle;
    /// a start still pending counts as a failed start.
    pub cycle_timeout: Duration,

    /// Maximum time shutdown waits for an in-flight cycle to finish.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow receivers lagging more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Capacity of the check request queue in front of the supervisor.
    ///
    /// When full, new fire-and-forget requests are dropped: the queued ones already
    /// guarantee a cycle will run.
    pub check_queue: usize,

    /// External trigger settings.
    pub triggers: TriggerConfig,
}

impl Config {
    /// Returns the cycle budget as an `Option` (`None` = unbounded).
    #[inline]
    pub fn cycle_budget(&self) -> Option<Duration> {
        if self.cycle_timeout == Duration::ZERO {
            None
        } else {
            Some(self.cycle_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a check queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn check_queue_clamped(&self) -> usize {
        self.check_queue.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `policy = SupervisionPolicy::default()` (30s checks, 3 attempts, 5min base)
    /// - `cycle_timeout = 5s`
    /// - `grace = 10s`
    /// - `bus_capacity = 1024`
    /// - `check_queue = 16`
    /// - `triggers = TriggerConfig::default()`
    fn default() -> Self {
        Self {
            policy: SupervisionPolicy::default(),
            cycle_timeout: Duration::from_secs(5),
            grace: Duration::from_secs(10),
            bus_capacity: 1024,
            check_queue: 16,
            triggers: TriggerConfig::default(),
        }
    }
}
