//! # Jitter policy for trigger cadences.
//!
//! [`JitterPolicy`] randomizes the first firing of periodic triggers so that the
//! in-process timer, deferred jobs and alarms of several processes (or of one process
//! restarted in a loop) do not fire in lockstep.
//!
//! - [`JitterPolicy::None`] no randomization, first firing after the full period
//! - [`JitterPolicy::Full`] first firing in `[0, period]`
//! - [`JitterPolicy::Equal`] first firing in `[period/2, period]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of trigger offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact period.
    #[default]
    None,

    /// Random offset in `[0, period]`.
    ///
    /// Spreads the most, may fire almost immediately.
    Full,

    /// Random offset in `[period/2, period]`.
    ///
    /// Keeps at least half the period between process start and first firing.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given period.
    pub fn apply(&self, period: Duration) -> Duration {
        match self {
            JitterPolicy::None => period,
            JitterPolicy::Full => full_jitter(period),
            JitterPolicy::Equal => equal_jitter(period),
        }
    }
}

/// random[0, period]
fn full_jitter(period: Duration) -> Duration {
    let ms = period.as_millis().min(u128::from(u64::MAX)) as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

/// period/2 + random[0, period/2]
fn equal_jitter(period: Duration) -> Duration {
    let ms = period.as_millis().min(u128::from(u64::MAX)) as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(half + jitter)
}
