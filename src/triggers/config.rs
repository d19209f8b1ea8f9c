//! # Trigger configuration.
//!
//! [`TriggerConfig`] names and paces the two scheduler registrations (deferred job and
//! revival alarm) and the jitter of the in-process timer. The periodic timer's interval
//! itself comes from [`SupervisionPolicy::check_interval`](crate::SupervisionPolicy).

use std::borrow::Cow;
use std::time::Duration;

use crate::policies::JitterPolicy;

/// Settings for the external triggers.
///
/// ## Field semantics
/// - `job_every`: cadence of the deferred job (schedulers may batch or delay it)
/// - `job_min_latency`: the job never runs sooner than this after registration
/// - `job_deadline`: optional hint that the job should run no later than this (`None` = no hint)
/// - `alarm_after`: cadence of the wall-clock revival alarm
/// - `jitter`: applied to the first tick of the periodic timer
#[derive(Clone, Debug)]
pub struct TriggerConfig {
    /// Registration name of the deferred job (unique within a scheduler).
    pub job_name: Cow<'static, str>,
    /// Cadence of the deferred job.
    pub job_every: Duration,
    /// Minimum latency before the deferred job's first run.
    pub job_min_latency: Duration,
    /// Optional "run no later than" hint for the deferred job.
    pub job_deadline: Option<Duration>,
    /// Registration name of the revival alarm.
    pub alarm_name: Cow<'static, str>,
    /// Cadence of the revival alarm.
    pub alarm_after: Duration,
    /// Jitter for the periodic timer's first tick.
    pub jitter: JitterPolicy,
}

impl Default for TriggerConfig {
    /// Default configuration:
    ///
    /// - deferred job `keepalive.deferred` every 15min, min latency 1min, no deadline
    /// - alarm `keepalive.alarm` every 15min
    /// - equal jitter on the periodic timer's first tick
    fn default() -> Self {
        Self {
            job_name: Cow::Borrowed("keepalive.deferred"),
            job_every: Duration::from_secs(15 * 60),
            job_min_latency: Duration::from_secs(60),
            job_deadline: None,
            alarm_name: Cow::Borrowed("keepalive.alarm"),
            alarm_after: Duration::from_secs(15 * 60),
            jitter: JitterPolicy::Equal,
        }
    }
}

impl TriggerConfig {
    /// Deferred job cadence clamped to a minimum of 1ms.
    #[inline]
    pub fn job_every_clamped(&self) -> Duration {
        self.job_every.max(Duration::from_millis(1))
    }

    /// Alarm cadence clamped to a minimum of 1ms.
    #[inline]
    pub fn alarm_after_clamped(&self) -> Duration {
        self.alarm_after.max(Duration::from_millis(1))
    }
}
