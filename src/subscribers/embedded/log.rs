//! # LogWriter: events as `tracing` records
//!
//! A subscriber that renders every [`Event`] as a structured `tracing` record.
//! Worker verdicts log at `info`, failures and lapses at `warn`, cycle bookkeeping
//! at `debug`.
//!
//! ## Example output (fmt layer)
//! ```text
//! DEBUG keepalive: check started trigger="periodic"
//!  INFO keepalive: worker revived worker="camera" attempt=1 trigger="periodic"
//!  WARN keepalive: start failed worker="transfer" reason="start rejected by environment: ..."
//!  INFO keepalive: backoff entered worker="transfer" delay_ms=150000
//!  WARN keepalive: schedule lapsed trigger="alarm" registration="keepalive.alarm"
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("-");
        let trigger = e.trigger.map(|t| t.as_label()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::CheckStarted => {
                tracing::debug!(target: "keepalive", trigger, "check started");
            }
            EventKind::CheckCompleted => {
                if let Some(o) = &e.outcome {
                    tracing::debug!(
                        target: "keepalive",
                        trigger,
                        revived = o.revived.len(),
                        alive = o.alive.len(),
                        in_backoff = o.skipped_in_backoff.len(),
                        failed = o.failed.len(),
                        "check completed"
                    );
                }
            }
            EventKind::CheckAbandoned => {
                tracing::warn!(target: "keepalive", trigger, worker, reason, "check abandoned");
            }
            EventKind::ChecksCoalesced => {
                tracing::debug!(
                    target: "keepalive",
                    trigger,
                    folded = e.folded,
                    "checks coalesced"
                );
            }
            EventKind::WorkerAlive => {
                tracing::trace!(target: "keepalive", worker, "worker alive");
            }
            EventKind::WorkerRevived => {
                tracing::info!(
                    target: "keepalive",
                    worker,
                    attempt = e.attempt,
                    trigger,
                    "worker revived"
                );
            }
            EventKind::StartFailed => {
                tracing::warn!(target: "keepalive", worker, reason, "start failed");
            }
            EventKind::ProbeFailed => {
                tracing::warn!(target: "keepalive", worker, reason, "probe failed");
            }
            EventKind::BackoffEntered => {
                tracing::info!(
                    target: "keepalive",
                    worker,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    "backoff entered"
                );
            }
            EventKind::BackoffSkipped => {
                tracing::debug!(target: "keepalive", worker, "in backoff, skipped");
            }
            EventKind::SettlingSkipped => {
                tracing::debug!(target: "keepalive", worker, "settling, skipped");
            }
            EventKind::TriggerFired => {
                tracing::trace!(target: "keepalive", trigger, "trigger fired");
            }
            EventKind::TriggerFailed => {
                tracing::warn!(target: "keepalive", trigger, reason, "trigger failed");
            }
            EventKind::ScheduleInstalled => {
                tracing::debug!(
                    target: "keepalive",
                    trigger,
                    registration = reason,
                    "schedule installed"
                );
            }
            EventKind::ScheduleLapsed => {
                tracing::warn!(
                    target: "keepalive",
                    trigger,
                    registration = reason,
                    "schedule lapsed"
                );
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "keepalive", "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: "keepalive", "stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(target: "keepalive", "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    target: "keepalive",
                    subscriber = e.subscriber,
                    reason,
                    "subscriber overflow"
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    target: "keepalive",
                    subscriber = e.subscriber,
                    reason,
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
