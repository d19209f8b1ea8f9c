//! # Events emitted by the supervisor, its coordinator and the triggers.
//!
//! The [`EventKind`] enum classifies events across four categories:
//! - **Cycle events**: one supervision pass (started, completed, abandoned, coalesced)
//! - **Worker events**: per-worker verdicts (alive, revived, start failed, backoff)
//! - **Trigger events**: activation sources and their OS registrations
//! - **Runtime events**: shutdown and subscriber health
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use keepalive::{Event, EventKind, TriggerKind};
//!
//! let ev = Event::new(EventKind::BackoffEntered)
//!     .with_worker("camera")
//!     .with_trigger(TriggerKind::Alarm)
//!     .with_attempt(3)
//!     .with_delay(Duration::from_secs(900));
//!
//! assert_eq!(ev.kind, EventKind::BackoffEntered);
//! assert_eq!(ev.worker.as_deref(), Some("camera"));
//! assert_eq!(ev.delay_ms, Some(900_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::SupervisionOutcome;
use crate::triggers::TriggerKind;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Cycle events ===
    /// A supervision cycle is starting.
    ///
    /// Sets: `trigger`.
    CheckStarted,

    /// A supervision cycle finished.
    ///
    /// Sets: `trigger`, `outcome`.
    CheckCompleted,

    /// A cycle ran out of its time budget; the remaining workers were not examined.
    ///
    /// Sets: `trigger`, `worker` (first worker left unexamined), `reason`.
    CheckAbandoned,

    /// Several queued check requests were served by one cycle.
    ///
    /// Sets: `trigger` (the one that ran), `folded` (requests served by that cycle besides it).
    ChecksCoalesced,

    // === Worker events ===
    /// Worker observed alive; its restart bookkeeping was reset.
    ///
    /// Sets: `worker`.
    WorkerAlive,

    /// Start issued for a dead worker.
    ///
    /// Sets: `worker`, `attempt` (count after this start), `trigger`.
    WorkerRevived,

    /// The start operation failed; a short backoff follows.
    ///
    /// Sets: `worker`, `reason`.
    StartFailed,

    /// Liveness introspection failed; the worker is treated as dead.
    ///
    /// Sets: `worker`, `reason`.
    ProbeFailed,

    /// A backoff window opened for a worker.
    ///
    /// Sets: `worker`, `attempt`, `delay_ms`.
    BackoffEntered,

    /// Worker skipped because it is inside its backoff window.
    ///
    /// Sets: `worker`.
    BackoffSkipped,

    /// Worker skipped because it was started moments ago and may not be observable yet.
    ///
    /// Sets: `worker`.
    SettlingSkipped,

    // === Trigger events ===
    /// A trigger fired and requested a check.
    ///
    /// Sets: `trigger`.
    TriggerFired,

    /// A trigger could not reach the supervisor or its handler failed.
    ///
    /// Sets: `trigger`, `reason`.
    TriggerFailed,

    /// A trigger's OS-level registration was installed (or reinstalled).
    ///
    /// Sets: `trigger`, `reason` (registration name).
    ScheduleInstalled,

    /// A trigger's OS-level registration was found missing.
    ///
    /// Sets: `trigger`, `reason` (registration name).
    ScheduleLapsed,

    // === Runtime events ===
    /// Shutdown requested (OS signal observed or explicit shutdown).
    ShutdownRequested,

    /// In-flight work finished within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded.
    GraceExceeded,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `reason` (panic info).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason`.
    SubscriberOverflow,
}

/// Supervision event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id, if applicable.
    pub worker: Option<Arc<str>>,
    /// Trigger that caused the event, if applicable.
    pub trigger: Option<TriggerKind>,
    /// Attempt count after a start or when backoff opened.
    pub attempt: Option<u32>,
    /// Requests folded into one cycle (`ChecksCoalesced`).
    pub folded: Option<u32>,
    /// Backoff window in milliseconds (compact).
    pub delay_ms: Option<u64>,
    /// Human-readable reason (errors, registration names, overflow details).
    pub reason: Option<Arc<str>>,
    /// Subscriber name for subscriber health events.
    pub subscriber: Option<&'static str>,
    /// Full cycle result (only for `CheckCompleted`).
    pub outcome: Option<Arc<SupervisionOutcome>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            trigger: None,
            attempt: None,
            folded: None,
            delay_ms: None,
            reason: None,
            subscriber: None,
            outcome: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches the originating trigger.
    #[inline]
    pub fn with_trigger(mut self, trigger: TriggerKind) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the number of requests folded into one cycle.
    #[inline]
    pub fn with_folded(mut self, n: u32) -> Self {
        self.folded = Some(n);
        self
    }

    /// Attaches a backoff window (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a cycle outcome.
    #[inline]
    pub fn with_outcome(mut self, outcome: Arc<SupervisionOutcome>) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TriggerFired);
        let b = Event::new(EventKind::TriggerFired);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn subscriber_events_name_the_subscriber() {
        let ev = Event::subscriber_overflow("status", "full");
        assert_eq!(ev.subscriber, Some("status"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=status reason=full"));
        assert!(ev.worker.is_none());
    }
}
