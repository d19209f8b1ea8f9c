//! # Event bus for broadcasting supervision events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from many sources (supervisor cycles, triggers,
//! the coordinator, subscriber workers).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                     Subscriber (one):
//!   Supervisor cycle ──┐
//!   Coordinator      ──┼──► Bus ───► supervisor listener ───► SubscriberSet
//!   Triggers         ──┤  (broadcast)                          (StatusReporter,
//!   SubscriberSet    ──┘                                        PresentationUnifier, ..)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if nobody is subscribed at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervision events.
///
/// Cheap to clone (holds an `Arc`-backed sender). Fire-and-forget: no delivery guarantees.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
