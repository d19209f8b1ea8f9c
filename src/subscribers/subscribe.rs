//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging consumers of supervision events into
//! the runtime: the [`StatusReporter`](crate::StatusReporter), the
//! [`PresentationUnifier`](crate::PresentationUnifier), loggers, metrics.
//! Each subscriber is driven by a dedicated worker loop fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (network writes to a status sink, UI updates); they do
//!   **not** block the supervisor nor other subscribers.
//! - If a queue overflows, events for that subscriber are **dropped** and a
//!   `SubscriberOverflow` event is published.
//!
//! ## Example
//! ```rust
//! use keepalive::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Revivals;
//!
//! #[async_trait]
//! impl Subscribe for Revivals {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::WorkerRevived {
//!             // count revivals...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "revivals" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
