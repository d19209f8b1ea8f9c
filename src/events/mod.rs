//! Supervision events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the supervisor, its coordinator,
//! the triggers and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` cycles, the check coordinator, triggers,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the supervisor's listener, which fans out to `SubscriberSet`
//!   (`StatusReporter`, `PresentationUnifier`, `LogWriter`, user subscribers).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
