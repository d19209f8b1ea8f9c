//! # Event subscribers for the keepalive runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out that
//! delivers events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Supervisor cycle ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                               │
//!                                          ┌────────────┬───────┴──────┬──────────┐
//!                                          ▼            ▼              ▼          ▼
//!                                   StatusReporter  Presentation   LogWriter   custom
//!                                                    Unifier
//! ```
//!
//! The status and presentation consumers live in [`crate::status`]; the optional
//! [`LogWriter`] lives here behind the `logging` feature.

#[cfg(feature = "logging")]
mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
