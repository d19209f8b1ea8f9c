//! # Status side consumers.
//!
//! - [`StatusReporter`] writes cycle outcomes to a remote [`StatusSink`]
//! - [`PresentationUnifier`] folds active workers into one deduplicated line for a [`Presenter`]
//!
//! Both are [`Subscribe`](crate::Subscribe)rs: they see the supervisor only through events
//! and can never slow or fail a cycle.

mod reporter;
mod sink;
mod unifier;

pub use reporter::StatusReporter;
pub use sink::{MemorySink, StatusSink, StatusValue};
pub use unifier::{PresentationUnifier, Presenter, TracingPresenter};
