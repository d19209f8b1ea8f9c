//! Runtime core: supervision cycle, restart bookkeeping and lifecycle.
//!
//! The public API from this module is the [`Supervisor`] and what surrounds it
//! (builder, handle, cell, ledger, outcome, config).
//!
//! Internal modules:
//! - [`supervisor`]: one serialized check-and-restart cycle, shutdown with grace;
//! - [`ledger`]: per-worker attempts and backoff windows;
//! - [`coordinator`]: fan-in of trigger requests, coalescing;
//! - [`cell`]: lazily built, rebuildable shared instance;
//! - [`guard`]: panic containment for user futures;
//! - [`shutdown`]: cross-platform termination signals.

mod builder;
mod cell;
mod config;
mod coordinator;
pub(crate) mod guard;
mod ledger;
mod outcome;
pub(crate) mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use cell::SupervisorCell;
pub use config::Config;
pub use coordinator::SupervisorHandle;
pub use ledger::{RestartLedger, RestartState};
pub use outcome::{SupervisionOutcome, Verdict, WorkerVerdict};
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::Supervisor;
