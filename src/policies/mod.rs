//! Supervision and cadence policies.
//!
//! This module groups the knobs that control **whether** a dead worker is restarted,
//! **how often** restarts may be tried and **how long** to wait once the budget is spent.
//!
//! ## Contents
//! - [`SupervisionPolicy`] check interval, restart budget, backoff unit, settle window
//! - [`JitterPolicy`] randomization of trigger offsets to avoid lockstep firing
//!
//! ## Quick wiring
//! ```text
//! Config { policy: SupervisionPolicy, triggers: TriggerConfig { jitter: JitterPolicy, .. } }
//!      ├─► core::ledger::RestartLedger uses:
//!      │     - max_restart_attempts / base_backoff to open backoff windows
//!      │     - settle to suppress duplicate starts
//!      └─► triggers::PeriodicTimer uses:
//!            - check_interval and jitter for their first firing
//! ```

mod jitter;
mod supervision;

pub use jitter::JitterPolicy;
pub use supervision::SupervisionPolicy;
