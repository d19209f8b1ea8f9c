//! # Triggers: everything that can cause a supervision cycle.
//!
//! - [`PeriodicTimer`] in-process timer (cadence = `SupervisionPolicy::check_interval`)
//! - [`DeferredJobTrigger`] periodic job on an external [`Scheduler`]
//! - [`BootTrigger`] host boot / package replaced; reinstalls schedules
//! - [`AlarmRevivalTrigger`] repeating alarm that re-registers itself when lapsed
//! - [`TriggerSet`] all of the above sharing one [`SupervisorCell`](crate::SupervisorCell)
//! - [`LocalScheduler`] tokio-backed [`Scheduler`]
//!
//! Triggers never propagate errors to their caller: failures become `TriggerFailed`
//! events and warnings.

mod alarm;
mod boot;
mod config;
mod deferred;
mod fire;
mod kind;
mod local;
mod periodic;
mod scheduler;
mod set;

pub use alarm::AlarmRevivalTrigger;
pub use boot::{BootReason, BootTrigger};
pub use config::TriggerConfig;
pub use deferred::DeferredJobTrigger;
pub use kind::TriggerKind;
pub use local::LocalScheduler;
pub use periodic::PeriodicTimer;
pub use scheduler::{Cadence, JobCallback, JobCompletion, Registration, Scheduler};
pub use set::TriggerSet;
