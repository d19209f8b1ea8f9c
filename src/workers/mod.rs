//! # Worker abstractions and registry entries.
//!
//! - [`Worker`] trait: stable id + start operation
//! - [`WorkerFn`] closure-backed worker
//! - [`WorkerRef`] shared handle (`Arc<dyn Worker>`)
//! - [`WorkerSpec`] immutable registry entry (worker + reporting priority)
//! - [`TaskTable`] in-process workers on tokio tasks (also a liveness probe)
//! - [`CommandWorker`] / [`ProcessTable`] child-process workers (table is a liveness probe)

mod command;
mod spawned;
mod spec;
mod worker;
mod worker_fn;

pub use command::{CommandWorker, ProcessTable};
pub use spawned::TaskTable;
pub use spec::WorkerSpec;
pub use worker::{Worker, WorkerRef};
pub use worker_fn::WorkerFn;
