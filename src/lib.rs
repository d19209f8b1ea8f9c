//! # keepalive
//!
//! **Keepalive** keeps a fixed set of long-running workers alive in a host that may kill
//! them at any time.
//!
//! Several independent triggers wake a single supervision core. Each cycle asks a
//! liveness probe about every registered worker, restarts the dead ones within a
//! per-worker restart budget, and backs off (linearly) from workers that keep dying.
//! Results flow to a remote status sink and a single unified presentation line.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//!  │PeriodicTimer │ │ DeferredJob  │ │ BootTrigger  │ │AlarmRevival  │
//!  │ (in-process) │ │ (Scheduler)  │ │(boot/update) │ │ (Scheduler)  │
//!  └──────┬───────┘ └──────┬───────┘ └──────┬───────┘ └──────┬───────┘
//!         └────────────────┴───────┬────────┴────────────────┘
//!                                  ▼
//!                    SupervisorCell::get() ─► SupervisorHandle::request(trigger)
//!                                  │  (bounded mpsc, coalescing)
//!                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - WorkerSpec registry (fixed, priority-ordered reporting)        │
//! │  - LivenessProbe (TaskTable / ProcessTable / PidFileProbe / ...)  │
//! │  - RestartLedger (attempts, backoff windows, settle window)       │
//! │  - cycle lock (one check at a time)                               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   │ publish(Event)
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                            SubscriberSet
//!                     ┌─────────────┼──────────────┐
//!                     ▼             ▼              ▼
//!              StatusReporter  Presentation    LogWriter
//!              (StatusSink)     Unifier       ("logging")
//! ```
//!
//! ### Cycle
//! ```text
//! for spec in registry:
//!   ├─ in backoff?            ─► skip                     (BackoffSkipped)
//!   ├─ probe alive?           ─► reset ledger             (WorkerAlive)
//!   ├─ started < settle ago?  ─► leave alone              (SettlingSkipped)
//!   └─ start()
//!        ├─ Ok  ─► attempts += 1; attempts ≥ max ─► backoff base × attempts
//!        └─ Err ─► backoff base / 2                        (StartFailed)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                  |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Supervision**   | Check-and-restart cycles, restart budget, backoff.           | [`Supervisor`], [`RestartLedger`], [`SupervisionPolicy`] |
//! | **Workers**       | Define workers as closures, tasks or child processes.        | [`Worker`], [`WorkerFn`], [`TaskTable`], [`CommandWorker`] |
//! | **Probes**        | Answer "is this worker alive?".                              | [`LivenessProbe`], [`ProbeRouter`], [`ProcessTable`] |
//! | **Triggers**      | Timer, deferred job, boot and alarm entry points.            | [`TriggerSet`], [`Scheduler`], [`LocalScheduler`]   |
//! | **Status**        | Remote status writes and one presentation line.              | [`StatusReporter`], [`PresentationUnifier`]         |
//! | **Subscriber API**| Hook into supervision events.                                | [`Subscribe`], [`Event`]                            |
//! | **Errors**        | Typed errors; none escapes a cycle.                          | [`RuntimeError`], [`StartError`], [`ProbeError`]    |
//! | **Configuration** | Centralize runtime settings.                                 | [`Config`], [`TriggerConfig`]                       |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use keepalive::{
//!     Config, LocalScheduler, MemorySink, StatusReporter, Subscribe, Supervisor,
//!     SupervisorCell, TaskTable, TriggerKind, TriggerSet, WorkerSpec,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let table = TaskTable::new();
//!     let sink = Arc::new(MemorySink::new());
//!
//!     let cell = {
//!         let cfg = cfg.clone();
//!         let table = table.clone();
//!         let sink = sink.clone();
//!         SupervisorCell::new(move || {
//!             let camera = table.worker("camera", |token: CancellationToken| async move {
//!                 token.cancelled().await;
//!             });
//!             let subs: Vec<Arc<dyn Subscribe>> =
//!                 vec![Arc::new(StatusReporter::new(sink.clone(), "devices/demo"))];
//!             Supervisor::builder(cfg.clone())
//!                 .with_workers(vec![WorkerSpec::new(camera)])
//!                 .with_probe(table.clone())
//!                 .with_subscribers(subs)
//!                 .build()
//!         })
//!     };
//!
//!     let triggers = TriggerSet::new(cell.clone(), LocalScheduler::new(), &cfg);
//!     triggers.install();
//!
//!     let outcome = cell.handle()?.check(TriggerKind::Manual).await?;
//!     assert!(outcome.revived.contains("camera"));
//!
//!     triggers.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod policies;
mod probe;
mod status;
mod subscribers;
mod triggers;
mod workers;

// ---- Public re-exports ----

pub use core::{
    Config, RestartLedger, RestartState, SupervisionOutcome, Supervisor, SupervisorBuilder,
    SupervisorCell, SupervisorHandle, Verdict, WorkerVerdict, wait_for_shutdown_signal,
};
pub use error::{CheckError, ProbeError, RuntimeError, SchedulingError, SinkError, StartError};
pub use events::{Bus, Event, EventKind};
pub use policies::{JitterPolicy, SupervisionPolicy};
#[cfg(unix)]
pub use probe::PidFileProbe;
pub use probe::{LivenessProbe, ProbeRouter};
pub use status::{
    MemorySink, PresentationUnifier, Presenter, StatusReporter, StatusSink, StatusValue,
    TracingPresenter,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use triggers::{
    AlarmRevivalTrigger, BootReason, BootTrigger, Cadence, DeferredJobTrigger, JobCallback,
    JobCompletion, LocalScheduler, PeriodicTimer, Registration, Scheduler, TriggerConfig,
    TriggerKind, TriggerSet,
};
pub use workers::{CommandWorker, ProcessTable, TaskTable, Worker, WorkerFn, WorkerRef, WorkerSpec};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
