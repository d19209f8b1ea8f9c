//! # Worker registry entry.
//!
//! [`WorkerSpec`] is an immutable record: the worker (its id and start operation) plus a
//! `priority` used only to order reports. Specs are created once at process start and
//! handed to [`SupervisorBuilder::with_workers`](crate::SupervisorBuilder::with_workers);
//! the supervisor walks them in registration order.

use crate::workers::worker::WorkerRef;

/// Immutable registry entry for one supervised worker.
///
/// ## Example
/// ```rust
/// use keepalive::{StartError, WorkerFn, WorkerSpec};
///
/// let spec = WorkerSpec::new(WorkerFn::arc("camera", || async { Ok::<_, StartError>(()) }))
///     .with_priority(1);
///
/// assert_eq!(spec.id(), "camera");
/// assert_eq!(spec.priority(), 1);
/// ```
#[derive(Clone)]
pub struct WorkerSpec {
    worker: WorkerRef,
    priority: u32,
}

impl WorkerSpec {
    /// Creates a spec with priority 0.
    pub fn new(worker: WorkerRef) -> Self {
        Self {
            worker,
            priority: 0,
        }
    }

    /// Returns a new spec with the given reporting priority (lower reports first).
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns reference to the worker.
    pub fn worker(&self) -> &WorkerRef {
        &self.worker
    }

    /// Convenience: returns the worker id.
    pub fn id(&self) -> &str {
        self.worker.id()
    }

    /// Returns the reporting priority.
    pub fn priority(&self) -> u32 {
        self.priority
    }
}

impl std::fmt::Debug for WorkerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerSpec")
            .field("id", &self.id())
            .field("priority", &self.priority)
            .finish()
    }
}
