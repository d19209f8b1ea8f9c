use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{Config, coordinator, coordinator::SupervisorHandle, supervisor::Supervisor};
use crate::error::RuntimeError;
use crate::events::Bus;
use crate::probe::LivenessProbe;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workers::WorkerSpec;

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    workers: Vec<WorkerSpec>,
    probe: Option<Arc<dyn LivenessProbe>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            workers: Vec::new(),
            probe: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the worker registry (replaces any previous one).
    ///
    /// Registration order is the order workers are examined in.
    pub fn with_workers(mut self, workers: Vec<WorkerSpec>) -> Self {
        self.workers = workers;
        self
    }

    /// Appends one worker to the registry.
    pub fn with_worker(mut self, worker: WorkerSpec) -> Self {
        self.workers.push(worker);
        self
    }

    /// Sets the liveness probe.
    pub fn with_probe(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sets event subscribers (status reporting, presentation, logging).
    ///
    /// Subscribers receive events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor and starts its background tasks.
    ///
    /// Must be called inside a tokio runtime. Initializes:
    /// - event bus and the listener feeding the subscriber set;
    /// - the check coordinator behind [`Supervisor::handle`].
    ///
    /// Fails on an empty registry, duplicate worker ids, or a missing probe.
    pub fn build(self) -> Result<Arc<Supervisor>, RuntimeError> {
        if self.workers.is_empty() {
            return Err(RuntimeError::EmptyRegistry);
        }
        let mut seen = HashSet::with_capacity(self.workers.len());
        for spec in &self.workers {
            if !seen.insert(spec.id()) {
                return Err(RuntimeError::DuplicateWorker {
                    id: spec.id().to_string(),
                });
            }
        }
        let probe = self.probe.ok_or(RuntimeError::MissingProbe)?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let runtime_token = CancellationToken::new();
        let (handle, requests) = SupervisorHandle::channel(self.cfg.check_queue_clamped());

        let sup = Arc::new(Supervisor::new_internal(
            self.cfg,
            self.workers,
            probe,
            bus.clone(),
            runtime_token.clone(),
            handle,
        ));
        sup.spawn_listener(subs);
        coordinator::spawn(Arc::downgrade(&sup), requests, runtime_token, bus);
        Ok(sup)
    }
}
