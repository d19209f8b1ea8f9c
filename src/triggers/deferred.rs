//! # Deferred-job trigger.
//!
//! Registers a periodic job with a [`Scheduler`] so checks keep happening even when the
//! process was killed and later woken up by the scheduler. Each run requests one check
//! and reports [`JobCompletion::Retry`] if the request could not be delivered.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::core::SupervisorCell;
use crate::error::SchedulingError;
use crate::events::{Event, EventKind};
use crate::triggers::TriggerConfig;
use crate::triggers::TriggerKind;
use crate::triggers::fire::{fire, publish};
use crate::triggers::scheduler::{Cadence, JobCompletion, Registration, Scheduler};

/// Periodic job registered with an external scheduler.
pub struct DeferredJobTrigger {
    cell: Arc<SupervisorCell>,
    scheduler: Arc<dyn Scheduler>,
    name: Cow<'static, str>,
    every: Duration,
    min_latency: Duration,
    deadline: Option<Duration>,
}

impl DeferredJobTrigger {
    /// Creates an uninstalled trigger.
    pub fn new(
        cell: Arc<SupervisorCell>,
        scheduler: Arc<dyn Scheduler>,
        cfg: &TriggerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            cell,
            scheduler,
            name: cfg.job_name.clone(),
            every: cfg.job_every_clamped(),
            min_latency: cfg.job_min_latency,
            deadline: cfg.job_deadline,
        })
    }

    /// Registration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs (or replaces) the job.
    pub fn install(&self) -> Result<(), SchedulingError> {
        let cell = Arc::clone(&self.cell);
        self.scheduler.register(Registration {
            name: self.name.clone(),
            cadence: Cadence::Periodic {
                every: self.every,
                min_latency: self.min_latency,
                deadline: self.deadline,
            },
            callback: Arc::new(move || invoke(&cell)),
        })?;
        publish(
            &self.cell,
            Event::new(EventKind::ScheduleInstalled)
                .with_trigger(TriggerKind::DeferredJob)
                .with_reason(&*self.name),
        );
        Ok(())
    }

    /// Cancels and installs again (used after boot or package replacement).
    pub fn reinstall(&self) -> Result<(), SchedulingError> {
        self.scheduler.cancel(&self.name);
        self.install()
    }

    /// True if the scheduler still holds the job.
    pub fn is_installed(&self) -> bool {
        self.scheduler.is_registered(&self.name)
    }

    /// What one run of the job does: request a check.
    pub fn on_invoke(&self) -> JobCompletion {
        invoke(&self.cell)
    }
}

fn invoke(cell: &SupervisorCell) -> JobCompletion {
    if fire(cell, TriggerKind::DeferredJob) {
        JobCompletion::Success
    } else {
        JobCompletion::Retry
    }
}
