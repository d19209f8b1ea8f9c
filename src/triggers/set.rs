//! # All triggers of one process, wired together.
//!
//! ```text
//! TriggerSet::run()
//!   ├─► install():  PeriodicTimer.start, DeferredJobTrigger.install, AlarmRevivalTrigger.install
//!   ├─► BootTrigger.on_boot(SystemStart)
//!   ├─► wait_for_shutdown_signal()
//!   └─► shutdown(): stop timer, SupervisorCell.shutdown (grace)
//! ```
//!
//! Registration failures are published as `TriggerFailed` and never stop the others:
//! any single surviving trigger keeps workers supervised.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::{Config, SupervisorCell, wait_for_shutdown_signal};
use crate::error::RuntimeError;
use crate::triggers::fire::report_failure;
use crate::triggers::{
    AlarmRevivalTrigger, BootReason, BootTrigger, DeferredJobTrigger, PeriodicTimer, Scheduler,
    TriggerKind,
};

/// The four triggers sharing one supervisor cell.
pub struct TriggerSet {
    cell: Arc<SupervisorCell>,
    periodic: PeriodicTimer,
    deferred: Arc<DeferredJobTrigger>,
    alarm: Arc<AlarmRevivalTrigger>,
    boot: BootTrigger,
    token: CancellationToken,
}

impl TriggerSet {
    /// Creates the triggers; nothing runs until [`TriggerSet::install`] or [`TriggerSet::run`].
    pub fn new(cell: Arc<SupervisorCell>, scheduler: Arc<dyn Scheduler>, cfg: &Config) -> Self {
        let periodic = PeriodicTimer::new(
            Arc::clone(&cell),
            cfg.policy.check_interval_clamped(),
            cfg.triggers.jitter,
        );
        let deferred =
            DeferredJobTrigger::new(Arc::clone(&cell), Arc::clone(&scheduler), &cfg.triggers);
        let alarm = AlarmRevivalTrigger::new(Arc::clone(&cell), scheduler, &cfg.triggers);
        let boot = BootTrigger::new(Arc::clone(&cell), Arc::clone(&deferred), Arc::clone(&alarm));
        Self {
            cell,
            periodic,
            deferred,
            alarm,
            boot,
            token: CancellationToken::new(),
        }
    }

    /// Starts the periodic timer and installs the scheduler registrations.
    pub fn install(&self) {
        self.periodic.start(&self.token);
        if let Err(e) = self.deferred.install() {
            report_failure(&self.cell, TriggerKind::DeferredJob, &e.to_string());
        }
        if let Err(e) = self.alarm.install() {
            report_failure(&self.cell, TriggerKind::Alarm, &e.to_string());
        }
    }

    /// Installs everything, runs the boot trigger, then waits for a termination signal
    /// and shuts down.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        self.install();
        self.boot.on_boot(BootReason::SystemStart);

        match wait_for_shutdown_signal().await {
            Ok(signal) => tracing::info!(signal, "shutdown signal received"),
            Err(e) => tracing::warn!(error = %e, "signal registration failed; shutting down"),
        }
        self.shutdown().await
    }

    /// Stops the periodic timer and shuts down the live supervisor with grace.
    ///
    /// Scheduler registrations stay installed.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.token.cancel();
        if let Some(join) = self.periodic.stop() {
            let _ = join.await;
        }
        self.cell.shutdown().await
    }

    /// In-process periodic timer.
    pub fn periodic(&self) -> &PeriodicTimer {
        &self.periodic
    }

    /// Deferred job registration.
    pub fn deferred(&self) -> &Arc<DeferredJobTrigger> {
        &self.deferred
    }

    /// Revival alarm.
    pub fn alarm(&self) -> &Arc<AlarmRevivalTrigger> {
        &self.alarm
    }

    /// Boot trigger (call `on_boot` from the host's boot or package-replaced hook).
    pub fn boot(&self) -> &BootTrigger {
        &self.boot
    }
}
