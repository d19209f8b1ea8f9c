//! # Boot trigger.
//!
//! Called once when the host finished booting or the package was replaced. Schedulers
//! commonly drop registrations on both, so the trigger reinstalls the deferred job and
//! the revival alarm before requesting a check.

use std::sync::Arc;

use crate::core::SupervisorCell;
use crate::triggers::fire::{fire, report_failure};
use crate::triggers::{AlarmRevivalTrigger, DeferredJobTrigger, TriggerKind};

/// Why the boot trigger ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootReason {
    /// The host finished starting.
    SystemStart,
    /// This software was updated in place.
    PackageReplaced,
}

impl BootReason {
    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BootReason::SystemStart => "system_start",
            BootReason::PackageReplaced => "package_replaced",
        }
    }
}

/// Reinstalls the external schedules and requests a check.
pub struct BootTrigger {
    cell: Arc<SupervisorCell>,
    deferred: Arc<DeferredJobTrigger>,
    alarm: Arc<AlarmRevivalTrigger>,
}

impl BootTrigger {
    /// Creates a boot trigger that reinstalls `deferred` and `alarm`.
    pub fn new(
        cell: Arc<SupervisorCell>,
        deferred: Arc<DeferredJobTrigger>,
        alarm: Arc<AlarmRevivalTrigger>,
    ) -> Self {
        Self {
            cell,
            deferred,
            alarm,
        }
    }

    /// Handles a boot notification. Returns true if a check was requested.
    pub fn on_boot(&self, reason: BootReason) -> bool {
        tracing::info!(reason = reason.as_label(), "boot trigger");
        if let Err(e) = self.deferred.reinstall() {
            report_failure(&self.cell, TriggerKind::Boot, &e.to_string());
        }
        if let Err(e) = self.alarm.reinstall() {
            report_failure(&self.cell, TriggerKind::Boot, &e.to_string());
        }
        fire(&self.cell, TriggerKind::Boot)
    }
}
