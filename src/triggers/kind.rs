/// What caused a supervision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// In-process periodic timer.
    Periodic,
    /// Deferred job run by a [`Scheduler`](crate::Scheduler).
    DeferredJob,
    /// Host boot or package replacement.
    Boot,
    /// Wall-clock alarm run by a [`Scheduler`](crate::Scheduler).
    Alarm,
    /// Direct call to `check_and_restart`.
    Manual,
}

impl TriggerKind {
    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TriggerKind::Periodic => "periodic",
            TriggerKind::DeferredJob => "deferred_job",
            TriggerKind::Boot => "boot",
            TriggerKind::Alarm => "alarm",
            TriggerKind::Manual => "manual",
        }
    }
}
