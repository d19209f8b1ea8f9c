//! # Result of one supervision cycle.
//!
//! [`SupervisionOutcome`] answers "what did this check do?": which workers were revived,
//! which were skipped because of backoff, and the per-worker [`Verdict`]s in reporting
//! order (priority, then registration order).
//!
//! ```text
//! registry order:   camera(p=2)  gallery(p=0)  transfer(p=1)
//! verdicts order:   gallery      transfer      camera
//! ```

use std::collections::BTreeSet;
use std::time::SystemTime;

use crate::triggers::TriggerKind;
use crate::workers::WorkerSpec;

/// What a cycle decided for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Observed alive; bookkeeping reset.
    Alive,
    /// Dead; start issued. `attempt` is the count after this start.
    Revived {
        /// Attempts recorded so far in the current budget.
        attempt: u32,
    },
    /// Dead or unknown; not examined because a backoff window is open.
    InBackoff,
    /// Dead, but started moments ago; left alone until the settle window passes.
    Settling,
    /// Dead; the start operation failed.
    StartFailed {
        /// Rendered start error.
        reason: String,
    },
    /// Not examined: the cycle ran out of time.
    Abandoned,
}

impl Verdict {
    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Verdict::Alive => "alive",
            Verdict::Revived { .. } => "revived",
            Verdict::InBackoff => "in_backoff",
            Verdict::Settling => "settling",
            Verdict::StartFailed { .. } => "start_failed",
            Verdict::Abandoned => "abandoned",
        }
    }

    /// Value written to the status sink for this verdict, if any.
    pub fn status(&self) -> Option<&'static str> {
        match self {
            Verdict::Revived { .. } => Some("Revived"),
            Verdict::Alive => Some("Running"),
            _ => None,
        }
    }
}

/// One worker's line in an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerVerdict {
    /// Worker id.
    pub worker: String,
    /// Reporting priority from the worker's spec.
    pub priority: u32,
    /// Decision taken.
    pub verdict: Verdict,
}

/// Result of one `check_and_restart` cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionOutcome {
    /// Trigger that caused the cycle.
    pub trigger: TriggerKind,
    /// Wall-clock time the cycle started.
    pub at: SystemTime,
    /// Workers a start was issued for.
    pub revived: BTreeSet<String>,
    /// Workers skipped because their backoff window is open.
    pub skipped_in_backoff: BTreeSet<String>,
    /// Workers observed alive.
    pub alive: BTreeSet<String>,
    /// Workers left alone inside their settle window.
    pub settling: BTreeSet<String>,
    /// Workers whose start operation failed.
    pub failed: BTreeSet<String>,
    /// Workers not examined because the cycle ran out of time.
    pub abandoned: BTreeSet<String>,
    /// Per-worker verdicts in reporting order.
    pub verdicts: Vec<WorkerVerdict>,
}

impl SupervisionOutcome {
    pub(crate) fn new(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            at: SystemTime::now(),
            revived: BTreeSet::new(),
            skipped_in_backoff: BTreeSet::new(),
            alive: BTreeSet::new(),
            settling: BTreeSet::new(),
            failed: BTreeSet::new(),
            abandoned: BTreeSet::new(),
            verdicts: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, spec: &WorkerSpec, verdict: Verdict) {
        let id = spec.id().to_string();
        let set = match verdict {
            Verdict::Alive => &mut self.alive,
            Verdict::Revived { .. } => &mut self.revived,
            Verdict::InBackoff => &mut self.skipped_in_backoff,
            Verdict::Settling => &mut self.settling,
            Verdict::StartFailed { .. } => &mut self.failed,
            Verdict::Abandoned => &mut self.abandoned,
        };
        set.insert(id.clone());
        self.verdicts.push(WorkerVerdict {
            worker: id,
            priority: spec.priority(),
            verdict,
        });
    }

    /// Orders verdicts for reporting; the sort is stable, so equal priorities keep
    /// registration order.
    pub(crate) fn finish(mut self) -> Self {
        self.verdicts.sort_by_key(|v| v.priority);
        self
    }

    /// True if the cycle neither revived nor failed to revive anything.
    pub fn is_quiet(&self) -> bool {
        self.revived.is_empty() && self.failed.is_empty()
    }

    /// Verdict recorded for `worker`, if it was part of the cycle.
    pub fn verdict(&self, worker: &str) -> Option<&Verdict> {
        self.verdicts
            .iter()
            .find(|v| v.worker == worker)
            .map(|v| &v.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StartError, WorkerFn};

    fn spec(id: &'static str, priority: u32) -> WorkerSpec {
        WorkerSpec::new(WorkerFn::arc(id, || async { Ok::<_, StartError>(()) }))
            .with_priority(priority)
    }

    #[test]
    fn verdicts_sort_by_priority_keeping_registry_order_on_ties() {
        let mut o = SupervisionOutcome::new(TriggerKind::Manual);
        o.record(&spec("camera", 2), Verdict::Alive);
        o.record(&spec("gallery", 0), Verdict::Revived { attempt: 1 });
        o.record(&spec("transfer", 0), Verdict::InBackoff);
        let o = o.finish();

        let order: Vec<&str> = o.verdicts.iter().map(|v| v.worker.as_str()).collect();
        assert_eq!(order, vec!["gallery", "transfer", "camera"]);
        assert!(o.revived.contains("gallery"));
        assert!(o.skipped_in_backoff.contains("transfer"));
        assert!(o.alive.contains("camera"));
        assert!(!o.is_quiet());
    }

    #[test]
    fn status_values_only_for_running_and_revived() {
        assert_eq!(Verdict::Alive.status(), Some("Running"));
        assert_eq!(Verdict::Revived { attempt: 2 }.status(), Some("Revived"));
        assert_eq!(Verdict::InBackoff.status(), None);
        assert_eq!(Verdict::Abandoned.status(), None);
    }
}
