use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::core::SupervisorCell;
use crate::core::guard::panic_message;
use crate::error::CheckError;
use crate::events::{Event, EventKind};
use crate::triggers::TriggerKind;

/// Requests a cycle on behalf of `kind`. Never propagates a failure to the caller.
///
/// A handle that turns out to be closed (the supervisor was shut down between lookup
/// and request) is retried once against a freshly built instance.
///
/// A panic on the way (a panicking supervisor factory, for one) is reported as
/// `TriggerFailed` and does not unwind into the scheduler or timer that called it.
///
/// Returns true if a cycle was requested.
pub(crate) fn fire(cell: &SupervisorCell, kind: TriggerKind) -> bool {
    match catch_unwind(AssertUnwindSafe(|| request(cell, kind))) {
        Ok(requested) => requested,
        Err(payload) => {
            let reason = format!("trigger panicked: {}", panic_message(&*payload));
            report_failure(cell, kind, &reason);
            false
        }
    }
}

fn request(cell: &SupervisorCell, kind: TriggerKind) -> bool {
    for _ in 0..2 {
        let sup = match cell.get() {
            Ok(sup) => sup,
            Err(e) => {
                tracing::warn!(trigger = kind.as_label(), error = %e, "supervisor unavailable");
                return false;
            }
        };
        sup.bus()
            .publish(Event::new(EventKind::TriggerFired).with_trigger(kind));

        match sup.handle().request(kind) {
            Ok(()) => return true,
            Err(CheckError::Closed) if !sup.is_shut_down() => {
                report_failure(cell, kind, "check coordinator stopped");
                return false;
            }
            Err(CheckError::Closed) => continue,
        }
    }
    report_failure(cell, kind, "supervisor closed");
    false
}

/// Publishes `TriggerFailed` on the live supervisor (if any) and logs it.
pub(crate) fn report_failure(cell: &SupervisorCell, kind: TriggerKind, reason: &str) {
    tracing::warn!(trigger = kind.as_label(), reason, "trigger failed");
    if let Some(sup) = cell.current() {
        sup.bus().publish(
            Event::new(EventKind::TriggerFailed)
                .with_trigger(kind)
                .with_reason(reason),
        );
    }
}

/// Publishes an event on the live supervisor, if there is one.
pub(crate) fn publish(cell: &SupervisorCell, event: Event) {
    if let Some(sup) = cell.current() {
        sup.bus().publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, StartError, Supervisor, TaskTable, WorkerFn, WorkerSpec};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn panicking_factory_is_reported_not_unwound() {
        let builds = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&builds);
        let cell = SupervisorCell::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("keystore not ready");
            }
            Supervisor::builder(Config::default())
                .with_worker(WorkerSpec::new(WorkerFn::arc("camera", || async {
                    Ok::<_, StartError>(())
                })))
                .with_probe(TaskTable::new())
                .build()
        });

        assert!(!fire(&cell, TriggerKind::Alarm));
        assert!(cell.current().is_none());

        assert!(fire(&cell, TriggerKind::Alarm));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
