//! # StatusReporter: supervision results to a remote key/value sink.
//!
//! Subscribes to `CheckCompleted` and writes, under a configurable root:
//!
//! ```text
//! <root>/revivedCount         Count(|revived|)          (this cycle)
//! <root>/lastCheckTimestamp   Timestamp(cycle start)
//! <root>/workers/<id>         Text("Revived")           (start issued this cycle)
//! <root>/workers/<id>         Text("Running")           (observed alive)
//! ```
//!
//! Workers that were skipped, settling, failed or abandoned are left untouched. Every
//! write failure is logged and swallowed; the remaining writes still happen.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::core::SupervisionOutcome;
use crate::events::{Event, EventKind};
use crate::status::{StatusSink, StatusValue};
use crate::subscribers::Subscribe;

/// Writes cycle outcomes to a [`StatusSink`].
pub struct StatusReporter {
    sink: Arc<dyn StatusSink>,
    root: String,
}

impl StatusReporter {
    /// Creates a reporter writing under `root` (trailing `/` is ignored).
    pub fn new(sink: Arc<dyn StatusSink>, root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            sink,
            root: root.trim_end_matches('/').to_string(),
        }
    }

    /// Writes one outcome observed at `at`.
    pub async fn report(&self, outcome: &SupervisionOutcome, at: SystemTime) {
        let revived = u64::try_from(outcome.revived.len()).unwrap_or(u64::MAX);
        let mut writes = vec![
            (format!("{}/revivedCount", self.root), StatusValue::Count(revived)),
            (format!("{}/lastCheckTimestamp", self.root), StatusValue::Timestamp(at)),
        ];
        for v in &outcome.verdicts {
            if let Some(status) = v.verdict.status() {
                writes.push((
                    format!("{}/workers/{}", self.root, v.worker),
                    StatusValue::Text(status.to_string()),
                ));
            }
        }

        for (path, value) in writes {
            if let Err(e) = self.sink.write(&path, value).await {
                tracing::warn!(path = %path, error = %e, "status write failed");
            }
        }
    }
}

#[async_trait]
impl Subscribe for StatusReporter {
    async fn on_event(&self, event: &Event) {
        if event.kind != EventKind::CheckCompleted {
            return;
        }
        if let Some(outcome) = &event.outcome {
            self.report(outcome, outcome.at).await;
        }
    }

    fn name(&self) -> &'static str {
        "StatusReporter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::status::MemorySink;
    use crate::{StartError, TriggerKind, Verdict, WorkerFn, WorkerSpec};
    use std::sync::Mutex;

    fn outcome() -> SupervisionOutcome {
        let spec = |id: &'static str| {
            WorkerSpec::new(WorkerFn::arc(id, || async { Ok::<_, StartError>(()) }))
        };
        let mut o = SupervisionOutcome::new(TriggerKind::Periodic);
        o.record(&spec("camera"), Verdict::Alive);
        o.record(&spec("gallery"), Verdict::Revived { attempt: 1 });
        o.record(&spec("transfer"), Verdict::InBackoff);
        o.finish()
    }

    #[tokio::test]
    async fn writes_counts_timestamp_and_worker_states() {
        let sink = Arc::new(MemorySink::new());
        let reporter = StatusReporter::new(sink.clone(), "devices/pixel/");
        let at = SystemTime::UNIX_EPOCH;

        reporter.report(&outcome(), at).await;

        assert_eq!(sink.get("devices/pixel/revivedCount"), Some(StatusValue::Count(1)));
        assert_eq!(
            sink.get("devices/pixel/lastCheckTimestamp"),
            Some(StatusValue::Timestamp(at))
        );
        assert_eq!(
            sink.get("devices/pixel/workers/camera"),
            Some(StatusValue::Text("Running".into()))
        );
        assert_eq!(
            sink.get("devices/pixel/workers/gallery"),
            Some(StatusValue::Text("Revived".into()))
        );
        assert_eq!(sink.get("devices/pixel/workers/transfer"), None);
    }

    struct Flaky {
        written: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StatusSink for Flaky {
        async fn write(&self, path: &str, _value: StatusValue) -> Result<(), SinkError> {
            if path.ends_with("revivedCount") {
                return Err(SinkError::new(path, "connection reset"));
            }
            self.written.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_write_does_not_stop_the_rest() {
        let sink = Arc::new(Flaky {
            written: Mutex::new(Vec::new()),
        });
        let reporter = StatusReporter::new(sink.clone(), "root");

        reporter.report(&outcome(), SystemTime::now()).await;

        let written = sink.written.lock().unwrap().clone();
        assert_eq!(
            written,
            vec![
                "root/lastCheckTimestamp".to_string(),
                "root/workers/camera".to_string(),
                "root/workers/gallery".to_string(),
            ]
        );
    }
}
