//! # Status sink seam.
//!
//! A [`StatusSink`] is a remote key/value store the [`StatusReporter`](crate::StatusReporter)
//! writes supervision results to. Writes are fire-and-forget from the supervisor's point
//! of view: a failing sink is logged and never affects supervision.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::SinkError;

/// Value written under a status key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    /// Counter.
    Count(u64),
    /// Point in time.
    Timestamp(SystemTime),
    /// Free text (`"Revived"`, `"Running"`).
    Text(String),
}

/// Remote key/value status store.
#[async_trait]
pub trait StatusSink: Send + Sync + 'static {
    /// Writes `value` under `path`, replacing any previous value.
    async fn write(&self, path: &str, value: StatusValue) -> Result<(), SinkError>;
}

/// In-memory sink; useful for tests and local inspection.
#[derive(Default)]
pub struct MemorySink {
    values: Mutex<BTreeMap<String, StatusValue>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `path`.
    pub fn get(&self, path: &str) -> Option<StatusValue> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// All stored values, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, StatusValue)> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl StatusSink for MemorySink {
    async fn write(&self, path: &str, value: StatusValue) -> Result<(), SinkError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), value);
        Ok(())
    }
}
