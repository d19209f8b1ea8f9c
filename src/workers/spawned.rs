//! # In-process workers on tokio tasks.
//!
//! A [`TaskTable`] owns the join handles of workers that run as tokio tasks inside the
//! supervising process. It plays both roles the supervisor needs:
//! - **start**: [`TaskTable::worker`] builds a [`Worker`] whose `start` spawns a fresh
//!   task from a factory closure and records its handle;
//! - **probe**: the table implements [`LivenessProbe`]; a worker is alive while its task
//!   has not finished.
//!
//! ```text
//! start("camera") ──► tokio::spawn(factory(child_token)) ──► tasks["camera"] = JoinHandle
//! is_alive("camera") ──► tasks["camera"].is_finished() == false
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ProbeError, StartError};
use crate::probe::LivenessProbe;
use crate::workers::worker::{Worker, WorkerRef};

/// Join handles of in-process workers, keyed by worker id.
pub struct TaskTable {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    token: CancellationToken,
}

impl TaskTable {
    /// Creates an empty table.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(HashMap::new()),
            token: CancellationToken::new(),
        })
    }

    /// Builds a worker whose start spawns `factory(token)` on the current runtime.
    ///
    /// The token handed to the factory is cancelled by [`TaskTable::shutdown`].
    pub fn worker<F, Fut>(
        self: &Arc<Self>,
        id: impl Into<Cow<'static, str>>,
        factory: F,
    ) -> WorkerRef
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Arc::new(SpawnedWorker {
            id: id.into(),
            table: Arc::clone(self),
            factory,
        })
    }

    /// Returns sorted ids of workers whose task is still running.
    pub fn running(&self) -> Vec<String> {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = tasks
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Aborts a worker's task (what a hostile environment does); returns false if unknown.
    pub fn abort(&self, id: &str) -> bool {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        match tasks.get(id) {
            Some(h) => {
                h.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels every worker's token and refuses further starts.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

#[async_trait]
impl LivenessProbe for TaskTable {
    async fn is_alive(&self, worker: &str) -> Result<bool, ProbeError> {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.get(worker).is_some_and(|h| !h.is_finished()))
    }

    fn name(&self) -> &'static str {
        "TaskTable"
    }
}

/// Worker produced by [`TaskTable::worker`].
struct SpawnedWorker<F> {
    id: Cow<'static, str>,
    table: Arc<TaskTable>,
    factory: F,
}

#[async_trait]
impl<F, Fut> Worker for SpawnedWorker<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<(), StartError> {
        if self.table.token.is_cancelled() {
            return Err(StartError::rejected("task table shut down"));
        }

        let mut tasks = self
            .table
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // A start racing a still-running task keeps the running one.
        if tasks.get(self.id.as_ref()).is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        let fut = (self.factory)(self.table.token.child_token());
        tasks.insert(self.id.to_string(), tokio::spawn(fut));
        Ok(())
    }
}
