//! # Child-process workers.
//!
//! [`CommandWorker`] launches a program as a child of the supervising process;
//! [`ProcessTable`] keeps the children and answers liveness through `try_wait`,
//! which also reaps exited children so they never linger as zombies.
//!
//! ## Start errors
//! - program missing or not executable → [`StartError::Rejected`]
//! - anything else → [`StartError::Unexpected`]

use std::collections::HashMap;
use std::ffi::OsString;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::error::{ProbeError, StartError};
use crate::probe::LivenessProbe;
use crate::workers::worker::{Worker, WorkerRef};

/// Child processes of command workers, keyed by worker id.
#[derive(Default)]
pub struct ProcessTable {
    children: Mutex<HashMap<String, Child>>,
}

impl ProcessTable {
    /// Creates an empty table.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// OS pid of a worker's child, if it has one and it was not yet reaped.
    pub fn pid(&self, worker: &str) -> Option<u32> {
        let children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        children.get(worker).and_then(Child::id)
    }

    /// Sends a kill to a worker's child; returns false if unknown or already gone.
    pub fn kill(&self, worker: &str) -> bool {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        children
            .get_mut(worker)
            .is_some_and(|child| child.start_kill().is_ok())
    }

    fn insert(&self, worker: &str, child: Child) {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        children.insert(worker.to_string(), child);
    }
}

#[async_trait]
impl LivenessProbe for ProcessTable {
    async fn is_alive(&self, worker: &str) -> Result<bool, ProbeError> {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(child) = children.get_mut(worker) else {
            return Ok(false);
        };
        match child.try_wait() {
            Ok(None) => Ok(true),
            Ok(Some(_status)) => {
                children.remove(worker);
                Ok(false)
            }
            Err(e) => Err(ProbeError::introspection(format!("try_wait: {e}"))),
        }
    }

    fn name(&self) -> &'static str {
        "ProcessTable"
    }
}

/// Worker that runs a program as a child process.
///
/// ## Example
/// ```rust,no_run
/// use keepalive::{CommandWorker, ProcessTable, WorkerSpec};
///
/// let table = ProcessTable::new();
/// let uploader = CommandWorker::new("uploader", "/usr/local/bin/uploader", table.clone())
///     .arg("--queue")
///     .arg("/var/spool/uploads");
/// let spec = WorkerSpec::new(uploader.into_ref());
/// ```
pub struct CommandWorker {
    id: String,
    program: OsString,
    args: Vec<OsString>,
    table: Arc<ProcessTable>,
}

impl CommandWorker {
    /// Creates a worker running `program` with no arguments.
    pub fn new(
        id: impl Into<String>,
        program: impl Into<OsString>,
        table: Arc<ProcessTable>,
    ) -> Self {
        Self {
            id: id.into(),
            program: program.into(),
            args: Vec::new(),
            table,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Wraps the worker into a shared handle.
    pub fn into_ref(self) -> WorkerRef {
        Arc::new(self)
    }
}

#[async_trait]
impl Worker for CommandWorker {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<(), StartError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| StartError::from_io(&e))?;
        self.table.insert(&self.id, child);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn missing_program_is_rejected() {
        let table = ProcessTable::new();
        let w = CommandWorker::new("ghost", "/definitely/not/here", table.clone());

        let err = w.start().await.unwrap_err();
        assert_eq!(err.as_label(), "start_rejected");
        assert_eq!(table.is_alive("ghost").await, Ok(false));
    }

    #[tokio::test]
    async fn running_child_is_alive_until_killed() {
        let table = ProcessTable::new();
        let w = CommandWorker::new("sleeper", "sleep", table.clone()).arg("30");

        w.start().await.unwrap();
        assert_eq!(table.is_alive("sleeper").await, Ok(true));
        assert!(table.pid("sleeper").is_some());

        assert!(table.kill("sleeper"));
        let mut alive = true;
        for _ in 0..50 {
            alive = table.is_alive("sleeper").await.unwrap();
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!alive);
    }
}
