//! # Pid-file liveness probe (unix).
//!
//! Watches workers that run as independent OS processes and record their pid in
//! `<dir>/<worker>.pid`.
//!
//! ## Verdicts
//! ```text
//! pid file missing                 → Ok(false)
//! pid file unreadable / malformed  → Err(Introspection)
//! pid <= 0                         → Ok(false)   (process groups are not workers)
//! kill(pid, 0) == Ok               → Ok(true), unless the process is a zombie (Linux)
//! kill(pid, 0) == EPERM            → Ok(true)    (exists, owned by someone else)
//! kill(pid, 0) == ESRCH            → Ok(false)
//! ```
//!
//! A zombie has exited but has not been reaped; it still answers `kill(pid, 0)`.
//! Counting it as alive would stop restarts for a dead worker, so on Linux its
//! `/proc/<pid>/stat` state is consulted.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::error::ProbeError;
use crate::probe::LivenessProbe;

/// Probe backed by pid files in one directory.
#[derive(Debug, Clone)]
pub struct PidFileProbe {
    dir: PathBuf,
}

impl PidFileProbe {
    /// Creates a probe reading `<dir>/<worker>.pid`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the pid file for `worker`.
    pub fn pid_path(&self, worker: &str) -> PathBuf {
        self.dir.join(format!("{worker}.pid"))
    }

    async fn read_pid(path: &Path) -> Result<Option<i32>, ProbeError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ProbeError::introspection(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        raw.trim().parse::<i32>().map(Some).map_err(|e| {
            ProbeError::introspection(format!("malformed pid in {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl LivenessProbe for PidFileProbe {
    async fn is_alive(&self, worker: &str) -> Result<bool, ProbeError> {
        let Some(pid) = Self::read_pid(&self.pid_path(worker)).await? else {
            return Ok(false);
        };
        if pid <= 0 {
            return Ok(false);
        }

        match kill(Pid::from_raw(pid), None) {
            Ok(()) => Ok(!is_zombie(pid).await),
            Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(ProbeError::introspection(format!("kill({pid}, 0): {e}"))),
        }
    }

    fn name(&self) -> &'static str {
        "PidFileProbe"
    }
}

/// True if `/proc/<pid>/stat` reports state `Z`; false when unknown.
#[cfg(target_os = "linux")]
async fn is_zombie(pid: i32) -> bool {
    match tokio::fs::read_to_string(format!("/proc/{pid}/stat")).await {
        Ok(stat) => parse_stat_state(&stat) == Some('Z'),
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
async fn is_zombie(_pid: i32) -> bool {
    false
}

/// Extracts the state letter from a `/proc/<pid>/stat` line.
///
/// The command name is wrapped in parentheses and may itself contain spaces or `)`,
/// so the state is the first field after the **last** `)`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_stat_state(stat: &str) -> Option<char> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.trim_start().chars().next()
}
