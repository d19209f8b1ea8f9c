//! Error types used by the keepalive runtime, workers, probes and schedulers.
//!
//! - [`RuntimeError`] errors raised while building or shutting down the runtime.
//! - [`StartError`] a worker's start operation could not be issued.
//! - [`ProbeError`] liveness introspection failed.
//! - [`SchedulingError`] an OS-level registration (deferred job, alarm) was refused.
//! - [`CheckError`] a check request could not reach the supervisor.
//! - [`SinkError`] a status sink write failed.
//!
//! Every type provides `as_label` (stable snake_case, for logs/metrics) and `as_message`.
//! None of them ever escapes a supervision cycle: the supervisor turns them into ledger
//! state and events.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the keepalive runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some components were still busy.
    #[error("shutdown timeout {grace:?} exceeded; pending: {pending:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Components that did not stop in time.
        pending: Vec<String>,
    },

    /// Two worker specs share the same id.
    #[error("duplicate worker id '{id}'")]
    DuplicateWorker {
        /// The repeated id.
        id: String,
    },

    /// The registry contains no workers.
    #[error("worker registry is empty")]
    EmptyRegistry,

    /// The supervisor was built without a liveness probe.
    #[error("no liveness probe configured")]
    MissingProbe,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use keepalive::RuntimeError;
    ///
    /// let err = RuntimeError::DuplicateWorker { id: "camera".into() };
    /// assert_eq!(err.as_label(), "runtime_duplicate_worker");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::DuplicateWorker { .. } => "runtime_duplicate_worker",
            RuntimeError::EmptyRegistry => "runtime_empty_registry",
            RuntimeError::MissingProbe => "runtime_missing_probe",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending={pending:?}")
            }
            RuntimeError::DuplicateWorker { id } => format!("worker '{id}' registered twice"),
            RuntimeError::EmptyRegistry => "no workers registered".to_string(),
            RuntimeError::MissingProbe => "no liveness probe".to_string(),
        }
    }
}

/// # Errors produced when issuing a worker's start operation.
///
/// Distinguishes an environment that refused the start (missing permission, missing binary,
/// start-from-background restrictions) from anything else.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// The environment rejected the start.
    #[error("start rejected by environment: {reason}")]
    Rejected {
        /// Why the environment refused.
        reason: String,
    },

    /// Any other failure while issuing the start.
    #[error("unexpected start failure: {reason}")]
    Unexpected {
        /// The underlying error message.
        reason: String,
    },
}

impl StartError {
    /// Shorthand for [`StartError::Rejected`].
    pub fn rejected(reason: impl Into<String>) -> Self {
        StartError::Rejected {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StartError::Unexpected`].
    pub fn unexpected(reason: impl Into<String>) -> Self {
        StartError::Unexpected {
            reason: reason.into(),
        }
    }

    /// Classifies an I/O error from a spawn attempt.
    ///
    /// `PermissionDenied` and `NotFound` mean the environment refused; everything else is
    /// unexpected.
    pub fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound => {
                StartError::rejected(err.to_string())
            }
            _ => StartError::unexpected(err.to_string()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use keepalive::StartError;
    ///
    /// assert_eq!(StartError::rejected("denied").as_label(), "start_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StartError::Rejected { .. } => "start_rejected",
            StartError::Unexpected { .. } => "start_unexpected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StartError::Rejected { reason } => format!("rejected: {reason}"),
            StartError::Unexpected { reason } => format!("error: {reason}"),
        }
    }
}

/// # Errors produced by liveness introspection.
///
/// The supervisor treats every variant as "not alive".
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The OS query failed.
    #[error("introspection failed: {reason}")]
    Introspection {
        /// The underlying error message.
        reason: String,
    },

    /// The probe did not answer within the cycle budget.
    #[error("probe timed out after {timeout:?}")]
    Timeout {
        /// The budget that was exceeded.
        timeout: Duration,
    },

    /// The probe panicked.
    #[error("probe panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// No probe is responsible for the worker.
    #[error("no probe routed for worker '{worker}'")]
    Unroutable {
        /// The worker id.
        worker: String,
    },
}

impl ProbeError {
    /// Shorthand for [`ProbeError::Introspection`].
    pub fn introspection(reason: impl Into<String>) -> Self {
        ProbeError::Introspection {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::Introspection { .. } => "probe_introspection",
            ProbeError::Timeout { .. } => "probe_timeout",
            ProbeError::Panicked { .. } => "probe_panicked",
            ProbeError::Unroutable { .. } => "probe_unroutable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ProbeError::Introspection { reason } => format!("introspection: {reason}"),
            ProbeError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ProbeError::Panicked { info } => format!("panic: {info}"),
            ProbeError::Unroutable { worker } => format!("unroutable: {worker}"),
        }
    }
}

/// # Errors produced by a [`Scheduler`](crate::Scheduler) registration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// The scheduler refused the registration.
    #[error("registration '{name}' rejected: {reason}")]
    Rejected {
        /// Registration name.
        name: String,
        /// Why it was refused.
        reason: String,
    },

    /// The scheduler cannot accept registrations right now (e.g. runtime shutting down).
    #[error("scheduler unavailable")]
    Unavailable,
}

impl SchedulingError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulingError::Rejected { .. } => "scheduling_rejected",
            SchedulingError::Unavailable => "scheduling_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulingError::Rejected { name, reason } => format!("rejected {name}: {reason}"),
            SchedulingError::Unavailable => "unavailable".to_string(),
        }
    }
}

/// Error returned by [`SupervisorHandle`](crate::SupervisorHandle) requests.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckError {
    /// The coordinator is gone (supervisor shut down or dropped).
    #[error("supervisor closed")]
    Closed,
}

/// Error returned by a [`StatusSink`](crate::StatusSink) write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("status write to '{path}' failed: {reason}")]
pub struct SinkError {
    /// Key that could not be written.
    pub path: String,
    /// Backend-specific reason.
    pub reason: String,
}

impl SinkError {
    /// Creates a sink error for `path`.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
