//! # Liveness probe contract.

use async_trait::async_trait;

use crate::error::ProbeError;

/// Answers "is worker W alive right now?".
///
/// ### Contract
/// - One OS query per call (process table, task handle, pid file); no retries.
/// - No side effects on supervision state, safe to call concurrently.
/// - Errors are **not** fatal: the supervisor treats `Err` as "not alive", publishes
///   `ProbeFailed`, and goes on to restart the worker.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use keepalive::{LivenessProbe, ProbeError};
///
/// struct AlwaysUp;
///
/// #[async_trait]
/// impl LivenessProbe for AlwaysUp {
///     async fn is_alive(&self, _worker: &str) -> Result<bool, ProbeError> {
///         Ok(true)
///     }
/// }
/// ```
#[async_trait]
pub trait LivenessProbe: Send + Sync + 'static {
    /// Returns whether the worker with the given id is currently running.
    async fn is_alive(&self, worker: &str) -> Result<bool, ProbeError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
