//! # Worker abstraction.
//!
//! A [`Worker`] is the supervisor's view of a long-running background unit: a stable id
//! and a start operation. What the worker does once started is its own business; the
//! supervisor only needs to be able to (re)issue the start.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StartError;

/// # Startable background unit.
///
/// `start` must only *issue* the start (spawn a task, launch a process, ask a service
/// manager) and return; it must not wait for the worker to finish.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use keepalive::{StartError, Worker};
///
/// struct Uploader;
///
/// #[async_trait]
/// impl Worker for Uploader {
///     fn id(&self) -> &str { "uploader" }
///
///     async fn start(&self) -> Result<(), StartError> {
///         // ask the service manager to start the uploader...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns the stable, unique worker id.
    fn id(&self) -> &str;

    /// Issues the worker's start operation.
    async fn start(&self) -> Result<(), StartError>;
}

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;
