//! # Function-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn() -> Fut` whose future issues the start.
//! Each call produces a fresh future; share state explicitly through `Arc` inside
//! the closure.
//!
//! ## Example
//! ```rust
//! use keepalive::{StartError, WorkerFn, WorkerRef};
//!
//! let w: WorkerRef = WorkerFn::arc("gallery-sync", || async {
//!     // e.g. systemctl start gallery-sync
//!     Ok::<_, StartError>(())
//! });
//!
//! assert_eq!(w.id(), "gallery-sync");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StartError;
use crate::workers::worker::Worker;

/// Function-backed worker implementation.
pub struct WorkerFn<F> {
    id: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    pub fn new(id: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { id: id.into(), f }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(id: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(id, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), StartError>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<(), StartError> {
        (self.f)().await
    }
}
