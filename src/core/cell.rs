//! # Lazily constructed, shared supervisor instance.
//!
//! Triggers may fire in a fresh process (a deferred job or alarm that woke it up) or
//! after a previous instance was shut down. [`SupervisorCell`] gives them all the same
//! answer: the current live supervisor, built on first use from a factory and rebuilt
//! if the previous one was shut down.
//!
//! ```text
//! get() ── read lock ── live instance? ──yes──► Arc<Supervisor>
//!                         │ no
//!                         ▼
//!         write lock ── live instance? ──yes──► Arc<Supervisor>   (lost the race)
//!                         │ no
//!                         ▼
//!                   factory() ──► store ──► Arc<Supervisor>
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use crate::core::coordinator::SupervisorHandle;
use crate::core::supervisor::Supervisor;
use crate::error::RuntimeError;

type Factory = dyn Fn() -> Result<Arc<Supervisor>, RuntimeError> + Send + Sync;

/// Holder of the process-wide supervisor.
pub struct SupervisorCell {
    slot: RwLock<Option<Arc<Supervisor>>>,
    factory: Box<Factory>,
}

impl SupervisorCell {
    /// Creates an empty cell; the factory runs on the first [`SupervisorCell::get`].
    pub fn new<F>(factory: F) -> Arc<Self>
    where
        F: Fn() -> Result<Arc<Supervisor>, RuntimeError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            slot: RwLock::new(None),
            factory: Box::new(factory),
        })
    }

    /// Returns the live supervisor, building one if there is none.
    pub fn get(&self) -> Result<Arc<Supervisor>, RuntimeError> {
        if let Some(sup) = self.current() {
            return Ok(sup);
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(sup) = slot.as_ref().filter(|s| !s.is_shut_down()) {
            return Ok(Arc::clone(sup));
        }
        let sup = (self.factory)()?;
        *slot = Some(Arc::clone(&sup));
        Ok(sup)
    }

    /// Returns the live supervisor without building one.
    pub fn current(&self) -> Option<Arc<Supervisor>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().filter(|s| !s.is_shut_down()).cloned()
    }

    /// Handle of the live supervisor (building one if needed).
    pub fn handle(&self) -> Result<SupervisorHandle, RuntimeError> {
        Ok(self.get()?.handle())
    }

    /// Shuts down the live supervisor, if any. The next `get` builds a new one.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        match self.current() {
            Some(sup) => sup.shutdown().await,
            None => Ok(()),
        }
    }
}
