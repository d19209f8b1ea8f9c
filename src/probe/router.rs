//! # Per-worker probe routing.
//!
//! [`ProbeRouter`] lets one supervisor watch workers of different kinds: in-process tasks
//! through a [`TaskTable`](crate::TaskTable), child processes through a
//! [`ProcessTable`](crate::ProcessTable), external daemons through a pid-file probe.
//!
//! ```text
//! is_alive("camera")   ──► routes["camera"]   ──► TaskTable
//! is_alive("transfer") ──► routes["transfer"] ──► ProcessTable
//! is_alive("other")    ──► fallback           ──► PidFileProbe   (or Unroutable)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::probe::LivenessProbe;

/// Routes liveness queries to the probe responsible for each worker.
#[derive(Default)]
pub struct ProbeRouter {
    routes: HashMap<String, Arc<dyn LivenessProbe>>,
    fallback: Option<Arc<dyn LivenessProbe>>,
}

impl ProbeRouter {
    /// Creates an empty router (every query is `Unroutable`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `worker` to `probe`; replaces a previous route for the same id.
    pub fn route(mut self, worker: impl Into<String>, probe: Arc<dyn LivenessProbe>) -> Self {
        self.routes.insert(worker.into(), probe);
        self
    }

    /// Sets the probe used for ids without an explicit route.
    pub fn fallback(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.fallback = Some(probe);
        self
    }
}

#[async_trait]
impl LivenessProbe for ProbeRouter {
    async fn is_alive(&self, worker: &str) -> Result<bool, ProbeError> {
        match self.routes.get(worker).or(self.fallback.as_ref()) {
            Some(probe) => probe.is_alive(worker).await,
            None => Err(ProbeError::Unroutable {
                worker: worker.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "ProbeRouter"
    }
}
