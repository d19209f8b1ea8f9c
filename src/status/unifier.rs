//! # PresentationUnifier: one status line for all active workers.
//!
//! Many workers each want to say "I'm running". The unifier folds those signals into a
//! single line and hands it to a [`Presenter`] only when the text actually changes:
//!
//! ```text
//! set_active("camera", "Camera")      ─► "1 active: Camera"
//! set_active("gallery", "Gallery")    ─► "2 active: Camera, Gallery"
//! set_active("gallery", "Gallery")    ─► (unchanged, nothing presented)
//! clear("camera")                     ─► "1 active: Gallery"
//! clear("gallery")                    ─► None (presentation removed)
//! ```
//!
//! As a [`Subscribe`]r it follows the supervisor's events: `WorkerRevived` and
//! `WorkerAlive` mark a worker active, `StartFailed` and `BackoffSkipped` clear it.

use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::core::guard::panic_message;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Receives the unified status line (`None` = nothing active).
pub trait Presenter: Send + Sync + 'static {
    /// Shows `line`, replacing whatever was shown before.
    fn present(&self, line: Option<&str>);
}

/// Presenter that logs the line through `tracing`.
#[derive(Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn present(&self, line: Option<&str>) {
        tracing::info!(line = line.unwrap_or("-"), "presentation");
    }
}

#[derive(Default)]
struct State {
    active: BTreeMap<String, String>,
    shown: Option<String>,
}

/// Deduplicating aggregator of "worker is active" signals.
pub struct PresentationUnifier {
    presenter: Arc<dyn Presenter>,
    labels: HashMap<String, String>,
    state: Mutex<State>,
}

impl PresentationUnifier {
    /// Creates a unifier with nothing active.
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self {
            presenter,
            labels: HashMap::new(),
            state: Mutex::new(State::default()),
        }
    }

    /// Display label used for `worker` when driven by events (defaults to the id).
    pub fn with_label(mut self, worker: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(worker.into(), label.into());
        self
    }

    /// Marks `worker` active under `label`.
    pub fn set_active(&self, worker: &str, label: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active.insert(worker.to_string(), label.to_string());
        self.refresh(&mut state);
    }

    /// Marks `worker` inactive.
    pub fn clear(&self, worker: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.active.remove(worker).is_some() {
            self.refresh(&mut state);
        }
    }

    /// Line currently shown.
    pub fn status_line(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shown
            .clone()
    }

    fn label_for<'a>(&'a self, worker: &'a str) -> &'a str {
        self.labels.get(worker).map_or(worker, String::as_str)
    }

    fn refresh(&self, state: &mut State) {
        let line = render(&state.active);
        if line == state.shown {
            return;
        }
        let presented = catch_unwind(AssertUnwindSafe(|| self.presenter.present(line.as_deref())));
        if let Err(payload) = presented {
            tracing::warn!(info = %panic_message(&*payload), "presenter panicked");
        }
        state.shown = line;
    }
}

fn render(active: &BTreeMap<String, String>) -> Option<String> {
    if active.is_empty() {
        return None;
    }
    let labels: Vec<&str> = active.values().map(String::as_str).collect();
    Some(format!("{} active: {}", labels.len(), labels.join(", ")))
}

#[async_trait]
impl Subscribe for PresentationUnifier {
    async fn on_event(&self, event: &Event) {
        let Some(worker) = event.worker.as_deref() else {
            return;
        };
        match event.kind {
            EventKind::WorkerRevived | EventKind::WorkerAlive => {
                self.set_active(worker, self.label_for(worker));
            }
            EventKind::StartFailed | EventKind::BackoffSkipped => self.clear(worker),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "PresentationUnifier"
    }
}
