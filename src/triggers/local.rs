//! # Scheduler on tokio timers.
//!
//! [`LocalScheduler`] runs each registration on its own task. It is what a process uses
//! when no OS job service is available, and what the tests use.
//!
//! - `Periodic`: first run after `min_latency`, then every `every`; a `Retry` completion
//!   schedules the next run after `min_latency` instead. `deadline` is not needed: local
//!   timers are not batched.
//! - `Alarm`: runs every `every` (first run after one period).
//!
//! A panicking callback counts as `Retry`. Whenever a registration task ends, its entry is
//! removed, so `is_registered` never reports a registration that no longer runs.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::guard::panic_message;
use crate::error::SchedulingError;
use crate::triggers::scheduler::{Cadence, JobCallback, JobCompletion, Registration, Scheduler};

struct Entry {
    id: u64,
    token: CancellationToken,
}

/// Installed registrations by name.
type Entries = HashMap<String, Entry>;

/// Tokio-backed [`Scheduler`].
pub struct LocalScheduler {
    entries: Arc<Mutex<Entries>>,
    next_id: AtomicU64,
    token: CancellationToken,
}

/// Removes the entry of a registration task when the task ends.
struct Deregister {
    entries: Arc<Mutex<Entries>>,
    name: String,
    id: u64,
}

impl Drop for Deregister {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.get(&self.name).is_some_and(|e| e.id == self.id) {
            entries.remove(&self.name);
        }
    }
}

impl LocalScheduler {
    /// Creates a scheduler; registrations require a running tokio runtime.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            token: CancellationToken::new(),
        })
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Names of installed registrations, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Cancels every registration and refuses new ones.
    pub fn shutdown(&self) {
        self.token.cancel();
        self.entries().clear();
    }

    async fn drive(
        cadence: Cadence,
        callback: JobCallback,
        token: CancellationToken,
        _deregister: Deregister,
    ) {
        let mut next = match cadence {
            Cadence::Periodic { min_latency, .. } => min_latency,
            Cadence::Alarm { every } => every,
        };
        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(next) => {}
            }
            let completion = match catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(completion) => completion,
                Err(payload) => {
                    tracing::warn!(info = %panic_message(&*payload), "scheduled job panicked");
                    JobCompletion::Retry
                }
            };
            next = match (cadence, completion) {
                (Cadence::Periodic { min_latency, .. }, JobCompletion::Retry) => min_latency,
                (Cadence::Periodic { every, .. }, JobCompletion::Success) => every,
                (Cadence::Alarm { every }, _) => every,
            }
            .max(Duration::from_millis(1));
        }
    }
}

impl Scheduler for LocalScheduler {
    fn register(&self, registration: Registration) -> Result<(), SchedulingError> {
        if self.token.is_cancelled() {
            return Err(SchedulingError::Unavailable);
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| SchedulingError::Rejected {
                name: registration.name.to_string(),
                reason: e.to_string(),
            })?;

        let name = registration.name.to_string();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.token.child_token();
        let previous = self.entries().insert(
            name.clone(),
            Entry {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        let deregister = Deregister {
            entries: Arc::clone(&self.entries),
            name,
            id,
        };
        runtime.spawn(Self::drive(
            registration.cadence,
            registration.callback,
            token,
            deregister,
        ));
        Ok(())
    }

    fn is_registered(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    fn cancel(&self, name: &str) -> bool {
        match self.entries().remove(name) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting(counter: &Arc<AtomicU32>, completion: JobCompletion) -> JobCallback {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            completion
        })
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_respects_min_latency_then_period() {
        let sched = LocalScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));
        sched
            .register(Registration {
                name: Cow::Borrowed("job"),
                cadence: Cadence::Periodic {
                    every: Duration::from_secs(60),
                    min_latency: Duration::from_secs(10),
                    deadline: None,
                },
                callback: counting(&runs, JobCompletion::Success),
            })
            .unwrap();

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_uses_min_latency() {
        let sched = LocalScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));
        sched
            .register(Registration {
                name: Cow::Borrowed("job"),
                cadence: Cadence::Periodic {
                    every: Duration::from_secs(600),
                    min_latency: Duration::from_secs(10),
                    deadline: Some(Duration::from_secs(900)),
                },
                callback: counting(&runs, JobCompletion::Retry),
            })
            .unwrap();

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_replace() {
        let sched = LocalScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));
        let alarm = |runs: &Arc<AtomicU32>| Registration {
            name: Cow::Borrowed("alarm"),
            cadence: Cadence::Alarm {
                every: Duration::from_secs(10),
            },
            callback: counting(runs, JobCompletion::Success),
        };

        sched.register(alarm(&runs)).unwrap();
        sched.register(alarm(&runs)).unwrap();
        assert_eq!(sched.registered(), vec!["alarm".to_string()]);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert!(sched.cancel("alarm"));
        assert!(!sched.is_registered("alarm"));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_job_is_retried_and_stays_registered() {
        let sched = LocalScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        sched
            .register(Registration {
                name: Cow::Borrowed("job"),
                cadence: Cadence::Periodic {
                    every: Duration::from_secs(600),
                    min_latency: Duration::from_secs(10),
                    deadline: None,
                },
                callback: Arc::new(move || {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        panic!("job exploded");
                    }
                    JobCompletion::Success
                }),
            })
            .unwrap();

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(sched.is_registered("job"));

        // Panic counts as Retry: next run after min_latency, not the full period.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert!(sched.is_registered("job"));
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_registration_keeps_its_entry() {
        let sched = LocalScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));
        let alarm = |runs: &Arc<AtomicU32>| Registration {
            name: Cow::Borrowed("alarm"),
            cadence: Cadence::Alarm {
                every: Duration::from_secs(10),
            },
            callback: counting(runs, JobCompletion::Success),
        };

        sched.register(alarm(&runs)).unwrap();
        sched.register(alarm(&runs)).unwrap();
        // Let the replaced task observe its cancellation and exit.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(sched.is_registered("alarm"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shut_down_scheduler_is_unavailable() {
        let sched = LocalScheduler::new();
        sched.shutdown();
        let err = sched
            .register(Registration {
                name: Cow::Borrowed("job"),
                cadence: Cadence::Alarm {
                    every: Duration::from_secs(1),
                },
                callback: Arc::new(|| JobCompletion::Success),
            })
            .unwrap_err();
        assert_eq!(err, SchedulingError::Unavailable);
    }
}
