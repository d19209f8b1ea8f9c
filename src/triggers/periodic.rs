//! # In-process periodic trigger.
//!
//! Fires a check every `check_interval` while the process is alive. The first tick is
//! jittered so that a fleet of processes started together does not check in lockstep.
//! Ticks missed while the process was suspended are skipped, not replayed.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::SupervisorCell;
use crate::policies::JitterPolicy;
use crate::triggers::{TriggerKind, fire::fire};

struct Running {
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// Repeating in-process timer requesting checks.
pub struct PeriodicTimer {
    cell: Arc<SupervisorCell>,
    every: Duration,
    jitter: JitterPolicy,
    running: Mutex<Option<Running>>,
}

impl PeriodicTimer {
    /// Creates a stopped timer.
    pub fn new(cell: Arc<SupervisorCell>, every: Duration, jitter: JitterPolicy) -> Self {
        Self {
            cell,
            every: every.max(Duration::from_millis(1)),
            jitter,
            running: Mutex::new(None),
        }
    }

    /// Starts ticking (restarts if already running). Stops when `parent` is cancelled.
    pub fn start(&self, parent: &CancellationToken) {
        let token = parent.child_token();
        let first = self.jitter.apply(self.every);
        let join = tokio::spawn(Self::drive(
            Arc::clone(&self.cell),
            self.every,
            first,
            token.clone(),
        ));

        let previous = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Running { token, join });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
    }

    /// Stops ticking; returns the timer task so the caller can await it.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        running.token.cancel();
        Some(running.join)
    }

    /// True while the timer task is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| !r.join.is_finished() && !r.token.is_cancelled())
    }

    async fn drive(
        cell: Arc<SupervisorCell>,
        every: Duration,
        first: Duration,
        token: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval_at(Instant::now() + first, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    fire(&cell, TriggerKind::Periodic);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, EventKind, StartError, Supervisor, WorkerFn, WorkerSpec};
    use crate::{LivenessProbe, ProbeError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct AlwaysDead;

    #[async_trait]
    impl LivenessProbe for AlwaysDead {
        async fn is_alive(&self, _worker: &str) -> Result<bool, ProbeError> {
            Ok(false)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_request_checks_until_stopped() {
        let starts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&starts);
        let cell = SupervisorCell::new(move || {
            let counter = Arc::clone(&counter);
            Supervisor::builder(Config {
                cycle_timeout: Duration::ZERO,
                ..Config::default()
            })
            .with_worker(WorkerSpec::new(WorkerFn::arc("camera", move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, StartError>(())
                }
            })))
            .with_probe(Arc::new(AlwaysDead))
            .build()
        });
        let mut rx = cell.get().unwrap().subscribe();

        let timer =
            PeriodicTimer::new(Arc::clone(&cell), Duration::from_secs(30), JitterPolicy::None);
        let root = CancellationToken::new();
        timer.start(&root);
        assert!(timer.is_running());

        tokio::time::sleep(Duration::from_secs(95)).await;
        let fired = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::TriggerFired)
            .count();
        assert_eq!(fired, 3);
        assert!(starts.load(Ordering::SeqCst) >= 1);

        timer.stop().unwrap().await.unwrap();
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_keeps_ticking_after_panicking_factory() {
        let builds = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&builds);
        let cell = SupervisorCell::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("factory not ready");
            }
            Supervisor::builder(Config::default())
                .with_worker(WorkerSpec::new(WorkerFn::arc("camera", || async {
                    Ok::<_, StartError>(())
                })))
                .with_probe(Arc::new(AlwaysDead))
                .build()
        });

        let timer =
            PeriodicTimer::new(Arc::clone(&cell), Duration::from_secs(30), JitterPolicy::None);
        let root = CancellationToken::new();
        timer.start(&root);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(timer.is_running());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert!(cell.current().is_some());

        root.cancel();
        timer.stop().unwrap().await.unwrap();
    }
}
