//! # Supervisor: one serialized check-and-restart cycle over a fixed registry.
//!
//! The [`Supervisor`] owns the worker registry, the [`RestartLedger`], the liveness
//! probe and the event [`Bus`]. Every trigger ends up calling the same cycle, and cycles
//! never overlap: a second caller waits for the first to finish, then observes its
//! effects (including the settle window of workers it just started).
//!
//! ## Cycle
//! ```text
//! check(trigger, now)
//!   ├─► lock cycle                       (one cycle at a time)
//!   ├─► publish CheckStarted
//!   ├─► for spec in registry (registration order):
//!   │     ├─ ledger.is_in_backoff?      ─► InBackoff       (BackoffSkipped)
//!   │     ├─ probe.is_alive             ─► error/panic = dead (ProbeFailed)
//!   │     │                                timeout = abandon rest (CheckAbandoned)
//!   │     ├─ alive                      ─► Alive, ledger reset (WorkerAlive)
//!   │     ├─ ledger.is_settling?        ─► Settling        (SettlingSkipped)
//!   │     └─ worker.start
//!   │          ├─ Ok   ─► record_attempt ─► Revived     (WorkerRevived [+ BackoffEntered])
//!   │          └─ Err  ─► record_failure ─► StartFailed (StartFailed + BackoffEntered)
//!   ├─► sort verdicts by priority
//!   └─► publish CheckCompleted(outcome)
//! ```
//!
//! ## Event flow
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                          ├──► StatusReporter
//!                                                          ├──► PresentationUnifier
//!                                                          └──► LogWriter (feature "logging")
//! ```
//!
//! ## Shutdown
//! ```text
//! shutdown()
//!   ├─► publish ShutdownRequested
//!   ├─► runtime_token.cancel()         → coordinator stops, handles report Closed
//!   ├─► wait for the in-flight cycle up to cfg.grace
//!   │      ├─ idle in time  → AllStoppedWithin
//!   │      └─ still busy    → GraceExceeded (RuntimeError::GraceExceeded)
//!   └─► drain listener and subscriber queues
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use keepalive::{Config, StartError, Supervisor, TaskTable, WorkerSpec};
//! use tokio::time::Instant;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = TaskTable::new();
//!     let camera = table.worker("camera", |token: CancellationToken| async move {
//!         token.cancelled().await;
//!     });
//!
//!     let sup = Supervisor::builder(Config::default())
//!         .with_workers(vec![WorkerSpec::new(camera)])
//!         .with_probe(table.clone())
//!         .build()?;
//!
//!     let outcome = sup.check_and_restart(Instant::now()).await;
//!     assert!(outcome.revived.contains("camera"));
//!
//!     sup.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, error::Elapsed};
use tokio_util::sync::CancellationToken;

use crate::core::coordinator::SupervisorHandle;
use crate::core::guard;
use crate::core::ledger::RestartLedger;
use crate::core::outcome::{SupervisionOutcome, Verdict};
use crate::core::{Config, SupervisorBuilder};
use crate::error::{ProbeError, RuntimeError, StartError};
use crate::events::{Bus, Event, EventKind};
use crate::probe::LivenessProbe;
use crate::subscribers::SubscriberSet;
use crate::triggers::TriggerKind;
use crate::workers::WorkerSpec;

/// Checks a fixed set of workers and restarts the dead ones within a restart budget.
pub struct Supervisor {
    cfg: Config,
    workers: Vec<WorkerSpec>,
    ledger: RestartLedger,
    probe: Arc<dyn LivenessProbe>,
    bus: Bus,
    cycle: tokio::sync::Mutex<()>,
    runtime_token: CancellationToken,
    listener_token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
    handle: SupervisorHandle,
}

impl Supervisor {
    /// Starts building a supervisor.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        workers: Vec<WorkerSpec>,
        probe: Arc<dyn LivenessProbe>,
        bus: Bus,
        runtime_token: CancellationToken,
        handle: SupervisorHandle,
    ) -> Self {
        Self {
            ledger: RestartLedger::new(cfg.policy),
            cfg,
            workers,
            probe,
            bus,
            cycle: tokio::sync::Mutex::new(()),
            runtime_token,
            listener_token: CancellationToken::new(),
            listener: Mutex::new(None),
            handle,
        }
    }

    /// Runs one supervision cycle on behalf of a direct caller.
    ///
    /// `now` is the logical time used for every ledger decision of the cycle.
    pub async fn check_and_restart(&self, now: Instant) -> SupervisionOutcome {
        Arc::unwrap_or_clone(self.check(TriggerKind::Manual, now).await)
    }

    /// Handle used by triggers to request cycles without racing each other.
    pub fn handle(&self) -> SupervisorHandle {
        self.handle.clone()
    }

    /// Restart bookkeeping (read-only view for callers).
    pub fn ledger(&self) -> &RestartLedger {
        &self.ledger
    }

    /// Registered workers, in registration order.
    pub fn workers(&self) -> &[WorkerSpec] {
        &self.workers
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Subscribes to the raw event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// True once [`Supervisor::shutdown`] has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.runtime_token.is_cancelled()
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Stops accepting trigger requests and waits up to `cfg.grace` for an in-flight cycle.
    ///
    /// Calling it again after the first call is a no-op.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        if self.runtime_token.is_cancelled() {
            return Ok(());
        }
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.runtime_token.cancel();

        let grace = self.cfg.grace;
        let res = match time::timeout(grace, self.cycle.lock()).await {
            Ok(_idle) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason("supervision cycle"),
                );
                Err(RuntimeError::GraceExceeded {
                    grace,
                    pending: vec!["supervision cycle".to_string()],
                })
            }
        };
        self.stop_listener(grace).await;
        res
    }

    /// Subscribes to the bus and forwards events to the subscriber set until shutdown.
    pub(crate) fn spawn_listener(&self, subs: SubscriberSet) {
        let mut rx = self.bus.subscribe();
        let token = self.listener_token.clone();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            subs.emit(&ev);
                        }
                        break;
                    }
                }
            }
            subs.shutdown().await;
        });
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(join);
    }

    async fn stop_listener(&self, grace: Duration) {
        self.listener_token.cancel();
        let join = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(join) = join {
            if time::timeout(grace, join).await.is_err() {
                tracing::warn!(?grace, "subscribers did not drain within grace");
            }
        }
    }

    /// Runs one cycle; serialized with every other cycle of this supervisor.
    pub(crate) async fn check(
        &self,
        trigger: TriggerKind,
        now: Instant,
    ) -> Arc<SupervisionOutcome> {
        let _cycle = self.cycle.lock().await;
        self.bus
            .publish(Event::new(EventKind::CheckStarted).with_trigger(trigger));

        let budget = self.cfg.cycle_budget();
        let deadline = budget.map(|b| Instant::now() + b);
        let mut outcome = SupervisionOutcome::new(trigger);

        let mut pending = self.workers.iter();
        while let Some(spec) = pending.next() {
            let Err(reason) = self.check_worker(spec, trigger, now, deadline, &mut outcome).await
            else {
                continue;
            };
            self.bus.publish(
                Event::new(EventKind::CheckAbandoned)
                    .with_trigger(trigger)
                    .with_worker(spec.id())
                    .with_reason(reason),
            );
            outcome.record(spec, Verdict::Abandoned);
            for rest in pending.by_ref() {
                outcome.record(rest, Verdict::Abandoned);
            }
            break;
        }

        let outcome = Arc::new(outcome.finish());
        self.bus.publish(
            Event::new(EventKind::CheckCompleted)
                .with_trigger(trigger)
                .with_outcome(Arc::clone(&outcome)),
        );
        outcome
    }

    /// Decides and acts for one worker. `Err` means the cycle ran out of time.
    async fn check_worker(
        &self,
        spec: &WorkerSpec,
        trigger: TriggerKind,
        now: Instant,
        deadline: Option<Instant>,
        outcome: &mut SupervisionOutcome,
    ) -> Result<(), String> {
        let id = spec.id();

        if self.ledger.is_in_backoff(id, now) {
            self.publish_worker(EventKind::BackoffSkipped, id, trigger);
            outcome.record(spec, Verdict::InBackoff);
            return Ok(());
        }

        let alive = match within(deadline, guard::catch(self.probe.is_alive(id))).await {
            Ok(Ok(Ok(alive))) => alive,
            Ok(Ok(Err(e))) => {
                self.publish_probe_failed(id, trigger, &e);
                false
            }
            Ok(Err(info)) => {
                self.publish_probe_failed(id, trigger, &ProbeError::Panicked { info });
                false
            }
            Err(_) => {
                let timeout = self.cfg.cycle_timeout;
                self.publish_probe_failed(id, trigger, &ProbeError::Timeout { timeout });
                return Err(format!("probe of '{id}' exceeded cycle budget {timeout:?}"));
            }
        };

        if alive {
            self.ledger.record_alive(id);
            self.publish_worker(EventKind::WorkerAlive, id, trigger);
            outcome.record(spec, Verdict::Alive);
            return Ok(());
        }

        if self.ledger.is_settling(id, now) {
            self.publish_worker(EventKind::SettlingSkipped, id, trigger);
            outcome.record(spec, Verdict::Settling);
            return Ok(());
        }

        let started = match within(deadline, guard::catch(spec.worker().start())).await {
            Ok(Ok(res)) => res,
            Ok(Err(info)) => Err(StartError::unexpected(format!("start panicked: {info}"))),
            Err(_) => Err(StartError::unexpected("start exceeded cycle budget")),
        };

        match started {
            Ok(()) => {
                let attempt = self.ledger.record_attempt(id, now);
                self.bus.publish(
                    Event::new(EventKind::WorkerRevived)
                        .with_worker(id)
                        .with_trigger(trigger)
                        .with_attempt(attempt),
                );
                let policy = self.ledger.policy();
                if attempt >= policy.attempt_limit() {
                    self.bus.publish(
                        Event::new(EventKind::BackoffEntered)
                            .with_worker(id)
                            .with_attempt(attempt)
                            .with_delay(policy.exhausted_backoff(attempt)),
                    );
                }
                outcome.record(spec, Verdict::Revived { attempt });
            }
            Err(e) => {
                let window = self.ledger.record_failure(id, now);
                let reason = e.to_string();
                self.bus.publish(
                    Event::new(EventKind::StartFailed)
                        .with_worker(id)
                        .with_trigger(trigger)
                        .with_reason(reason.as_str()),
                );
                self.bus.publish(
                    Event::new(EventKind::BackoffEntered)
                        .with_worker(id)
                        .with_attempt(self.ledger.attempts_for(id))
                        .with_delay(window),
                );
                outcome.record(spec, Verdict::StartFailed { reason });
            }
        }
        Ok(())
    }

    fn publish_worker(&self, kind: EventKind, id: &str, trigger: TriggerKind) {
        self.bus
            .publish(Event::new(kind).with_worker(id).with_trigger(trigger));
    }

    fn publish_probe_failed(&self, id: &str, trigger: TriggerKind, err: &ProbeError) {
        self.bus.publish(
            Event::new(EventKind::ProbeFailed)
                .with_worker(id)
                .with_trigger(trigger)
                .with_reason(err.to_string()),
        );
    }
}

/// Awaits `fut`, bounded by `deadline` when one is set.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Result<F::Output, Elapsed> {
    match deadline {
        Some(at) => time::timeout_at(at, fut).await,
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::SupervisionPolicy;
    use crate::{WorkerFn, WorkerRef};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    /// Scripted environment: who is alive, who fails to start, who counts starts.
    #[derive(Default)]
    struct World {
        alive: Mutex<HashSet<String>>,
        refuse: Mutex<HashSet<String>>,
        broken_probe: Mutex<HashSet<String>>,
        starts: Mutex<HashMap<String, u32>>,
        probe_delay: Mutex<Option<Duration>>,
        comes_up_on_start: Mutex<bool>,
    }

    impl World {
        fn set_alive(&self, id: &str, alive: bool) {
            let mut set = self.alive.lock().unwrap();
            if alive {
                set.insert(id.to_string());
            } else {
                set.remove(id);
            }
        }

        fn starts(&self, id: &str) -> u32 {
            self.starts.lock().unwrap().get(id).copied().unwrap_or(0)
        }

        fn start(&self, id: &str) -> Result<(), StartError> {
            if self.refuse.lock().unwrap().contains(id) {
                return Err(StartError::rejected("background start not allowed"));
            }
            *self.starts.lock().unwrap().entry(id.to_string()).or_default() += 1;
            if *self.comes_up_on_start.lock().unwrap() {
                self.set_alive(id, true);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LivenessProbe for World {
        async fn is_alive(&self, worker: &str) -> Result<bool, ProbeError> {
            let delay = *self.probe_delay.lock().unwrap();
            if let Some(d) = delay {
                time::sleep(d).await;
            }
            if self.broken_probe.lock().unwrap().contains(worker) {
                return Err(ProbeError::introspection("process table unreadable"));
            }
            Ok(self.alive.lock().unwrap().contains(worker))
        }
    }

    fn worker(world: &Arc<World>, id: &'static str) -> WorkerRef {
        let world = Arc::clone(world);
        WorkerFn::arc(id, move || {
            let world = Arc::clone(&world);
            async move { world.start(id) }
        })
    }

    fn config(settle: Duration) -> Config {
        Config {
            policy: SupervisionPolicy {
                max_restart_attempts: 3,
                base_backoff: Duration::from_millis(300_000),
                settle,
                ..SupervisionPolicy::default()
            },
            ..Config::default()
        }
    }

    fn build(world: &Arc<World>, cfg: Config, specs: Vec<WorkerSpec>) -> Arc<Supervisor> {
        Supervisor::builder(cfg)
            .with_workers(specs)
            .with_probe(Arc::clone(world) as Arc<dyn LivenessProbe>)
            .build()
            .unwrap()
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test(start_paused = true)]
    async fn dead_worker_exhausts_budget_then_backs_off() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "gallery"))],
        );
        let t0 = Instant::now();

        for (i, offset) in [0u64, 30, 60].into_iter().enumerate() {
            let o = sup.check_and_restart(t0 + secs(offset)).await;
            assert!(o.revived.contains("gallery"));
            assert_eq!(sup.ledger().attempts_for("gallery"), i as u32 + 1);
        }
        assert_eq!(
            sup.ledger().state("gallery").backoff_until,
            Some(t0 + secs(60) + Duration::from_millis(900_000))
        );

        let o = sup.check_and_restart(t0 + secs(90)).await;
        assert!(o.skipped_in_backoff.contains("gallery"));
        assert!(o.revived.is_empty());
        assert_eq!(world.starts("gallery"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_start_opens_half_window_without_counting() {
        let world = Arc::new(World::default());
        world.refuse.lock().unwrap().insert("transfer".into());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "transfer"))],
        );
        let t0 = Instant::now();

        let o = sup.check_and_restart(t0).await;
        assert!(o.failed.contains("transfer"));
        assert!(o.revived.is_empty());
        assert_eq!(sup.ledger().attempts_for("transfer"), 0);
        assert_eq!(
            sup.ledger().state("transfer").backoff_until,
            Some(t0 + Duration::from_millis(150_000))
        );

        let o = sup.check_and_restart(t0 + secs(30)).await;
        assert!(o.skipped_in_backoff.contains("transfer"));
    }

    #[tokio::test(start_paused = true)]
    async fn recovery_resets_attempts() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let t0 = Instant::now();

        sup.check_and_restart(t0).await;
        sup.check_and_restart(t0 + secs(30)).await;
        assert_eq!(sup.ledger().attempts_for("camera"), 2);

        world.set_alive("camera", true);
        let o = sup.check_and_restart(t0 + secs(60)).await;
        assert!(o.alive.contains("camera"));
        assert!(o.revived.is_empty());
        assert_eq!(sup.ledger().attempts_for("camera"), 0);
        assert_eq!(sup.ledger().state("camera").backoff_until, None);
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_registry_is_idempotent() {
        let world = Arc::new(World::default());
        for id in ["camera", "gallery"] {
            world.set_alive(id, true);
        }
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![
                WorkerSpec::new(worker(&world, "camera")),
                WorkerSpec::new(worker(&world, "gallery")),
            ],
        );
        let t0 = Instant::now();

        let a = sup.check_and_restart(t0).await;
        let snap = sup.ledger().snapshot();
        let b = sup.check_and_restart(t0).await;

        assert_eq!(a.verdicts, b.verdicts);
        assert_eq!(snap, sup.ledger().snapshot());
        assert!(a.is_quiet());
    }

    #[tokio::test(start_paused = true)]
    async fn default_config_backs_off_after_three_starts() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            Config::default(),
            vec![WorkerSpec::new(worker(&world, "W"))],
        );
        let t0 = Instant::now();

        for (i, offset) in [0u64, 1, 2].into_iter().enumerate() {
            let o = sup.check_and_restart(t0 + secs(offset)).await;
            assert!(o.revived.contains("W"), "t={offset}s");
            assert_eq!(sup.ledger().attempts_for("W"), i as u32 + 1);
        }
        assert_eq!(
            sup.ledger().state("W").backoff_until,
            Some(t0 + secs(2) + Duration::from_millis(900_000))
        );

        let o = sup.check_and_restart(t0 + secs(3)).await;
        assert!(o.skipped_in_backoff.contains("W"));
        assert!(o.revived.is_empty());
        assert_eq!(world.starts("W"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_window_expiry_keeps_budget_spent() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "W"))],
        );
        let t0 = Instant::now();

        sup.check_and_restart(t0).await;
        sup.check_and_restart(t0 + secs(30)).await;
        world.refuse.lock().unwrap().insert("W".into());
        let o = sup.check_and_restart(t0 + secs(60)).await;
        assert!(o.failed.contains("W"));
        assert_eq!(sup.ledger().attempts_for("W"), 2);

        world.refuse.lock().unwrap().clear();
        let o = sup.check_and_restart(t0 + secs(60 + 151)).await;
        assert!(o.revived.contains("W"));
        assert_eq!(sup.ledger().attempts_for("W"), 3);
        assert!(sup.ledger().state("W").backoff_until.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_checks_do_not_double_start() {
        let world = Arc::new(World::default());
        *world.comes_up_on_start.lock().unwrap() = true;
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let now = Instant::now();

        let (a, b) = tokio::join!(sup.check_and_restart(now), sup.check_and_restart(now));

        assert_eq!(world.starts("camera"), 1);
        assert_eq!(a.revived.len() + b.revived.len(), 1);
        assert_eq!(a.alive.len() + b.alive.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_window_holds_back_unobservable_start() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(secs(5)),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let now = Instant::now();

        let (a, b) = tokio::join!(sup.check_and_restart(now), sup.check_and_restart(now));

        assert_eq!(world.starts("camera"), 1);
        assert_eq!(a.revived.len() + b.revived.len(), 1);
        assert_eq!(a.settling.len() + b.settling.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn triggers_through_handle_start_once() {
        let world = Arc::new(World::default());
        *world.comes_up_on_start.lock().unwrap() = true;
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let periodic = sup.handle();
        let alarm = sup.handle();

        let (a, b) = tokio::join!(
            periodic.check(TriggerKind::Periodic),
            alarm.check(TriggerKind::Alarm)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(world.starts("camera"), 1);
        assert!(a.revived.contains("camera") || a.alive.contains("camera"));
        assert!(b.revived.contains("camera") || b.alive.contains("camera"));
    }

    #[tokio::test(start_paused = true)]
    async fn handle_requests_share_one_cycle_each() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let h = sup.handle();
        let mut rx = sup.subscribe();

        let (a, b, c) = tokio::join!(
            h.check(TriggerKind::Periodic),
            h.check(TriggerKind::Alarm),
            h.check(TriggerKind::DeferredJob)
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(world.starts("camera"), 1);

        let coalesced = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::ChecksCoalesced)
            .unwrap();
        assert_eq!(coalesced.folded, Some(2));
        assert_eq!(coalesced.attempt, None);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_error_counts_as_dead() {
        let world = Arc::new(World::default());
        world.broken_probe.lock().unwrap().insert("camera".into());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let mut rx = sup.subscribe();

        let o = sup.check_and_restart(Instant::now()).await;
        assert!(o.revived.contains("camera"));

        let kinds = drain(&mut rx);
        assert!(kinds.contains(&EventKind::ProbeFailed));
        assert!(kinds.contains(&EventKind::WorkerRevived));
        assert_eq!(kinds.last(), Some(&EventKind::CheckCompleted));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_start_is_contained() {
        let world = Arc::new(World::default());
        let bomb: WorkerRef = WorkerFn::arc("bomb", || async {
            if true {
                panic!("start exploded");
            }
            Ok::<_, StartError>(())
        });
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(bomb), WorkerSpec::new(worker(&world, "camera"))],
        );

        let o = sup.check_and_restart(Instant::now()).await;
        assert!(o.failed.contains("bomb"));
        assert!(o.revived.contains("camera"));
        match o.verdict("bomb") {
            Some(Verdict::StartFailed { reason }) => assert!(reason.contains("start exploded")),
            other => panic!("unexpected verdict {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_abandons_rest_of_cycle() {
        let world = Arc::new(World::default());
        *world.probe_delay.lock().unwrap() = Some(secs(60));
        let cfg = Config {
            cycle_timeout: secs(1),
            ..config(Duration::ZERO)
        };
        let sup = build(
            &world,
            cfg,
            vec![
                WorkerSpec::new(worker(&world, "camera")),
                WorkerSpec::new(worker(&world, "gallery")),
            ],
        );
        let mut rx = sup.subscribe();

        let o = sup.check_and_restart(Instant::now()).await;
        assert_eq!(o.abandoned.len(), 2);
        assert!(o.revived.is_empty());
        assert_eq!(world.starts("camera"), 0);
        assert!(drain(&mut rx).contains(&EventKind::CheckAbandoned));
    }

    #[tokio::test(start_paused = true)]
    async fn verdicts_follow_priority() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![
                WorkerSpec::new(worker(&world, "transfer")).with_priority(2),
                WorkerSpec::new(worker(&world, "camera")).with_priority(0),
                WorkerSpec::new(worker(&world, "gallery")).with_priority(1),
            ],
        );

        let o = sup.check_and_restart(Instant::now()).await;
        let order: Vec<&str> = o.verdicts.iter().map(|v| v.worker.as_str()).collect();
        assert_eq!(order, vec!["camera", "gallery", "transfer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_handle() {
        let world = Arc::new(World::default());
        let sup = build(
            &world,
            config(Duration::ZERO),
            vec![WorkerSpec::new(worker(&world, "camera"))],
        );
        let h = sup.handle();

        sup.shutdown().await.unwrap();
        assert!(sup.is_shut_down());
        assert_eq!(
            h.check(TriggerKind::Periodic).await.unwrap_err(),
            crate::CheckError::Closed
        );
        assert!(sup.shutdown().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_reports_stuck_cycle() {
        let world = Arc::new(World::default());
        *world.probe_delay.lock().unwrap() = Some(secs(600));
        let cfg = Config {
            cycle_timeout: Duration::ZERO,
            grace: secs(1),
            ..config(Duration::ZERO)
        };
        let sup = build(&world, cfg, vec![WorkerSpec::new(worker(&world, "camera"))]);

        let busy = Arc::clone(&sup);
        let cycle = tokio::spawn(async move { busy.check_and_restart(Instant::now()).await });
        time::sleep(Duration::from_millis(10)).await;

        let err = sup.shutdown().await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_grace_exceeded");
        cycle.abort();
    }
}
