//! # Revival alarm.
//!
//! A repeating wall-clock alarm registered with a [`Scheduler`]. Every firing requests a
//! check and then verifies that the alarm itself is still registered: schedulers may drop
//! registrations (host updates, force-stops, reboots), in which case the alarm installs
//! itself again and publishes `ScheduleLapsed`.

use std::borrow::Cow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::core::SupervisorCell;
use crate::error::SchedulingError;
use crate::events::{Event, EventKind};
use crate::triggers::TriggerConfig;
use crate::triggers::TriggerKind;
use crate::triggers::fire::{fire, publish, report_failure};
use crate::triggers::scheduler::{Cadence, JobCompletion, Registration, Scheduler};

/// Self-healing alarm that requests checks.
pub struct AlarmRevivalTrigger {
    cell: Arc<SupervisorCell>,
    scheduler: Arc<dyn Scheduler>,
    name: Cow<'static, str>,
    every: Duration,
    me: Weak<Self>,
}

impl AlarmRevivalTrigger {
    /// Creates an uninstalled alarm.
    pub fn new(
        cell: Arc<SupervisorCell>,
        scheduler: Arc<dyn Scheduler>,
        cfg: &TriggerConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            cell,
            scheduler,
            name: cfg.alarm_name.clone(),
            every: cfg.alarm_after_clamped(),
            me: me.clone(),
        })
    }

    /// Registration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs (or replaces) the alarm.
    pub fn install(&self) -> Result<(), SchedulingError> {
        let me = self.me.clone();
        self.scheduler.register(Registration {
            name: self.name.clone(),
            cadence: Cadence::Alarm { every: self.every },
            callback: Arc::new(move || match me.upgrade() {
                Some(alarm) => alarm.on_alarm(),
                None => JobCompletion::Success,
            }),
        })?;
        publish(
            &self.cell,
            Event::new(EventKind::ScheduleInstalled)
                .with_trigger(TriggerKind::Alarm)
                .with_reason(&*self.name),
        );
        Ok(())
    }

    /// Cancels and installs again.
    pub fn reinstall(&self) -> Result<(), SchedulingError> {
        self.scheduler.cancel(&self.name);
        self.install()
    }

    /// True if the scheduler still holds the alarm.
    pub fn is_installed(&self) -> bool {
        self.scheduler.is_registered(&self.name)
    }

    /// One firing: request a check, then make sure the alarm is still scheduled.
    pub fn on_alarm(&self) -> JobCompletion {
        let fired = fire(&self.cell, TriggerKind::Alarm);
        self.ensure_installed();
        if fired {
            JobCompletion::Success
        } else {
            JobCompletion::Retry
        }
    }

    /// Re-registers the alarm if the scheduler lost it. Returns true if it had lapsed.
    pub fn ensure_installed(&self) -> bool {
        if self.is_installed() {
            return false;
        }
        publish(
            &self.cell,
            Event::new(EventKind::ScheduleLapsed)
                .with_trigger(TriggerKind::Alarm)
                .with_reason(&*self.name),
        );
        if let Err(e) = self.install() {
            report_failure(&self.cell, TriggerKind::Alarm, &e.to_string());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::LocalScheduler;
    use crate::{Config, StartError, Supervisor, TaskTable, WorkerFn, WorkerSpec};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn cell() -> Arc<SupervisorCell> {
        SupervisorCell::new(|| {
            Supervisor::builder(Config::default())
                .with_worker(WorkerSpec::new(WorkerFn::arc("camera", || async {
                    Ok::<_, StartError>(())
                })))
                .with_probe(TaskTable::new())
                .build()
        })
    }

    #[tokio::test]
    async fn lapsed_alarm_reinstalls_itself() {
        let cell = cell();
        let mut rx = cell.get().unwrap().subscribe();
        let sched = LocalScheduler::new();
        let alarm =
            AlarmRevivalTrigger::new(Arc::clone(&cell), sched.clone(), &TriggerConfig::default());

        alarm.install().unwrap();
        assert!(!alarm.ensure_installed());

        assert!(sched.cancel(alarm.name()));
        assert_eq!(alarm.on_alarm(), JobCompletion::Success);
        assert!(alarm.is_installed());

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert!(kinds.contains(&EventKind::TriggerFired));
        assert!(kinds.contains(&EventKind::ScheduleLapsed));
    }

    #[tokio::test(start_paused = true)]
    async fn firing_through_scheduler_requests_check() {
        let cell = cell();
        let mut rx = cell.get().unwrap().subscribe();
        let sched = LocalScheduler::new();
        let cfg = TriggerConfig {
            alarm_after: Duration::from_secs(60),
            ..TriggerConfig::default()
        };
        let alarm = AlarmRevivalTrigger::new(Arc::clone(&cell), sched.clone(), &cfg);
        alarm.install().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        let fired = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|e| e.kind == EventKind::TriggerFired && e.trigger == Some(TriggerKind::Alarm));
        assert!(fired);
        assert!(alarm.is_installed());
    }

    #[tokio::test(start_paused = true)]
    async fn alarm_survives_panicking_factory() {
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
                .with_probe(TaskTable::new())
                .build()
        });
        let sched = LocalScheduler::new();
        let cfg = TriggerConfig {
            alarm_after: Duration::from_secs(60),
            ..TriggerConfig::default()
        };
        let alarm = AlarmRevivalTrigger::new(Arc::clone(&cell), sched.clone(), &cfg);
        alarm.install().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(alarm.is_installed());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert!(cell.current().is_some());
        assert!(alarm.is_installed());
    }
}
