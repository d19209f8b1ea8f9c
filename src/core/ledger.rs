//! # Restart ledger: per-worker attempt counts and backoff windows.
//!
//! The ledger is the only state that survives between supervision cycles. It lives in
//! memory, is created lazily per worker id on first contact, and is never persisted:
//! a process restart starts everyone from zero.
//!
//! ```text
//! record_attempt ──► attempts += 1, last_start = now
//!                    attempts ≥ max? ──► backoff_until = now + base × attempts
//! record_failure ──► backoff_until = now + base / 2        (attempts unchanged)
//! record_alive   ──► attempts = 0, backoff cleared, last_start cleared
//! is_in_backoff  ──► now < backoff_until
//!                    window expired? ──► window cleared
//!                                        budget was exhausted? ──► attempts = 0
//! ```
//!
//! All methods take `now` explicitly so the whole state machine is testable without
//! waiting on real time.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::policies::SupervisionPolicy;

/// Upper bound used when `now + window` does not fit into an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Bookkeeping for one worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestartState {
    /// Starts issued since the worker was last seen alive (or since its exhaustion window
    /// expired).
    pub attempts: u32,
    /// Checks skip the worker until this instant.
    pub backoff_until: Option<Instant>,
    /// When the most recent successful start was issued.
    pub last_start: Option<Instant>,
}

/// Per-worker restart bookkeeping.
pub struct RestartLedger {
    policy: SupervisionPolicy,
    states: Mutex<HashMap<String, RestartState>>,
}

impl RestartLedger {
    /// Creates an empty ledger governed by `policy`.
    pub fn new(policy: SupervisionPolicy) -> Self {
        Self {
            policy,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Policy the ledger applies.
    pub fn policy(&self) -> &SupervisionPolicy {
        &self.policy
    }

    fn states(&self) -> MutexGuard<'_, HashMap<String, RestartState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attempts recorded for `worker` (0 if unseen).
    pub fn attempts_for(&self, worker: &str) -> u32 {
        self.states().get(worker).map_or(0, |s| s.attempts)
    }

    /// Current state of `worker` (default if unseen).
    pub fn state(&self, worker: &str) -> RestartState {
        self.states().get(worker).copied().unwrap_or_default()
    }

    /// True while `now` is inside the worker's backoff window.
    ///
    /// An expired window is cleared. Only an expired exhaustion window resets the attempt
    /// count; the window opened by a failed start leaves it as it was.
    pub fn is_in_backoff(&self, worker: &str, now: Instant) -> bool {
        let limit = self.policy.attempt_limit();
        let mut states = self.states();
        let Some(state) = states.get_mut(worker) else {
            return false;
        };
        match state.backoff_until {
            Some(until) if now < until => true,
            Some(_) => {
                state.backoff_until = None;
                if state.attempts >= limit {
                    state.attempts = 0;
                }
                false
            }
            None => false,
        }
    }

    /// True if a start was issued less than the settle window ago.
    pub fn is_settling(&self, worker: &str, now: Instant) -> bool {
        let Some(window) = self.policy.settle_window() else {
            return false;
        };
        self.states()
            .get(worker)
            .and_then(|s| s.last_start)
            .is_some_and(|started| now < deadline(started, window))
    }

    /// Records a successfully issued start; returns the new attempt count.
    ///
    /// Reaching the budget opens a window of `base × attempts`.
    pub fn record_attempt(&self, worker: &str, now: Instant) -> u32 {
        let limit = self.policy.attempt_limit();
        let mut states = self.states();
        let state = states.entry(worker.to_string()).or_default();

        state.attempts = state.attempts.saturating_add(1);
        state.last_start = Some(now);
        if state.attempts >= limit {
            let window = self.policy.exhausted_backoff(state.attempts);
            state.backoff_until = Some(deadline(now, window));
        }
        state.attempts
    }

    /// Records a failed start: opens a window of `base / 2`, attempts unchanged.
    ///
    /// Returns the window that was opened.
    pub fn record_failure(&self, worker: &str, now: Instant) -> Duration {
        let window = self.policy.failure_backoff();
        let mut states = self.states();
        let state = states.entry(worker.to_string()).or_default();
        state.backoff_until = Some(deadline(now, window));
        window
    }

    /// Records that `worker` was observed alive: full reset.
    pub fn record_alive(&self, worker: &str) {
        let mut states = self.states();
        let state = states.entry(worker.to_string()).or_default();
        *state = RestartState::default();
    }

    /// Snapshot of all known workers, sorted by id.
    pub fn snapshot(&self) -> Vec<(String, RestartState)> {
        let mut out: Vec<(String, RestartState)> = self
            .states()
            .iter()
            .map(|(id, s)| (id.clone(), *s))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

fn deadline(from: Instant, window: Duration) -> Instant {
    from.checked_add(window)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn ledger() -> RestartLedger {
        RestartLedger::new(SupervisionPolicy {
            max_restart_attempts: 3,
            base_backoff: ms(300_000),
            settle: Duration::ZERO,
            ..SupervisionPolicy::default()
        })
    }

    #[test]
    fn third_attempt_opens_linear_window() {
        let l = ledger();
        let t = Instant::now();

        assert_eq!(l.record_attempt("gallery", t), 1);
        assert_eq!(l.record_attempt("gallery", t), 2);
        assert!(!l.is_in_backoff("gallery", t));
        assert_eq!(l.record_attempt("gallery", t), 3);

        assert_eq!(l.state("gallery").backoff_until, Some(t + ms(900_000)));
        assert!(l.is_in_backoff("gallery", t + ms(60_000)));
    }

    #[test]
    fn failure_opens_half_window_without_counting() {
        let l = ledger();
        let t = Instant::now();

        assert_eq!(l.record_failure("transfer", t), ms(150_000));
        assert_eq!(l.attempts_for("transfer"), 0);
        assert!(l.is_in_backoff("transfer", t + ms(149_999)));
        assert!(!l.is_in_backoff("transfer", t + ms(150_000)));
    }

    #[test]
    fn expired_failure_window_keeps_attempt_history() {
        let l = ledger();
        let t = Instant::now();
        l.record_attempt("gallery", t);
        l.record_attempt("gallery", t + ms(30_000));
        l.record_failure("gallery", t + ms(60_000));
        assert_eq!(l.attempts_for("gallery"), 2);

        let later = t + ms(60_000 + 150_000);
        assert!(!l.is_in_backoff("gallery", later));
        assert_eq!(l.attempts_for("gallery"), 2);
        assert_eq!(l.state("gallery").backoff_until, None);

        assert_eq!(l.record_attempt("gallery", later), 3);
        assert_eq!(l.state("gallery").backoff_until, Some(later + ms(900_000)));
    }

    #[test]
    fn alive_resets_everything() {
        let l = ledger();
        let t = Instant::now();
        l.record_attempt("camera", t);
        l.record_attempt("camera", t);

        l.record_alive("camera");
        assert_eq!(l.state("camera"), RestartState::default());
    }

    #[test]
    fn window_holds_until_it_expires_then_budget_resets() {
        let l = ledger();
        let t = Instant::now();
        for _ in 0..3 {
            l.record_attempt("gallery", t);
        }

        for offset in [0, 1, 450_000, 899_999] {
            assert!(l.is_in_backoff("gallery", t + ms(offset)), "offset {offset}");
        }
        // Probing an earlier instant again must still hold the window.
        assert!(l.is_in_backoff("gallery", t));

        assert!(!l.is_in_backoff("gallery", t + ms(900_000)));
        assert_eq!(l.attempts_for("gallery"), 0);
        assert_eq!(l.state("gallery").backoff_until, None);
    }

    #[test]
    fn attempts_never_pass_budget_without_window() {
        let l = ledger();
        let t = Instant::now();
        for n in 1..=10u32 {
            let now = t + ms(u64::from(n) * 1_000_000);
            if l.is_in_backoff("w", now) {
                continue;
            }
            let attempts = l.record_attempt("w", now);
            let st = l.state("w");
            assert!(attempts < 3 || st.backoff_until.is_some());
        }
    }

    #[test]
    fn settle_window_blocks_immediate_restart() {
        let l = RestartLedger::new(SupervisionPolicy {
            settle: ms(5_000),
            ..SupervisionPolicy::default()
        });
        let t = Instant::now();
        assert!(!l.is_settling("camera", t));

        l.record_attempt("camera", t);
        assert!(l.is_settling("camera", t + ms(4_999)));
        assert!(!l.is_settling("camera", t + ms(5_000)));
    }

    #[test]
    fn snapshot_is_sorted() {
        let l = ledger();
        let t = Instant::now();
        l.record_attempt("transfer", t);
        l.record_alive("camera");

        let ids: Vec<String> = l.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["camera".to_string(), "transfer".to_string()]);
    }
}
