//! # Check coordinator: fan-in of trigger requests into serialized cycles.
//!
//! Every trigger talks to the supervisor through a cloneable [`SupervisorHandle`]. Requests
//! land in one bounded queue; a single coordinator task drains it and runs one cycle per
//! batch, so requests that arrive while a cycle is running are folded into the next one.
//!
//! ```text
//! PeriodicTimer ──┐
//! DeferredJob   ──┤  request()/check()   ┌──────────────┐   sup.check(trigger)
//! BootTrigger   ──┼────────────────────► │ coordinator  │ ───────────────────► Supervisor
//! AlarmRevival  ──┘     (mpsc, bounded)  │ drain batch  │ ◄─── Arc<Outcome> ─┘
//!                                        └──────┬───────┘
//!                                               └─► reply to every waiter in the batch
//! ```
//!
//! The coordinator holds only a `Weak` reference: dropping the last `Arc<Supervisor>`
//! (or calling `shutdown`) ends it, after which handles report [`CheckError::Closed`].

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::outcome::SupervisionOutcome;
use crate::core::supervisor::Supervisor;
use crate::error::CheckError;
use crate::events::{Bus, Event, EventKind};
use crate::triggers::TriggerKind;

pub(crate) struct CheckRequest {
    trigger: TriggerKind,
    reply: Option<oneshot::Sender<Arc<SupervisionOutcome>>>,
}

/// Cloneable entry point for requesting supervision cycles.
#[derive(Clone)]
pub struct SupervisorHandle {
    tx: mpsc::Sender<CheckRequest>,
}

impl SupervisorHandle {
    pub(crate) fn channel(capacity: usize) -> (Self, mpsc::Receiver<CheckRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Requests a cycle and waits for the outcome of the cycle that served it.
    pub async fn check(&self, trigger: TriggerKind) -> Result<Arc<SupervisionOutcome>, CheckError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CheckRequest {
                trigger,
                reply: Some(reply),
            })
            .await
            .map_err(|_| CheckError::Closed)?;
        rx.await.map_err(|_| CheckError::Closed)
    }

    /// Requests a cycle without waiting.
    ///
    /// A full queue is success: the queued requests already guarantee a cycle.
    pub fn request(&self, trigger: TriggerKind) -> Result<(), CheckError> {
        match self.tx.try_send(CheckRequest {
            trigger,
            reply: None,
        }) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CheckError::Closed),
        }
    }

    /// True once the coordinator has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawns the coordinator loop.
pub(crate) fn spawn(
    sup: Weak<Supervisor>,
    mut rx: mpsc::Receiver<CheckRequest>,
    token: CancellationToken,
    bus: Bus,
) {
    tokio::spawn(async move {
        loop {
            let first = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                req = rx.recv() => match req {
                    Some(req) => req,
                    None => break,
                },
            };
            let trigger = first.trigger;
            let mut batch = vec![first];
            while let Ok(more) = rx.try_recv() {
                batch.push(more);
            }

            let Some(sup) = sup.upgrade() else {
                break;
            };
            if batch.len() > 1 {
                let folded = u32::try_from(batch.len() - 1).unwrap_or(u32::MAX);
                bus.publish(
                    Event::new(EventKind::ChecksCoalesced)
                        .with_trigger(trigger)
                        .with_folded(folded),
                );
            }
            let outcome = sup.check(trigger, Instant::now()).await;
            drop(sup);

            for req in batch {
                if let Some(reply) = req.reply {
                    let _ = reply.send(Arc::clone(&outcome));
                }
            }
        }
        rx.close();
    });
}
