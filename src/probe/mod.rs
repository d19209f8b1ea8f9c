//! Liveness probes.
//!
//! - [`LivenessProbe`] the contract the supervisor queries once per worker per cycle
//! - [`ProbeRouter`] per-worker routing with an optional fallback
//! - [`PidFileProbe`] pid-file + `kill(pid, 0)` introspection (unix)
//!
//! The in-process and child-process probes live next to the workers they watch:
//! [`TaskTable`](crate::TaskTable) and [`ProcessTable`](crate::ProcessTable).

mod liveness;
#[cfg(unix)]
mod pidfile;
mod router;

pub use liveness::LivenessProbe;
#[cfg(unix)]
pub use pidfile::PidFileProbe;
pub use router::ProbeRouter;
