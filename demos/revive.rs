//! # Example: reviving killed workers
//!
//! Three in-process workers are supervised by every trigger of a [`TriggerSet`]. A chaos
//! task aborts them at random; the periodic timer (2s) notices and restarts them until
//! the restart budget is exhausted and backoff kicks in.
//!
//! Run with: `cargo run --example revive --features logging`
//! (`RUST_LOG=keepalive=debug` for cycle details; Ctrl-C to stop early)

use std::sync::Arc;
use std::time::Duration;

use keepalive::{
    Config, LocalScheduler, LogWriter, MemorySink, PresentationUnifier, StatusReporter, Subscribe,
    SupervisionPolicy, Supervisor, SupervisorCell, TaskTable, TracingPresenter, TriggerSet,
    WorkerSpec,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn worker(table: &Arc<TaskTable>, id: &'static str, priority: u32) -> WorkerSpec {
    let w = table.worker(id, move |token: CancellationToken| async move {
        tracing::info!(worker = id, "running");
        token.cancelled().await;
    });
    WorkerSpec::new(w).with_priority(priority)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config {
        policy: SupervisionPolicy {
            check_interval: Duration::from_secs(2),
            max_restart_attempts: 3,
            base_backoff: Duration::from_secs(5),
            settle: Duration::from_millis(500),
        },
        ..Config::default()
    };

    let table = TaskTable::new();
    let sink = Arc::new(MemorySink::new());
    let cell = {
        let (cfg, table, sink) = (cfg.clone(), table.clone(), sink.clone());
        SupervisorCell::new(move || {
            let subs: Vec<Arc<dyn Subscribe>> = vec![
                Arc::new(LogWriter::new()),
                Arc::new(StatusReporter::new(sink.clone(), "devices/demo")),
                Arc::new(
                    PresentationUnifier::new(Arc::new(TracingPresenter))
                        .with_label("camera", "Camera backup")
                        .with_label("gallery", "Gallery sync")
                        .with_label("transfer", "File transfer"),
                ),
            ];
            Supervisor::builder(cfg.clone())
                .with_workers(vec![
                    worker(&table, "gallery", 1),
                    worker(&table, "camera", 0),
                    worker(&table, "transfer", 2),
                ])
                .with_probe(table.clone())
                .with_subscribers(subs)
                .build()
        })
    };

    let chaos = {
        let table = table.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                let victim = ["camera", "gallery", "transfer"][rand::random_range(0..3)];
                if table.abort(victim) {
                    tracing::warn!(worker = victim, "chaos: killed");
                }
            }
        })
    };

    let triggers = TriggerSet::new(cell, LocalScheduler::new(), &cfg);
    tokio::select! {
        res = triggers.run() => res?,
        _ = tokio::time::sleep(Duration::from_secs(20)) => triggers.shutdown().await?,
    }
    chaos.abort();
    table.shutdown();

    for (path, value) in sink.snapshot() {
        println!("{path} = {value:?}");
    }
    Ok(())
}
