//! Two supervised workers running until Ctrl-C.
//!
//! Run with: `cargo run --example supervised_tasks`

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use winddown::{Config, Supervisor, TaskError, TaskFn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let sup = Supervisor::new(Config::default());

    sup.add(TaskFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut n = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    n += 1;
                    tracing::info!(n, "tick");
                }
            }
        }
        tracing::info!("ticker draining");
        Ok::<_, TaskError>(())
    }));

    sup.add(TaskFn::arc("slow-worker", |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        // Simulates cleanup work after cancellation is observed.
        tokio::time::sleep(Duration::from_millis(300)).await;
        tracing::info!("slow-worker drained");
        Ok::<_, TaskError>(())
    }));

    tracing::info!("running; press Ctrl-C to stop");
    sup.wait().await?;
    tracing::info!("all tasks stopped");
    Ok(())
}
