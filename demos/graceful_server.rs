//! A gRPC server supervised with a bounded graceful shutdown.
//!
//! The server has no services registered, so every RPC answers
//! `Unimplemented`; the point of the demo is the lifecycle. Stop it with
//! Ctrl-C and watch the drain happen within the 5s grace window.
//!
//! Run with: `cargo run --example graceful_server`

use std::sync::Arc;
use std::time::Duration;

use winddown::{Config, GracefulService, GrpcServer, Supervisor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let server = GrpcServer::builder("127.0.0.1:50051".parse()?)
        .interceptor(|req| {
            tracing::info!("request intercepted");
            Ok(req)
        })
        .build()?;

    let sup = Supervisor::new(Config::default());
    sup.add(Arc::new(GracefulService::new(
        Arc::new(server),
        Duration::from_secs(5),
    )));

    sup.wait().await?;
    tracing::info!("server stopped");
    Ok(())
}
