//! # winddown
//!
//! **winddown** supervises the lifecycle of a process built from
//! independently running background tasks: network listeners, workers,
//! anything long-running. Tasks start concurrently, run until an external
//! termination signal arrives or any one of them completes, and then shut
//! down in a coordinated, bounded-time fashion.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌───────────────────┐
//!     │    TaskRef   │   │    TaskRef   │   │  GracefulService  │
//!     │ (user task)  │   │ (user task)  │   │ (wraps a unit)    │
//!     └──────┬───────┘   └──────┬───────┘   └─────────┬─────────┘
//!            ▼                  ▼                     ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                   │
//! │  - CancelScope   (one shared cancellation domain)             │
//! │  - FailureSlot   (first reportable failure wins)              │
//! │  - built-in listener on a SignalSource (SIGINT/SIGTERM, or    │
//! │    a synthetic source injected for tests)                     │
//! └───────────────────────────────────────────────────────────────┘
//!
//! first task completion / failure / signal
//!         └──► CancelScope::trigger ──► every observer unblocks
//!                                       └──► wait() joins all, yields
//!                                            the aggregate result
//! ```
//!
//! A [`GracefulService`] drives a [`ServiceUnit`] (for example the
//! tonic-backed [`GrpcServer`]) and, once cancellation is observed, attempts
//! an orderly stop within a deadline, falling back to a forced stop:
//!
//! ```text
//! Running ──cancel──► ShuttingDownGraceful ──drained──► Stopped
//!                               └──deadline elapsed──► StoppedForced
//! ```
//!
//! ## Features
//! | Area            | Description                                        | Key types                          |
//! |-----------------|----------------------------------------------------|------------------------------------|
//! | **Supervision** | Run tasks under one cancellation domain.           | [`Supervisor`], [`CancelScope`]    |
//! | **Tasks**       | Define tasks as functions or trait impls.          | [`Task`], [`TaskFn`], [`TaskRef`]  |
//! | **Signals**     | Injectable termination-signal sources.             | [`SignalSource`], [`OsSignals`]    |
//! | **Shutdown**    | Bounded graceful-then-forced stop of a unit.       | [`GracefulService`], [`ServiceUnit`] |
//! | **Transport**   | gRPC unit with TLS and interceptor options.        | [`GrpcServer`]                     |
//! | **Errors**      | Task outcomes and credential failures.             | [`TaskError`], [`CredentialsError`] |
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use winddown::{Config, Supervisor, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::new(Config::default());
//!
//!     sup.add(TaskFn::arc("ticker", |ctx: CancellationToken| async move {
//!         while !ctx.is_cancelled() {
//!             tokio::time::sleep(std::time::Duration::from_millis(250)).await;
//!         }
//!         Ok::<_, TaskError>(())
//!     }));
//!     sup.add(TaskFn::arc("one-shot", |_ctx: CancellationToken| async move {
//!         // first completion initiates shutdown of the ticker
//!         Ok::<_, TaskError>(())
//!     }));
//!
//!     sup.wait().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod serve;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{CancelScope, FailureSlot, OsSignals, SignalSource, Supervisor, TermSignal};
pub use error::{CredentialsError, TaskError};
pub use serve::{GracefulService, GrpcServer, GrpcServerBuilder, InterceptorFn, ServiceState, ServiceUnit};
pub use tasks::{Task, TaskFn, TaskRef};
