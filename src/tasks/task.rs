//! # Task abstraction.
//!
//! Defines the [`Task`] trait (async, cancelable) and [`TaskRef`], the shared
//! handle type (`Arc<dyn Task>`) used across the runtime.
//!
//! A task receives a [`CancellationToken`] observer and should periodically
//! check it to stop cooperatively during shutdown. The supervisor cannot
//! forcibly interrupt a task that ignores its token; such a task delays
//! [`Supervisor::wait`](crate::Supervisor::wait) indefinitely.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared reference to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives a [`CancellationToken`]. Implementors should regularly
/// check cancellation and exit promptly during shutdown, returning either
/// `Ok(())` or [`TaskError::Canceled`]; both count as a clean exit.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use winddown::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
