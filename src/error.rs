//! Error types used by the winddown runtime and tasks.
//!
//! This module defines two error types:
//!
//! - [`TaskError`] — outcomes of individual supervised tasks; this is also
//!   what [`Supervisor::wait`](crate::Supervisor::wait) surfaces to the caller.
//! - [`CredentialsError`] — construction-time failure to load transport
//!   credentials for a server unit.
//!
//! [`TaskError`] provides helper methods (`as_label`, `as_message`) for
//! logging/metrics and [`TaskError::is_cancellation`] to distinguish
//! cooperative-shutdown exits from reportable failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by supervised tasks.
///
/// Every task completes with `Ok(())` or one of these. [`TaskError::Canceled`]
/// is an internal signal only: the supervisor never records it and never
/// surfaces it to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// The wrapped unit could not bind or serve on its address.
    #[error("failed to listen on address: {addr}, error: {error}")]
    Listen {
        /// The address the unit tried to bind.
        addr: String,
        /// The underlying error message.
        error: String,
    },

    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Graceful stop did not complete within the configured deadline;
    /// the unit was force-stopped.
    #[error("graceful stop deadline {grace:?} exceeded; forcing termination")]
    GraceExceeded {
        /// The deadline that was exceeded.
        grace: Duration,
    },

    /// Task exited because the cancellation scope was triggered.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use winddown::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Listen { .. } => "task_listen_failed",
            TaskError::Fail { .. } => "task_failed",
            TaskError::GraceExceeded { .. } => "task_grace_exceeded",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Listen { addr, error } => format!("listen on {addr}: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::GraceExceeded { grace } => format!("grace exceeded after {grace:?}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Whether this outcome is a cooperative-shutdown exit rather than a
    /// reportable failure.
    ///
    /// The aggregate kept by the supervisor never records a cancellation,
    /// and a cancellation never overwrites a recorded failure.
    ///
    /// # Example
    /// ```
    /// use winddown::TaskError;
    ///
    /// assert!(TaskError::Canceled.is_cancellation());
    /// assert!(!TaskError::Fail { error: "boom".into() }.is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// Failure to load transport credentials (certificate or private key).
///
/// Raised at construction time by
/// [`GrpcServerBuilder::build`](crate::GrpcServerBuilder::build); a server
/// with unreadable credentials is never started.
#[derive(Error, Debug)]
#[error("failed to load credentials from {}: {error}", path.display())]
pub struct CredentialsError {
    /// Path of the file that could not be read.
    pub path: PathBuf,
    /// The underlying I/O error message.
    pub error: String,
}
