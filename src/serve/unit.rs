//! # Long-running service unit interface.
//!
//! [`ServiceUnit`] is the collaborator contract consumed by
//! [`GracefulService`](crate::GracefulService). The unit is a black box to
//! the shutdown protocol: it knows how to serve, how to drain, and how to
//! stop on the spot; the protocol decides *when*.

use async_trait::async_trait;

use crate::error::TaskError;

/// # A unit that serves until told to stop.
///
/// ## Rules
/// - [`start`](ServiceUnit::start) blocks until the unit has stopped or
///   failed; bind/initialize failures surface as [`TaskError::Listen`].
/// - [`stop_graceful`](ServiceUnit::stop_graceful) is best-effort and may
///   take unbounded time; it completes once the unit has drained and `start`
///   has returned.
/// - [`stop_forced`](ServiceUnit::stop_forced) returns promptly and is
///   lossy; in-flight work may be severed.
/// - Stop calls on a unit that was never started must not hang.
#[async_trait]
pub trait ServiceUnit: Send + Sync + 'static {
    /// Returns a stable, human-readable unit name.
    fn name(&self) -> &str;

    /// Serves until stopped or failed.
    async fn start(&self) -> Result<(), TaskError>;

    /// Requests an orderly stop and waits for the unit to drain.
    async fn stop_graceful(&self);

    /// Stops the unit immediately.
    async fn stop_forced(&self);
}
