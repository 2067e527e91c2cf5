//! # Shared cancellation scope.
//!
//! [`CancelScope`] is the single cancellation domain of a supervisor: one
//! owning [`CancellationToken`] and one derived observer per registered task.
//!
//! ## Rules
//! - [`CancelScope::trigger`] is idempotent and thread-safe; the first call
//!   unblocks every outstanding observer, later calls are no-ops.
//! - Observers are cheap clonable handles into the shared state; cancelling
//!   an observer directly does **not** propagate back to the scope.
//! - The transition to triggered is irreversible.

use tokio_util::sync::CancellationToken;

/// Cancellation domain shared by all tasks of one supervisor.
///
/// Cloning a scope yields another handle to the same domain.
#[derive(Clone, Debug, Default)]
pub struct CancelScope {
    root: CancellationToken,
}

impl CancelScope {
    /// Creates a fresh, untriggered scope.
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
        }
    }

    /// Marks the scope cancelled and unblocks all outstanding observers.
    ///
    /// Idempotent: triggering twice has no additional effect.
    pub fn trigger(&self) {
        self.root.cancel();
    }

    /// Returns a derived observer token.
    ///
    /// The observer can be polled (`is_cancelled`) or awaited (`cancelled()`)
    /// to detect cancellation. Cancelling the observer itself affects only
    /// that observer, never the scope.
    pub fn observer(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// Whether the scope has been triggered.
    pub fn is_triggered(&self) -> bool {
        self.root.is_cancelled()
    }
}
