//! # First-failure aggregation.
//!
//! [`FailureSlot`] holds at most one [`TaskError`]: the first reportable
//! failure recorded by any task of a supervisor. It backs the aggregate
//! result returned by [`Supervisor::wait`](crate::Supervisor::wait).
//!
//! ## Rules
//! - First write wins under concurrent completion; later failures are handed
//!   back to the caller (for logging), never stored.
//! - A cancellation outcome is never recorded and never overwrites a
//!   recorded failure.
//! - The slot is a write-once cell; no lock is held across suspension points.

use std::sync::OnceLock;

use crate::error::TaskError;

/// Write-once slot for the first reportable task failure.
#[derive(Debug, Default)]
pub struct FailureSlot {
    slot: OnceLock<TaskError>,
}

impl FailureSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err` if it is the first reportable failure.
    ///
    /// Returns `None` when the error was recorded (or was a cancellation,
    /// which is silently ignored), and `Some(err)` handing the error back
    /// when another failure was recorded first.
    pub fn record(&self, err: TaskError) -> Option<TaskError> {
        if err.is_cancellation() {
            return None;
        }
        self.slot.set(err).err()
    }

    /// The recorded failure, if any.
    pub fn first(&self) -> Option<&TaskError> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(msg: &str) -> TaskError {
        TaskError::Fail { error: msg.into() }
    }

    #[test]
    fn test_first_failure_wins() {
        let slot = FailureSlot::new();
        assert!(slot.record(fail("first")).is_none());

        let discarded = slot.record(fail("second")).expect("second must bounce");
        assert_eq!(discarded.as_message(), "error: second");

        match slot.first() {
            Some(TaskError::Fail { error }) => assert_eq!(error, "first"),
            other => panic!("unexpected slot contents: {other:?}"),
        }
    }

    #[test]
    fn test_cancellation_is_never_recorded() {
        let slot = FailureSlot::new();
        assert!(slot.record(TaskError::Canceled).is_none());
        assert!(slot.first().is_none());

        assert!(slot.record(fail("real")).is_none());
        assert!(slot.record(TaskError::Canceled).is_none());
        assert_eq!(slot.first().map(TaskError::as_label), Some("task_failed"));
    }

    #[tokio::test]
    async fn test_concurrent_records_keep_exactly_one() {
        use std::sync::Arc;

        let slot = Arc::new(FailureSlot::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let slot = Arc::clone(&slot);
            handles.push(tokio::spawn(async move {
                slot.record(fail(&format!("task-{i}"))).is_none()
            }));
        }

        let mut recorded = 0;
        for h in handles {
            if h.await.expect("join") {
                recorded += 1;
            }
        }
        assert_eq!(recorded, 1);
        assert!(slot.first().is_some());
    }
}
