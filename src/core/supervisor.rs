//! # Supervisor: concurrent tasks, one cancellation scope, one outcome.
//!
//! The [`Supervisor`] owns a [`CancelScope`], a [`FailureSlot`], and a
//! built-in listener subscribed to an external [`SignalSource`]. Tasks added
//! with [`Supervisor::add`] run concurrently; the first completion (success,
//! failure, or an observed termination signal) triggers cancellation of all
//! others.
//!
//! ## High-level architecture
//! ```text
//! add(task) ──► tracker.spawn ──► task.run(observer token)
//!                                      │
//!                 Ok / Canceled ───────┤ Err (reportable)
//!                       │              └─► FailureSlot::record (first wins)
//!                       ▼                          │
//!                 CancelScope::trigger ◄───────────┘
//!                       ▲
//! SignalSource::recv ───┘   (built-in listener, spawned at construction)
//!
//! wait():
//!   tracker.close() → tracker.wait()       (all user tasks joined)
//!   → scope.trigger()                      (idempotent; releases listener)
//!   → join listener
//!   → FailureSlot::first() → Err(first failure) | Ok(())
//! ```
//!
//! ## Rules
//! - Cancellation is cooperative: tasks must poll or await their token. A
//!   task that ignores it delays `wait()` indefinitely.
//! - Cancellation-caused termination is the *normal* way shutdown is
//!   initiated; it is never surfaced as an error.
//! - Failures after the first are discarded from the aggregate but logged.
//! - `add` may be called before or while `wait` is blocking, never after
//!   `wait` has returned.
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
//!     sup.add(TaskFn::arc("worker", |ctx: CancellationToken| async move {
//!         // runs until the first task completes or a signal arrives
//!         ctx.cancelled().await;
//!         Ok::<_, TaskError>(())
//!     }));
//!     sup.add(TaskFn::arc("one-shot", |_ctx: CancellationToken| async move {
//!         Ok::<_, TaskError>(())
//!     }));
//!
//!     sup.wait().await?;
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::core::cancel::CancelScope;
use crate::core::report::FailureSlot;
use crate::core::signal::{OsSignals, SignalSource};
use crate::error::TaskError;
use crate::tasks::{TaskFn, TaskRef};

/// Supervises a set of concurrently running tasks and aggregates their
/// outcome into a single result.
///
/// Must be constructed inside a Tokio runtime: the built-in signal listener
/// is spawned at construction.
pub struct Supervisor {
    scope: CancelScope,
    failures: Arc<FailureSlot>,
    tracker: TaskTracker,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Supervisor {
    /// Creates a supervisor subscribed to the OS signals named in `cfg`.
    pub fn new(cfg: Config) -> Self {
        Self::with_signal_source(Arc::new(OsSignals::new(cfg.signals)))
    }

    /// Creates a supervisor with an injected signal source.
    ///
    /// Use this to substitute a synthetic source for tests or embeddings
    /// where OS signal delivery is not wanted.
    pub fn with_signal_source(source: Arc<dyn SignalSource>) -> Self {
        let scope = CancelScope::new();
        let listener = tokio::spawn(listen(scope.clone(), source));

        Self {
            scope,
            failures: Arc::new(FailureSlot::new()),
            tracker: TaskTracker::new(),
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Schedules `task` to run concurrently under this supervisor.
    ///
    /// The task receives its own observer token. Its failure, if any,
    /// surfaces only through the eventual result of [`Supervisor::wait`].
    /// May be called before or after `wait` has started blocking, but not
    /// after `wait` has returned.
    pub fn add(&self, task: TaskRef) {
        let token = self.scope.observer();
        let scope = self.scope.clone();
        let failures = Arc::clone(&self.failures);

        self.tracker.spawn(async move {
            match task.run(token).await {
                Ok(()) => {}
                Err(err) if err.is_cancellation() => {}
                Err(err) => {
                    if let Some(discarded) = failures.record(err) {
                        tracing::warn!(
                            task = task.name(),
                            error = %discarded,
                            "additional task failure discarded; first failure wins"
                        );
                    }
                }
            }
            // First completion of any kind initiates shutdown of the rest.
            scope.trigger();
        });
    }

    /// Convenience for adding a closure as a task.
    ///
    /// Shorthand for `add(TaskFn::arc(name, f))`.
    pub fn add_fn<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F)
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.add(TaskFn::arc(name, f));
    }

    /// Triggers cancellation explicitly, as if a termination signal had
    /// arrived. Idempotent.
    pub fn cancel(&self) {
        self.scope.trigger();
    }

    /// Blocks until every added task and the built-in listener have
    /// completed, then yields the aggregate result.
    ///
    /// Returns the first recorded non-cancellation failure, or `Ok(())` when
    /// every task succeeded or was cancelled. Signal-triggered shutdown is
    /// not an error. Call once; the supervisor is spent afterwards.
    pub async fn wait(&self) -> Result<(), TaskError> {
        self.tracker.close();
        self.tracker.wait().await;

        // Release the listener if no signal ever arrived, then join it.
        self.scope.trigger();
        let handle = self.listener.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        match self.failures.first() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Built-in listener: races the external signal source against the scope.
///
/// Exits cleanly on either path; a subscription error degrades it to
/// cancellation-only shutdown.
async fn listen(scope: CancelScope, source: Arc<dyn SignalSource>) {
    let observer = scope.observer();
    tokio::select! {
        res = source.recv() => match res {
            Ok(()) => {
                tracing::info!("termination signal received; triggering shutdown");
            }
            Err(error) => {
                tracing::warn!(%error, "signal subscription failed; relying on in-process shutdown");
                observer.cancelled().await;
            }
        },
        _ = observer.cancelled() => {}
    }
    scope.trigger();
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use tokio::time;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::tasks::TaskFn;

    /// Synthetic source: fires when the test says so, never errors.
    struct SyntheticSignal {
        notify: Notify,
    }

    impl SyntheticSignal {
        fn arc() -> Arc<Self> {
            Arc::new(Self {
                notify: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl SignalSource for SyntheticSignal {
        async fn recv(&self) -> std::io::Result<()> {
            self.notify.notified().await;
            Ok(())
        }
    }

    /// Source that never fires.
    struct Silent;

    #[async_trait]
    impl SignalSource for Silent {
        async fn recv(&self) -> std::io::Result<()> {
            std::future::pending().await
        }
    }

    fn quiet_supervisor() -> Supervisor {
        Supervisor::with_signal_source(Arc::new(Silent))
    }

    #[tokio::test]
    async fn test_wait_with_no_tasks_returns_ok() {
        let sup = quiet_supervisor();
        assert!(sup.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_all_succeeding_tasks_return_ok() {
        let sup = quiet_supervisor();
        for i in 0..3 {
            sup.add_fn(format!("ok-{i}"), |_ctx: CancellationToken| async move {
                Ok::<_, TaskError>(())
            });
        }
        assert!(sup.wait().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_surfaces_after_peers_exit() {
        let sup = quiet_supervisor();
        let peer_exited = Arc::new(AtomicBool::new(false));

        sup.add(TaskFn::arc("failing", |_ctx: CancellationToken| async move {
            Err(TaskError::Fail { error: "X".into() })
        }));

        let flag = Arc::clone(&peer_exited);
        sup.add(TaskFn::arc("slow-peer", move |ctx: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                ctx.cancelled().await;
                time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        }));

        let err = sup.wait().await.expect_err("failure must surface");
        match err {
            TaskError::Fail { error } => assert_eq!(error, "X"),
            other => panic!("unexpected error: {other:?}"),
        }
        // wait() must not return before the slow peer has exited.
        assert!(peer_exited.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_signal_triggered_shutdown_is_not_an_error() {
        let source = SyntheticSignal::arc();
        let sup = Supervisor::with_signal_source(source.clone());

        sup.add(TaskFn::arc("listener", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok::<_, TaskError>(())
        }));
        sup.add(TaskFn::arc("canceled-style", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        }));

        source.notify.notify_one();
        assert!(sup.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_signal_plus_failure_reports_exactly_the_failure() {
        let source = SyntheticSignal::arc();
        let sup = Supervisor::with_signal_source(source.clone());

        sup.add(TaskFn::arc("failing", |_ctx: CancellationToken| async move {
            Err(TaskError::Fail { error: "X".into() })
        }));
        source.notify.notify_one();

        let err = sup.wait().await.expect_err("failure must win over signal");
        assert_eq!(err.as_label(), "task_failed");
    }

    #[tokio::test]
    async fn test_explicit_cancel_stops_tasks_cleanly() {
        let sup = quiet_supervisor();
        sup.add(TaskFn::arc("worker", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Ok::<_, TaskError>(())
        }));

        sup.cancel();
        assert!(sup.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_add_while_wait_is_blocking() {
        let sup = Arc::new(quiet_supervisor());
        let late_ran = Arc::new(AtomicBool::new(false));

        let inner = Arc::clone(&sup);
        let flag = Arc::clone(&late_ran);
        sup.add(TaskFn::arc("spawner", move |_ctx: CancellationToken| {
            let inner = Arc::clone(&inner);
            let flag = Arc::clone(&flag);
            async move {
                inner.add(TaskFn::arc("late", move |_ctx: CancellationToken| {
                    let flag = Arc::clone(&flag);
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        Ok::<_, TaskError>(())
                    }
                }));
                Ok::<_, TaskError>(())
            }
        }));

        assert!(sup.wait().await.is_ok());
        assert!(late_ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_first_completion_cancels_remaining_tasks() {
        let sup = quiet_supervisor();

        sup.add(TaskFn::arc("one-shot", |_ctx: CancellationToken| async move {
            Ok::<_, TaskError>(())
        }));
        sup.add(TaskFn::arc("long-lived", |ctx: CancellationToken| async move {
            // Would run forever without domain-wide cancellation.
            ctx.cancelled().await;
            Ok::<_, TaskError>(())
        }));

        assert!(sup.wait().await.is_ok());
    }
}
