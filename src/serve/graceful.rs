//! # Bounded graceful-then-forced shutdown of a service unit.
//!
//! [`GracefulService`] wraps a [`ServiceUnit`] and drives it through a fixed
//! lifecycle:
//!
//! ```text
//! Idle ──► Running ──────────────────────────────► Stopped
//!             │         (unit stopped on its own)
//!             │ cancellation observed
//!             ▼
//!       ShuttingDownGraceful ──► Stopped          (drained before deadline)
//!                          └───► StoppedForced    (deadline elapsed;
//!                                                  stop_forced, GraceExceeded)
//! ```
//!
//! ## Rules
//! - `stop_graceful` is issued concurrently with the deadline timer; neither
//!   blocks the other.
//! - When drain completion and the deadline are ready at the same instant the
//!   drain wins: the select below is `biased` toward it, and the pending
//!   timer is dropped with no further effect.
//! - `stop_forced` is invoked exactly once, only on the deadline path.
//! - `Stopped` and `StoppedForced` are terminal; the service runs once.
//!
//! [`GracefulService`] implements [`Task`], so it registers with a
//! [`Supervisor`](crate::Supervisor) like any other task, or can be driven
//! directly via [`GracefulService::run_until_cancelled`].

use std::pin::pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::TaskError;
use crate::serve::unit::ServiceUnit;
use crate::tasks::Task;

/// Lifecycle state of a [`GracefulService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceState {
    /// Constructed, not yet started.
    Idle = 0,
    /// The unit is serving.
    Running = 1,
    /// Cancellation observed; the unit is draining.
    ShuttingDownGraceful = 2,
    /// The unit stopped in time. Terminal.
    Stopped = 3,
    /// The deadline elapsed and the unit was force-stopped. Terminal.
    StoppedForced = 4,
}

impl ServiceState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ServiceState::Idle,
            1 => ServiceState::Running,
            2 => ServiceState::ShuttingDownGraceful,
            3 => ServiceState::Stopped,
            _ => ServiceState::StoppedForced,
        }
    }
}

/// Drives a [`ServiceUnit`] until cancellation, then stops it gracefully
/// within a deadline, falling back to a forced stop.
pub struct GracefulService {
    unit: Arc<dyn ServiceUnit>,
    grace: Duration,
    state: AtomicU8,
}

impl GracefulService {
    /// Wraps `unit` with the given graceful-stop deadline.
    pub fn new<U: ServiceUnit>(unit: Arc<U>, grace: Duration) -> Self {
        Self {
            unit,
            grace,
            state: AtomicU8::new(ServiceState::Idle as u8),
        }
    }

    /// Wraps `unit`, inheriting the deadline from `cfg`.
    pub fn with_defaults<U: ServiceUnit>(unit: Arc<U>, cfg: &Config) -> Self {
        Self::new(unit, cfg.grace)
    }

    /// The configured graceful-stop deadline.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, next: ServiceState) {
        self.state.store(next as u8, Ordering::SeqCst);
    }

    /// Runs the unit until `token` is triggered, then performs the bounded
    /// graceful-then-forced stop with the given deadline.
    ///
    /// Outcomes:
    /// - the unit stopped on its own → the unit's own result, state
    ///   [`ServiceState::Stopped`];
    /// - drained before the deadline → the unit's own stop result, state
    ///   [`ServiceState::Stopped`];
    /// - deadline elapsed → [`TaskError::GraceExceeded`], state
    ///   [`ServiceState::StoppedForced`], forced stop issued exactly once.
    pub async fn run_until_cancelled(
        &self,
        token: CancellationToken,
        grace: Duration,
    ) -> Result<(), TaskError> {
        self.transition(ServiceState::Running);

        let unit = Arc::clone(&self.unit);
        let mut serving = pin!(async move { unit.start().await });

        tokio::select! {
            res = &mut serving => {
                self.transition(ServiceState::Stopped);
                return res;
            }
            _ = token.cancelled() => {}
        }

        self.transition(ServiceState::ShuttingDownGraceful);
        let drained = async {
            let ((), res) = tokio::join!(self.unit.stop_graceful(), &mut serving);
            res
        };

        tokio::select! {
            biased;
            res = drained => {
                self.transition(ServiceState::Stopped);
                res
            }
            _ = time::sleep(grace) => {
                self.unit.stop_forced().await;
                self.transition(ServiceState::StoppedForced);
                tracing::warn!(
                    unit = self.unit.name(),
                    ?grace,
                    "graceful stop deadline exceeded; unit force-stopped"
                );
                Err(TaskError::GraceExceeded { grace })
            }
        }
    }
}

#[async_trait]
impl Task for GracefulService {
    fn name(&self) -> &str {
        self.unit.name()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        self.run_until_cancelled(ctx, self.grace).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::core::SignalSource;
    use crate::tasks::TaskFn;
    use crate::Supervisor;

    /// Scripted unit: serves until told to stop; graceful stop takes a
    /// configured amount of time to drain.
    struct FakeUnit {
        drain: Duration,
        stop: CancellationToken,
        forced_calls: AtomicUsize,
        start_result: Result<(), TaskError>,
    }

    impl FakeUnit {
        fn arc(drain: Duration) -> Arc<Self> {
            Arc::new(Self {
                drain,
                stop: CancellationToken::new(),
                forced_calls: AtomicUsize::new(0),
                start_result: Ok(()),
            })
        }

        fn failing(result: TaskError) -> Arc<Self> {
            Arc::new(Self {
                drain: Duration::ZERO,
                stop: CancellationToken::new(),
                forced_calls: AtomicUsize::new(0),
                start_result: Err(result),
            })
        }

        fn forced(&self) -> usize {
            self.forced_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ServiceUnit for FakeUnit {
        fn name(&self) -> &str {
            "fake-unit"
        }

        async fn start(&self) -> Result<(), TaskError> {
            if self.start_result.is_err() {
                return self.start_result.clone();
            }
            self.stop.cancelled().await;
            Ok(())
        }

        async fn stop_graceful(&self) {
            time::sleep(self.drain).await;
            self.stop.cancel();
        }

        async fn stop_forced(&self) {
            self.forced_calls.fetch_add(1, Ordering::SeqCst);
            self.stop.cancel();
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn cancelled_token() -> CancellationToken {
        let token = CancellationToken::new();
        token.cancel();
        token
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_stop_within_deadline() {
        let unit = FakeUnit::arc(ms(10));
        let svc = GracefulService::new(Arc::clone(&unit), ms(50));

        let res = svc.run_until_cancelled(cancelled_token(), ms(50)).await;

        assert!(res.is_ok());
        assert_eq!(svc.state(), ServiceState::Stopped);
        assert_eq!(unit.forced(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_forces_stop_once() {
        let unit = FakeUnit::arc(ms(200));
        let svc = GracefulService::new(Arc::clone(&unit), ms(50));

        let err = svc
            .run_until_cancelled(cancelled_token(), ms(50))
            .await
            .expect_err("deadline must be exceeded");

        assert_eq!(err.as_label(), "task_grace_exceeded");
        assert_eq!(svc.state(), ServiceState::StoppedForced);
        assert_eq!(unit.forced(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_completion_at_exact_deadline_wins() {
        let unit = FakeUnit::arc(ms(50));
        let svc = GracefulService::new(Arc::clone(&unit), ms(50));

        let res = svc.run_until_cancelled(cancelled_token(), ms(50)).await;

        assert!(res.is_ok());
        assert_eq!(svc.state(), ServiceState::Stopped);
        assert_eq!(unit.forced(), 0);
    }

    #[tokio::test]
    async fn test_unit_stopping_on_its_own_propagates_result() {
        let unit = FakeUnit::failing(TaskError::Listen {
            addr: "127.0.0.1:50051".into(),
            error: "address in use".into(),
        });
        let svc = GracefulService::new(unit, ms(50));

        let err = svc
            .run_until_cancelled(CancellationToken::new(), ms(50))
            .await
            .expect_err("start failure must propagate");

        assert_eq!(err.as_label(), "task_listen_failed");
        assert_eq!(svc.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_state_starts_idle() {
        let svc = GracefulService::new(FakeUnit::arc(ms(1)), ms(50));
        assert_eq!(svc.state(), ServiceState::Idle);
    }

    /// Never-firing signal source for supervisor scenarios.
    struct Silent;

    #[async_trait]
    impl SignalSource for Silent {
        async fn recv(&self) -> std::io::Result<()> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervised_unit_drains_after_task_completion() {
        let sup = Supervisor::with_signal_source(Arc::new(Silent));

        let unit = FakeUnit::arc(ms(10));
        sup.add(Arc::new(GracefulService::new(Arc::clone(&unit), ms(50))));
        sup.add(TaskFn::arc("one-shot", |_ctx: CancellationToken| async move {
            Ok::<_, TaskError>(())
        }));

        assert!(sup.wait().await.is_ok());
        assert_eq!(unit.forced(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervised_unit_missing_deadline_surfaces_grace_exceeded() {
        let sup = Supervisor::with_signal_source(Arc::new(Silent));

        let unit = FakeUnit::arc(ms(200));
        sup.add(Arc::new(GracefulService::new(Arc::clone(&unit), ms(50))));
        sup.add(TaskFn::arc("one-shot", |_ctx: CancellationToken| async move {
            Ok::<_, TaskError>(())
        }));

        let err = sup.wait().await.expect_err("grace overrun must surface");
        assert_eq!(err.as_label(), "task_grace_exceeded");
        assert_eq!(unit.forced(), 1);
    }
}
