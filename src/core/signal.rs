//! # Termination-signal sources.
//!
//! The supervisor's built-in listener subscribes to an external signal source
//! through the [`SignalSource`] trait, so tests can substitute a synthetic
//! source instead of real OS delivery.
//!
//! [`OsSignals`] is the default source. On Unix it subscribes to a
//! configurable set of [`TermSignal`]s (default: SIGINT + SIGTERM); on other
//! platforms only Ctrl-C is available and the configured set is ignored.

use async_trait::async_trait;

/// Platform-abstract termination signal kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermSignal {
    /// SIGINT (Ctrl-C in a terminal).
    Interrupt,
    /// SIGTERM (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// SIGQUIT.
    Quit,
    /// SIGHUP.
    Hangup,
}

impl TermSignal {
    /// The default subscription set: interrupt + terminate.
    pub fn defaults() -> Vec<TermSignal> {
        vec![TermSignal::Interrupt, TermSignal::Terminate]
    }
}

/// # External source of termination signals.
///
/// `recv` completes when the first termination signal is observed. The
/// supervisor races it against the cancellation scope; a source that never
/// fires is valid (the listener then exits on cancellation).
#[async_trait]
pub trait SignalSource: Send + Sync + 'static {
    /// Waits for a termination signal.
    ///
    /// Returns `Err` only if subscribing to the source fails (e.g. signal
    /// handler registration); the supervisor logs that and degrades to
    /// cancellation-only shutdown, it is never a task failure.
    async fn recv(&self) -> std::io::Result<()>;
}

/// Default OS-signal source.
#[derive(Clone, Debug)]
pub struct OsSignals {
    signals: Vec<TermSignal>,
}

impl OsSignals {
    /// Creates a source subscribed to the given signal set.
    ///
    /// An empty set never fires.
    pub fn new(signals: Vec<TermSignal>) -> Self {
        Self { signals }
    }
}

impl Default for OsSignals {
    fn default() -> Self {
        Self::new(TermSignal::defaults())
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut streams = Vec::with_capacity(self.signals.len());
        for sig in &self.signals {
            let kind = match sig {
                TermSignal::Interrupt => SignalKind::interrupt(),
                TermSignal::Terminate => SignalKind::terminate(),
                TermSignal::Quit => SignalKind::quit(),
                TermSignal::Hangup => SignalKind::hangup(),
            };
            streams.push(signal(kind)?);
        }

        if streams.is_empty() {
            std::future::pending::<()>().await;
        }

        let recvs = streams.iter_mut().map(|s| Box::pin(s.recv()));
        futures::future::select_all(recvs).await;
        Ok(())
    }
}

#[cfg(not(unix))]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}
