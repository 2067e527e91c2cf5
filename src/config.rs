//! # Runtime configuration.
//!
//! [`Config`] holds the supervisor's construction-time options: the set of
//! termination signals the built-in listener subscribes to and the default
//! grace period for graceful service shutdown.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use winddown::{Config, TermSignal};
//!
//! let mut cfg = Config::default();
//! cfg.grace = Duration::from_secs(10);
//! cfg.signals = vec![TermSignal::Terminate];
//!
//! assert_eq!(cfg.signals.len(), 1);
//! ```

use std::time::Duration;

use crate::core::TermSignal;

/// Construction-time options for a [`Supervisor`](crate::Supervisor).
///
/// Each field is independently optional in the sense that [`Config::default`]
/// provides a working value for it.
#[derive(Clone, Debug)]
pub struct Config {
    /// Termination signals the built-in listener subscribes to.
    pub signals: Vec<TermSignal>,
    /// Default deadline for graceful service shutdown.
    pub grace: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `signals = [Interrupt, Terminate]`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            signals: TermSignal::defaults(),
            grace: Duration::from_secs(30),
        }
    }
}
