//! # Core runtime: cancellation scope, failure aggregation, supervision.

mod cancel;
mod report;
mod signal;
mod supervisor;

pub use cancel::CancelScope;
pub use report::FailureSlot;
pub use signal::{OsSignals, SignalSource, TermSignal};
pub use supervisor::Supervisor;
