//! # Service units and the bounded graceful-shutdown protocol.
//!
//! - [`ServiceUnit`] — the collaborator contract: serve, drain, stop
//! - [`GracefulService`] — graceful-then-forced shutdown driver
//! - [`GrpcServer`] — tonic-backed unit with TLS and interceptor options

mod graceful;
mod grpc;
mod unit;

pub use graceful::{GracefulService, ServiceState};
pub use grpc::{GrpcServer, GrpcServerBuilder, InterceptorFn};
pub use unit::ServiceUnit;
