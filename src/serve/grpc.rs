//! # gRPC server unit.
//!
//! [`GrpcServer`] is a [`ServiceUnit`] backed by [`tonic`]: it binds a listen
//! address, serves registered services, drains in-flight requests on a
//! graceful stop, and severs connections on a forced stop.
//!
//! Construction goes through [`GrpcServerBuilder`]:
//! - services are registered pass-through into the route table;
//! - interceptors are composed in registration order into a single layer
//!   applied server-wide;
//! - TLS credentials are read at [`build`](GrpcServerBuilder::build) time;
//!   unreadable credentials fail construction, the server is never started.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use winddown::{Config, GracefulService, GrpcServer, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = GrpcServer::builder("127.0.0.1:50051".parse()?)
//!         // .register(MyServiceServer::new(MyService))
//!         .build()?;
//!
//!     let sup = Supervisor::new(Config::default());
//!     sup.add(std::sync::Arc::new(GracefulService::new(
//!         std::sync::Arc::new(server),
//!         Duration::from_secs(5),
//!     )));
//!     sup.wait().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tonic::body::BoxBody;
use tonic::codegen::http;
use tonic::codegen::Service;
use tonic::server::NamedService;
use tonic::service::Routes;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tonic::{Request, Status};

use crate::error::{CredentialsError, TaskError};
use crate::serve::unit::ServiceUnit;

/// A request interceptor, applied server-wide before any handler runs.
pub type InterceptorFn =
    Arc<dyn Fn(Request<()>) -> Result<Request<()>, Status> + Send + Sync + 'static>;

/// Builder for [`GrpcServer`].
pub struct GrpcServerBuilder {
    addr: SocketAddr,
    routes: Routes,
    tls: Option<(PathBuf, PathBuf)>,
    interceptors: Vec<InterceptorFn>,
}

impl GrpcServerBuilder {
    fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            routes: Routes::default(),
            tls: None,
            interceptors: Vec::new(),
        }
    }

    /// Registers a service implementation. Pass-through: no coordination
    /// semantics are attached to registration.
    pub fn register<S>(mut self, svc: S) -> Self
    where
        S: Service<http::Request<BoxBody>, Response = http::Response<BoxBody>, Error = Infallible>
            + NamedService
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        self.routes = self.routes.add_service(svc);
        self
    }

    /// Enables TLS with a PEM certificate/key pair.
    ///
    /// The files are read at [`build`](GrpcServerBuilder::build) time;
    /// unreadable files are a fatal construction error.
    pub fn tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls = Some((cert.into(), key.into()));
        self
    }

    /// Appends a request interceptor. Interceptors run in registration order;
    /// the first to reject a request short-circuits the rest.
    pub fn interceptor<F>(mut self, f: F) -> Self
    where
        F: Fn(Request<()>) -> Result<Request<()>, Status> + Send + Sync + 'static,
    {
        self.interceptors.push(Arc::new(f));
        self
    }

    /// Builds the server, loading TLS credentials if configured.
    pub fn build(self) -> Result<GrpcServer, CredentialsError> {
        let tls = match &self.tls {
            Some((cert, key)) => Some(load_identity(cert, key)?),
            None => None,
        };

        let (done, _) = watch::channel(false);
        Ok(GrpcServer {
            addr: self.addr,
            name: format!("grpc:{}", self.addr),
            prepared: Mutex::new(Some(Prepared {
                routes: self.routes,
                tls,
                interceptors: Arc::new(self.interceptors),
            })),
            graceful: CancellationToken::new(),
            forced: CancellationToken::new(),
            done,
        })
    }
}

/// Route table and transport options, consumed by the first `start`.
struct Prepared {
    routes: Routes,
    tls: Option<ServerTlsConfig>,
    interceptors: Arc<Vec<InterceptorFn>>,
}

/// Tonic-backed [`ServiceUnit`].
pub struct GrpcServer {
    addr: SocketAddr,
    name: String,
    prepared: Mutex<Option<Prepared>>,
    graceful: CancellationToken,
    forced: CancellationToken,
    done: watch::Sender<bool>,
}

impl std::fmt::Debug for GrpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcServer")
            .field("addr", &self.addr)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl GrpcServer {
    /// Starts building a server bound to `addr`.
    pub fn builder(addr: SocketAddr) -> GrpcServerBuilder {
        GrpcServerBuilder::new(addr)
    }

    /// The configured listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

fn load_identity(cert: &Path, key: &Path) -> Result<ServerTlsConfig, CredentialsError> {
    let read = |path: &Path| {
        std::fs::read(path).map_err(|e| CredentialsError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    };
    let identity = Identity::from_pem(read(cert)?, read(key)?);
    Ok(ServerTlsConfig::new().identity(identity))
}

#[async_trait]
impl ServiceUnit for GrpcServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), TaskError> {
        let prepared = self.prepared.lock().await.take();
        let Some(prepared) = prepared else {
            return Err(TaskError::Fail {
                error: format!("server {} already started", self.name),
            });
        };

        let mut builder = Server::builder();
        if let Some(tls) = prepared.tls {
            builder = builder.tls_config(tls).map_err(|e| TaskError::Listen {
                addr: self.addr.to_string(),
                error: e.to_string(),
            })?;
        }

        let chain = Arc::clone(&prepared.interceptors);
        let router = builder
            .layer(tonic::service::interceptor(
                move |mut req: Request<()>| -> Result<Request<()>, Status> {
                    for f in chain.iter() {
                        req = f(req)?;
                    }
                    Ok(req)
                },
            ))
            .add_routes(prepared.routes);

        tracing::info!(addr = %self.addr, "grpc server listening");

        let graceful = self.graceful.clone();
        let serve = router.serve_with_shutdown(self.addr, async move {
            graceful.cancelled().await;
        });

        let res = tokio::select! {
            res = serve => res.map_err(|e| TaskError::Listen {
                addr: self.addr.to_string(),
                error: e.to_string(),
            }),
            // A forced stop is a requested outcome, not a serve fault. The
            // serve future is dropped here, severing open connections.
            _ = self.forced.cancelled() => Ok(()),
        };

        // send_replace: the flag must stick even with no live receivers.
        self.done.send_replace(true);
        res
    }

    async fn stop_graceful(&self) {
        self.graceful.cancel();
        if self.prepared.lock().await.is_some() {
            // Never started; nothing to drain.
            return;
        }
        let mut done = self.done.subscribe();
        let _ = done.wait_for(|stopped| *stopped).await;
    }

    async fn stop_forced(&self) {
        self.forced.cancel();
    }
}
