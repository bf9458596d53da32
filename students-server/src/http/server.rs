//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C, bounded by a grace window

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::Config;
use crate::db::StudentStore;
use crate::state::AppState;

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("server task failed while draining: {0}")]
    Drain(#[source] tokio::task::JoinError),

    #[error("in-flight requests still running after {grace:?}, abandoned")]
    ShutdownTimeout { grace: Duration },
}

impl ServerError {
    /// True for failures that happen while draining. These are logged, never fatal.
    pub fn is_shutdown_error(&self) -> bool {
        matches!(self, Self::ShutdownTimeout { .. } | Self::Drain(_))
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only, any port
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                |origin: &HeaderValue, _parts: &Parts| {
                    origin.to_str().map(is_local_origin).unwrap_or(false)
                },
            ))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::students::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn is_local_origin(origin: &str) -> bool {
    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    let host = match rest.strip_prefix('[') {
        // Bracketed IPv6 literal, e.g. [::1]:8082
        Some(v6) => v6.split(']').next().unwrap_or_default(),
        None => rest.split(':').next().unwrap_or_default(),
    };
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// A bound but not yet serving HTTP server
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    /// Bind the listener. `addr` may use a hostname (`localhost:8082`).
    pub async fn bind(addr: &str, router: Router) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_owned(),
                source,
            })?;
        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Start accepting connections on a background task.
    pub fn start(self) -> Result<RunningServer, ServerError> {
        let local_addr = self.listener.local_addr()?;
        let (trigger, stop) = oneshot::channel::<()>();

        // Connection tasks outlive the accept loop, so handlers are cut off
        // through this token once the grace window has passed
        let cancel = CancellationToken::new();
        let handler_cancel = cancel.clone();
        let router = self.router.layer(middleware::from_fn(move |req: Request, next: Next| {
            let cancel = handler_cancel.clone();
            async move { cancellable(cancel, req, next).await }
        }));

        let task = tokio::spawn(async move {
            axum::serve(self.listener, router)
                .with_graceful_shutdown(async move {
                    // A dropped sender also counts as a stop request
                    let _ = stop.await;
                })
                .await
        });

        tracing::debug!(addr = %local_addr, "accept loop spawned");
        Ok(RunningServer {
            local_addr,
            trigger,
            cancel,
            task,
        })
    }
}

/// Run the handler unless the server gives up on in-flight requests first.
/// A cancelled handler future is dropped, so nothing after its current
/// await point runs.
async fn cancellable(cancel: CancellationToken, req: Request, next: Next) -> Response {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!("request abandoned at shutdown deadline");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        response = next.run(req) => response,
    }
}

/// Handle to a serving HTTP server
pub struct RunningServer {
    local_addr: SocketAddr,
    trigger: oneshot::Sender<()>,
    cancel: CancellationToken,
    task: JoinHandle<io::Result<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait up to `grace` for in-flight
    /// requests. Past the deadline every still-running handler is dropped,
    /// the serving task is aborted and [`ServerError::ShutdownTimeout`] is
    /// returned.
    pub async fn shutdown(self, grace: Duration) -> Result<(), ServerError> {
        drain(self.trigger, self.cancel, self.task, grace).await
    }

    /// Serve until `signal` resolves, then drain within `grace`.
    ///
    /// Returns early if the server stops on its own.
    pub async fn run_until<F>(self, signal: F, grace: Duration) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let Self {
            trigger,
            cancel,
            mut task,
            ..
        } = self;

        let finished = tokio::select! {
            _ = signal => None,
            joined = &mut task => Some(joined),
        };

        match finished {
            Some(joined) => Ok(joined??),
            None => drain(trigger, cancel, task, grace).await,
        }
    }
}

async fn drain(
    trigger: oneshot::Sender<()>,
    cancel: CancellationToken,
    mut task: JoinHandle<io::Result<()>>,
    grace: Duration,
) -> Result<(), ServerError> {
    tracing::info!(grace = ?grace, "shutting down the server");
    // Err means the server already exited; the join below reports why
    let _ = trigger.send(());

    match tokio::time::timeout(grace, &mut task).await {
        Ok(joined) => {
            joined.map_err(ServerError::Drain)??;
            tracing::info!("server shutdown successfully");
            Ok(())
        }
        Err(_) => {
            cancel.cancel();
            task.abort();
            Err(ServerError::ShutdownTimeout { grace })
        }
    }
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
///
/// Bind failures are returned; drain failures are logged and swallowed since
/// the process is exiting either way.
///
/// # Example
///
/// ```ignore
/// let store = SqliteStore::open(&config.storage_path).await?;
/// run_server(Arc::new(store), &config).await?;
/// ```
pub async fn run_server(store: Arc<dyn StudentStore>, config: &Config) -> Result<(), ServerError> {
    let state = AppState::new(store, config.env.clone());
    let router = build_router(state, config.http_server.cors_permissive);

    let server = HttpServer::bind(&config.http_server.addr, router).await?;
    let running = server.start()?;
    tracing::info!(addr = %running.local_addr(), env = %config.env, "Server listening");

    match running
        .run_until(shutdown_signal(), config.http_server.shutdown_timeout())
        .await
    {
        Err(e) if e.is_shutdown_error() => {
            tracing::error!(error = %e, "failed to shutdown");
            Ok(())
        }
        other => other,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
