//! Kafka backup explorer REST API
//!
//! HTTP/JSON boundary over [`kbx_explorer::Explorer`]. All routes live below
//! [`BASE_PATH`]:
//!
//! | Route | Result |
//! |-------|--------|
//! | `GET /isAlive` | `true` |
//! | `GET /` | tree of all topics, unbounded window |
//! | `GET /{topics}` | tree of a comma separated topic list (`*` or `ALL` for all) |
//! | `GET /{topics}/{from}` | window starting at `from` |
//! | `GET /{topics}/{from}/{until}` | half-open window `[from, until)` |
//!
//! Tree routes accept `?searchPattern=<regex>`; only with a pattern are data
//! files (and their content) returned.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use kbx_explorer::Explorer;
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod shutdown;

pub use error::ApiError;
pub use shutdown::shutdown_signal;

/// Path prefix of every route.
pub const BASE_PATH: &str = "/api/kafkabackupexplorer/v1";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<Explorer>,
}

impl AppState {
    pub fn new(explorer: Explorer) -> Self {
        Self {
            explorer: Arc::new(explorer),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    pub listen: SocketAddr,

    /// Requests taking longer are answered with 408
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let route = |path: &str| format!("{BASE_PATH}{path}");

    Router::new()
        .route(&route("/isAlive"), get(handlers::is_alive))
        .route(BASE_PATH, get(handlers::tree_all))
        .route(&route("/"), get(handlers::tree_all))
        .route(&route("/:topics"), get(handlers::tree_by_topics))
        .route(&route("/:topics/:from"), get(handlers::tree_from))
        .route(&route("/:topics/:from/:until"), get(handlers::tree_between))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

/// Serve `router` until `shutdown` completes, letting in-flight requests finish.
pub async fn serve<F>(router: Router, listen: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        base_path = BASE_PATH,
        "REST API server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}
