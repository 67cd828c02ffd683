//! HTTP server implementation for the remote logs API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{MethodRouter, get, post};
use tokio::signal;

use super::config::LogServerConfig;
use super::handlers::{
    AppState, handle_fetch_logs, handle_healthy, handle_index, handle_method_not_allowed,
    handle_metrics, handle_ready,
};
use super::metrics::Metrics;
use super::middleware::{MetricsLayer, TracingLayer};
use crate::auth::CredentialValidator;
use crate::query::CursorQueryEngine;

/// HTTP server for the log service.
pub struct LogServer {
    engine: CursorQueryEngine,
    validator: Arc<dyn CredentialValidator>,
    config: LogServerConfig,
}

impl LogServer {
    /// Create a new log server.
    pub fn new(
        engine: CursorQueryEngine,
        validator: Arc<dyn CredentialValidator>,
        config: LogServerConfig,
    ) -> Self {
        Self {
            engine,
            validator,
            config,
        }
    }

    /// Run the HTTP server until SIGINT or SIGTERM.
    pub async fn run(self) -> std::io::Result<()> {
        let metrics = Arc::new(Metrics::new());
        let state = AppState {
            engine: self.engine,
            validator: self.validator,
            metrics: metrics.clone(),
        };

        let app = build_router(state)
            .layer(TracingLayer::new())
            .layer(MetricsLayer::new(metrics));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        tracing::info!("Starting remote logs HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Build the application routes over `state`.
///
/// Any method other than POST on the pull endpoints gets the
/// `METHOD_NOT_ALLOWED` envelope instead of axum's empty 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/logs", pull_route())
        .route("/api.php", pull_route())
        .route("/", get(handle_index))
        .route("/metrics", get(handle_metrics))
        .route("/-/healthy", get(handle_healthy))
        .route("/-/ready", get(handle_ready))
        .with_state(state)
}

fn pull_route() -> MethodRouter<AppState> {
    post(handle_fetch_logs).fallback(handle_method_not_allowed)
}

/// Listen for SIGTERM (K8s pod termination) and SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
