//! Axum-based RPC server.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::RpcError;
use crate::handlers;
use crate::state::AppState;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    // Two photos plus form overhead must fit in one request body.
    let body_limit = state.engine.params().max_image_bytes * 2 + 1024 * 1024;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/verify-pensioner", post(handlers::verify_pensioner))
        .route("/api/sync-verification", post(handlers::sync_verification))
        .route("/api/pensioner-data", get(handlers::pensioner_data))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
}

impl RpcServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Bind and serve until a shutdown signal arrives.
    pub async fn start(&self, state: AppState) -> Result<(), RpcError> {
        let app = router(state);
        let listener = TcpListener::bind(("0.0.0.0", self.port))
            .await
            .map_err(|e| RpcError::Internal(format!("cannot bind port {}: {e}", self.port)))?;

        tracing::info!(port = self.port, "RPC server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| RpcError::Internal(format!("server error: {e}")))?;

        tracing::info!("RPC server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}
