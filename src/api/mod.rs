//! Dashboard HTTP Server
//!
//! Serves the rendered panel, the payload it was rendered from, and health
//! probes. Built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /` - The panel as an HTML page
//! - `GET /data.json` - The payload file (`Cache-Control: no-store`)
//!
//! ## API
//! - `GET /api/v1/panel` - Container contents and refresh stats
//! - `POST /api/v1/refresh` - Run a refresh cycle now
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use osint_board::api::{serve, AppState};
//! use osint_board::config::ApiConfig;
//! use osint_board::refresh::{Dashboard, FileSource};
//! use osint_board::render::Renderer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let source = Box::new(FileSource::new(&config.data_path));
//!     let dashboard = Arc::new(Dashboard::new(source, Renderer::default()));
//!     Arc::clone(&dashboard).start();
//!
//!     serve(AppState::new(dashboard, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use crate::config::ApiConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::Level;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/panel", get(routes::dashboard::panel))
        .route("/refresh", post(routes::dashboard::refresh));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/data.json", get(routes::dashboard::data_json))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(
            TraceLayer::new_for_http()
                .on_failure(DefaultOnFailure::new().level(Level::WARN)),
        )
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
