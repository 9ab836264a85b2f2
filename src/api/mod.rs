//! GameVerse HTTP API
//!
//! HTTP API layer for GameVerse, built with Axum.
//!
//! # Endpoints
//!
//! ## Assistant
//! - `POST /api/ai` - Forward a conversation to the chat backend
//!
//! ## Feed
//! - `GET /api/v1/entries` - Newest entries first (`?limit=N`)
//! - `POST /api/v1/entries` - Post an entry
//!
//! ## Catalogue
//! - `GET /api/v1/games` - Featured games
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Push channel for new entries
//!
//! # Example
//!
//! ```rust,ignore
//! use gameverse::api::{serve, ApiConfig, AppState};
//! use gameverse::assistant::{OpenAiClient, OpenAiConfig};
//! use gameverse::feed::EntryTable;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = Arc::new(EntryTable::open("gameverse.db")?);
//!     let assistant = Arc::new(OpenAiClient::new(OpenAiConfig::default()));
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(table, assistant, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Notice pushed on the `system` topic when the server stops
pub const SHUTDOWN_NOTICE: &str = "Server shutting down";

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/entries",
            get(routes::entries::list_entries).post(routes::entries::create_entry),
        )
        .route("/games", get(routes::games::list_games));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let body_limit = state.config.max_body_size;
    let shared_state = Arc::new(state);

    Router::new()
        .route("/api/ai", post(routes::ai::ask))
        .nest("/api/v1", v1_routes)
        .nest("/health", health_routes)
        .route("/ws", get(websocket_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server and run until a shutdown signal arrives
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let bridge = state.start_change_bridge();
    let hub = Arc::clone(&state.ws_hub);
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("GameVerse API listening on {}", addr);

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            hub.announce(SHUTDOWN_NOTICE).await;
        })
        .await;
    bridge.abort();
    result.map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("GameVerse API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
