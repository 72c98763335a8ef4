//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::demo::DemoSession;

use super::boards;
use super::demo;
use super::graph;
use super::tasks;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Fallback client over every configured backend
    pub backend: BackendClient,
    /// The single in-memory demo session
    pub demo: RwLock<DemoSession>,
}

impl AppState {
    pub fn new(config: Config, backend: BackendClient) -> Self {
        Self {
            config,
            backend,
            demo: RwLock::new(DemoSession::new()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Candidate base URLs in attempt order
    pub backends: Vec<String>,
}

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/tasks", tasks::routes())
        .nest("/api/boards", boards::routes())
        .nest("/api/graph", graph::routes())
        .nest("/api/demo", demo::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let backend = BackendClient::from_config(&config);
    tracing::info!("Backend candidates: {}", backend.base_urls().join(", "));

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, backend));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends: state.backend.base_urls().to_vec(),
    })
}
