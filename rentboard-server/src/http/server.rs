//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use sqlx::AnyPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::{AppConfig, ConfigError};
use crate::db::{self, DbError};
use crate::storage::UploadStore;

/// Shared application state
pub struct AppState {
    pub pool: AnyPool,
    pub config: AppConfig,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(pool: AnyPool, config: AppConfig) -> Self {
        let uploads = UploadStore::new(config.upload_dir.clone());
        Self {
            pool,
            config,
            uploads,
        }
    }
}

/// Connect, create the schema and the upload directory.
pub async fn prepare_state(config: AppConfig) -> Result<AppState, ServerError> {
    let backend = config.backend()?;
    let pool = db::create_pool(&config.database_url)
        .await
        .map_err(DbError::from)?;
    db::migrations::run(&pool, backend).await?;

    let state = AppState::new(pool, config);
    state.uploads.ensure_dir().await?;
    tracing::info!(upload_dir = %state.uploads.root().display(), "upload directory ready");

    Ok(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    // Localhost only
    let port = config.bind_addr.port();
    let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
        .iter()
        .filter_map(|host| HeaderValue::from_str(&format!("http://{}:{}", host, port)).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .merge(routes::health::router())
        .merge(routes::pages::router(&upload_dir))
        .merge(routes::listings::router())
        .merge(routes::enquiries::router())
        .merge(routes::admin::router())
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::new(secret)?.with_database_url(None)?;
/// run_server(config).await?;
/// ```
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    let bind_addr = config.bind_addr;
    let state = prepare_state(config).await?;
    let app = build_router(state);

    // Bind listener
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),
}
