//! Deblur Inference Service
//!
//! HTTP front end for the deblur generator: `POST /deblur` accepts one image
//! and returns the reconstruction as PNG, `GET /health` reports liveness.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use inference_engine::InferenceEngine;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod settings;
pub mod error;
pub mod routes;


pub use settings::ServerConfig;
pub use error::{ApiError, ServerError};

/// Application state shared across handlers
pub struct AppState {
    /// Loaded generator, immutable while serving
    pub engine: InferenceEngine,
    /// Return processing error messages to callers verbatim
    pub expose_error_details: bool,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state around a loaded engine
    pub fn new(engine: InferenceEngine, config: &ServerConfig) -> Self {
        Self {
            engine,
            expose_error_details: config.expose_error_details,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/deblur", post(routes::deblur::deblur_image))
        .route("/health", get(routes::health::health_check))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging; RUST_LOG takes precedence over `level`
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the model and serve until Ctrl-C
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let engine = InferenceEngine::load(&config.engine())?;
    let state = Arc::new(AppState::new(engine, &config));
    let app = create_router(state);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
