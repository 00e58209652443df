//! PhishGuard API Server
//!
//! HTTP front end for the URL analysis engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PHISHGUARD API                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐     ┌──────────────────────────────────────┐ │
//! │  │  Router   │ ──► │  Analyzer (shared, built at startup) │ │
//! │  │  (Axum)   │     │  features → classifier │ TLS probe   │ │
//! │  └───────────┘     └──────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, head, post},
    Router,
};
use phishguard_core::Analyzer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phishguard_api=debug,phishguard_core=info,tower_http=debug".into()))
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("PhishGuard API starting ({})...", config.environment);
    tracing::info!("Model: {}", config.engine.model_path.display());

    // Load the model once; a failure leaves the engine degraded, not down
    let analyzer = Analyzer::from_config(&config.engine);
    let status = analyzer.status();
    if status.model_loaded {
        tracing::info!("Engine ready: {} ({:?})", status.model_name, status.mode);
    } else {
        tracing::warn!(
            "Engine degraded: {}",
            status.degraded_reason.as_deref().unwrap_or("unknown reason")
        );
    }

    // Build application state
    let state = AppState {
        analyzer: Arc::new(analyzer),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", head(handlers::health::ping))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/analyze-batch", post(handlers::predict::analyze_batch))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
