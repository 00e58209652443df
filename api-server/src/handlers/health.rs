//! Health check handler

use axum::{extract::State, Json};
use phishguard_core::EngineStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    engine: EngineStatus,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.analyzer.status();

    Json(HealthResponse {
        status: if engine.model_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        engine,
    })
}

/// `HEAD /` connection check
pub async fn ping() {}
