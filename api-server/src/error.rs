//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    ValidationError(String),

    #[error("Too many URLs: {count} (max {max})")]
    BatchTooLarge { count: usize, max: usize },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ValidationError(_) | AppError::BatchTooLarge { .. } => StatusCode::BAD_REQUEST,
        };
        tracing::debug!("Rejected request: {}", self);

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
            "success": false
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
    }
}
