use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::workflow::WorkflowError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Persistence store is unavailable")]
    StoreUnavailable,

    #[error("Save failed: {0}")]
    Save(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::EmptyContent => AppError::Validation(e.to_string()),
            WorkflowError::GenerationInFlight => AppError::Conflict(e.to_string()),
            WorkflowError::UnknownVariant(_) => AppError::NotFound(e.to_string()),
            WorkflowError::NotSavable(_) | WorkflowError::NotHidable => {
                AppError::Validation(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NOT_CONFIGURED",
                msg.clone(),
            ),
            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Persistence store is unavailable".to_string(),
            ),
            AppError::Save(msg) => {
                tracing::error!("Save error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SAVE_FAILED",
                    "The item could not be saved".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
