use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use thiserror::Error;

/// Error taxonomy for a report-generation run.
///
/// `Schema` and `EmptyResult` are soft failures: the uploaded file was
/// readable but yielded nothing to split, and the user can fix it by
/// re-uploading a corrected file. Everything else is terminal for the run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Format(String),
    #[error("Failed to read sheet '{sheet}': {message}")]
    SheetRead { sheet: String, message: String },
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("{0}")]
    EmptyResult(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Format(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::SheetRead { sheet, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to read sheet '{}': {}", sheet, message),
            ),
            AppError::Schema(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::EmptyResult(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Serialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
