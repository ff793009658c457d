//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No files were uploaded")]
    NoFilesUploaded,

    #[error("No filter was specified for the search")]
    MissingFilter,

    #[error("No orders found matching the supplied filters")]
    NoOrdersFound,

    #[error("Upload error: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    // 503: stream subscriber cap reached
    #[error(transparent)]
    Stream(#[from] crate::broadcast::AtCapacity),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] crate::persistence::RepositoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::NoFilesUploaded => {
                (StatusCode::BAD_REQUEST, "no_files_uploaded", None)
            }
            AppError::MissingFilter => {
                (StatusCode::BAD_REQUEST, "missing_filter", None)
            }
            AppError::Upload(e) => {
                (StatusCode::BAD_REQUEST, "upload_error", Some(e.to_string()))
            }

            // 404 Not Found
            AppError::NoOrdersFound => {
                (StatusCode::NOT_FOUND, "no_orders_found", None)
            }

            // 503 Service Unavailable
            AppError::Stream(e) => {
                tracing::warn!("stream subscription refused: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "stream_at_capacity", None)
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Repository(e) => {
                tracing::error!("Repository error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "repository_error", None)
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "io_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
