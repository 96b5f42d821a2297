use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    DocumentExtraction(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Generation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DocumentExtraction(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::DocumentExtraction(_) => "DOCUMENT_EXTRACTION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Generation(_) => "GENERATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Unsupported(_) | DocumentError::NotImplemented(_) => {
                AppError::UnsupportedFormat(err.to_string())
            }
            DocumentError::Extraction(_) => AppError::DocumentExtraction(err.to_string()),
        }
    }
}

impl AppError {
    /// Classifies a rejected request body. Exceeding the body limit keeps its
    /// 413; every other malformed body is a validation failure.
    pub fn from_body_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else {
            AppError::Validation(message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                msg.clone()
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                msg.clone()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": self.code(),
        }));

        (self.status(), body).into_response()
    }
}
