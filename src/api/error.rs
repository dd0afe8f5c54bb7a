//! API error type with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::DatabaseError;
use crate::export::ExportError;
use crate::gateway::GatewayError;
use crate::pipeline::PipelineError;
use crate::storage::StorageError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("OCR service not configured")]
    OcrNotConfigured,
    #[error("OCR request timed out")]
    OcrTimeout,
    #[error("Upstream model error")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Forbidden".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::OcrNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "OCR_NOT_CONFIGURED",
                "OCR service not configured".to_string(),
            ),
            ApiError::OcrTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "OCR_TIMEOUT",
                "OCR request timed out".to_string(),
            ),
            ApiError::Upstream(detail) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NoSession => ApiError::Unauthorized,
            AuthError::InvalidCredentials
            | AuthError::InvalidEmail
            | AuthError::PasswordTooShort
            | AuthError::EmailTaken => ApiError::BadRequest(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound("User not found".into()),
            AuthError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured => ApiError::OcrNotConfigured,
            GatewayError::Timeout(_) => ApiError::OcrTimeout,
            GatewayError::Upstream { status, body } => {
                ApiError::Upstream(format!("upstream returned {status}: {body}"))
            }
            GatewayError::Network(e) => ApiError::Upstream(e),
            GatewayError::InvalidResponse(e) => ApiError::Upstream(e),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::DocumentNotFound(id) => {
                ApiError::NotFound(format!("Document {id} not found"))
            }
            PipelineError::Gateway(e) => e.into(),
            PipelineError::Database(e) => e.into(),
            PipelineError::Storage(e) => ApiError::Internal(e.to_string()),
            PipelineError::LockPoisoned => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ApiError::NotFound(format!("Object {key} not found")),
            StorageError::TokenExpired => ApiError::NotFound("Link expired".into()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => ApiError::BadRequest("Nothing to export".into()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
