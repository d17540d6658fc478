//! API error types with structured JSON responses.
//!
//! Every failure leaves the service as one body shape:
//! `{"error": {"code", "message"}}`. Internal details are logged, never
//! returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::dates::DateError;
use crate::db::DatabaseError;
use crate::files::FileError;
use crate::ocr::OcrError;
use crate::pipeline::PipelineError;
use crate::tracking::TrackingError;

/// Seconds a client should wait after a provider rate-limit response.
const RATE_LIMIT_RETRY_SECS: &str = "60";

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
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("OCR timed out after {0}s")]
    OcrTimeout(u64),
    #[error("OCR rate limited")]
    OcrRateLimited,
    #[error("OCR auth failed")]
    OcrAuth,
    #[error("OCR rejected the document: {0}")]
    OcrBadRequest(String),
    #[error("OCR upstream failure: {0}")]
    OcrUpstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone()),
            ApiError::InvalidState(detail) => {
                (StatusCode::BAD_REQUEST, "INVALID_STATE", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::OcrTimeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                "OCR_TIMEOUT",
                format!("Text recognition timed out after {secs}s"),
            ),
            ApiError::OcrRateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "OCR_RATE_LIMITED",
                "Text recognition provider is rate limiting, retry later".to_string(),
            ),
            // Credential problems are an operator issue; clients get an
            // opaque message, the detail goes to the log.
            ApiError::OcrAuth => {
                tracing::error!("OCR provider rejected our credentials");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "OCR_AUTH",
                    "Text recognition is misconfigured".to_string(),
                )
            }
            ApiError::OcrBadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "OCR_BAD_REQUEST", detail.clone())
            }
            ApiError::OcrUpstream(detail) => {
                (StatusCode::BAD_GATEWAY, "OCR_UPSTREAM", detail.clone())
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        // Add retry-after header for rate limited responses
        if matches!(&self, ApiError::OcrRateLimited) {
            response.headers_mut().insert(
                "Retry-After",
                axum::http::HeaderValue::from_static(RATE_LIMIT_RETRY_SECS),
            );
        }
        response
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound(id) => ApiError::NotFound(format!("Scan {id} not found")),
            PipelineError::Forbidden(id) => {
                ApiError::Forbidden(format!("Scan {id} belongs to another user"))
            }
            PipelineError::InvalidState(detail) => ApiError::InvalidState(detail),
            PipelineError::Validation(detail) => ApiError::Validation(detail),
            PipelineError::Upload(e) => e.into(),
            PipelineError::Ocr(e) => e.into(),
            PipelineError::Database(e) => e.into(),
            PipelineError::Task(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::Io(e) => ApiError::Internal(e.to_string()),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Timeout(secs) => ApiError::OcrTimeout(secs),
            OcrError::RateLimited => ApiError::OcrRateLimited,
            OcrError::AuthFailure => ApiError::OcrAuth,
            OcrError::BadRequest(detail) => ApiError::OcrBadRequest(detail),
            OcrError::ServerError(status) => {
                ApiError::OcrUpstream(format!("provider returned status {status}"))
            }
            OcrError::Transport(detail) => ApiError::OcrUpstream(detail),
            OcrError::InvalidResponse(detail) => ApiError::OcrUpstream(detail),
            OcrError::NotConfigured(_) | OcrError::FileRead(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::NotFound(id) => ApiError::NotFound(format!("Log {id} not found")),
            TrackingError::Forbidden(id) => {
                ApiError::Forbidden(format!("Log {id} belongs to another user"))
            }
            TrackingError::Date(e) => ApiError::Validation(e.to_string()),
            TrackingError::Database(e) => e.into(),
        }
    }
}

impl From<DateError> for ApiError {
    fn from(err: DateError) -> Self {
        ApiError::Validation(err.to_string())
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
