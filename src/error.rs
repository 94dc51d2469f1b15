//! Pipeline error types with HTTP status code mapping.
//!
//! [`PipelineError`] is the central error type for the service. Background
//! tasks log and recover from most variants; only the API layer converts
//! them into structured JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3002,
///     "message": "persistence error: connection refused",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Central error enum for the pipeline.
///
/// # Error Code Ranges
///
/// | Range     | Category       | HTTP Status               |
/// |-----------|----------------|---------------------------|
/// | 1000–1999 | Validation     | 400 Bad Request           |
/// | 3000–3999 | Infrastructure | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Request validation failed (API layer only).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Relational store failure (event log insert or catalog query).
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Key-value store failure (counter checkpoint or activity list).
    #[error("cache error: {0}")]
    Cache(String),

    /// Broker failure (subscription setup or publish).
    #[error("broker error: {0}")]
    Broker(String),

    /// Metrics registry failure (registration or exposition encoding).
    #[error("metrics error: {0}")]
    Metrics(String),
}

impl PipelineError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Config(_) => 3001,
            Self::Persistence(_) => 3002,
            Self::Cache(_) => 3003,
            Self::Broker(_) => 3004,
            Self::Metrics(_) => 3005,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_)
            | Self::Persistence(_)
            | Self::Cache(_)
            | Self::Broker(_)
            | Self::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<prometheus::Error> for PipelineError {
    fn from(err: prometheus::Error) -> Self {
        Self::Metrics(err.to_string())
    }
}
