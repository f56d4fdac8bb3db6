//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code, e.g. NOT_FOUND
    pub code: String,
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self.kind {
            ApiErrorKind::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
