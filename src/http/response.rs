//! Error responses.
//!
//! # Responsibilities
//! - Map validation, sanitization and admission failures to status codes
//! - Render a uniform JSON body: `{ "error", "details", "code" }`
//!
//! # Design Decisions
//! - Denials become 429 with `Retry-After`
//! - User-facing wording lives here, never in the security core

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::security::{AdmissionDenied, SanitizeError};

/// Successful API envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Failures a handler can report to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidInput(#[from] SanitizeError),

    #[error(transparent)]
    RateLimited(#[from] AdmissionDenied),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = self.to_string();

        let (body, retry_after) = match self {
            Self::Validation(_) => (
                ErrorBody {
                    error: "Validation error",
                    details,
                    code: "VALIDATION_ERROR",
                    retry_after: None,
                },
                None,
            ),
            Self::InvalidInput(_) => (
                ErrorBody {
                    error: "Invalid input",
                    details,
                    code: "INVALID_INPUT",
                    retry_after: None,
                },
                None,
            ),
            Self::RateLimited(denied) => (
                ErrorBody {
                    error: "Rate limit exceeded",
                    details: "Too many requests. Try again later.".to_string(),
                    code: "RATE_LIMIT_EXCEEDED",
                    retry_after: Some(denied.retry_after_secs),
                },
                Some(denied.retry_after_secs),
            ),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}
