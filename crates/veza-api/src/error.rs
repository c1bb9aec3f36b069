//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from veza-consent and veza-state to HTTP status
//! codes and JSON error bodies. Never exposes internal error details in
//! responses.
//!
//! Owner-side operations (approve, reject, grant-file) fold
//! `Unauthorized` into 404: the response carries no signal about whether
//! a request the caller does not own exists at all.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use veza_consent::{ConsentError, VerificationReason};
use veza_state::CreateError;

/// Structured JSON error response body.
///
/// All error responses use this format, except release-gate verification
/// failures, which return the flat `{"reason": ...}` body their callers
/// key on.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Flat body of a 403 release-gate rejection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationFailureBody {
    /// Machine-readable reason: `proof-verification-failed` or
    /// `audit-verification-failed`.
    pub reason: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found, or an owner-side operation by the wrong actor (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The request targets a state that does not admit the operation (400).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller may not access this resource (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Release-gate verification failure (403, flat `{"reason"}` body).
    #[error("verification failed: {0}")]
    Verification(VerificationReason),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Verification(_) => (StatusCode::FORBIDDEN, "VERIFICATION_FAILED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Release-gate rejections use the flat machine-readable body.
        if let Self::Verification(reason) = &self {
            return (
                status,
                Json(VerificationFailureBody {
                    reason: reason.as_str().to_string(),
                }),
            )
                .into_response();
        }

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConsentError> for AppError {
    fn from(err: ConsentError) -> Self {
        match &err {
            // Anti-enumeration: the wrong actor learns nothing beyond
            // "no such request".
            ConsentError::NotFound(id) | ConsentError::Unauthorized(id) => {
                Self::NotFound(format!("access request {id} not found"))
            }
            ConsentError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
            ConsentError::Forbidden(id) => {
                Self::Forbidden(format!("access to request {id} denied"))
            }
            ConsentError::Verification { reason } => Self::Verification(*reason),
            ConsentError::PayloadNotFound { .. } => Self::NotFound(err.to_string()),
        }
    }
}

impl From<CreateError> for AppError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::DuplicatePending => Self::Conflict(err.to_string()),
            CreateError::EmptyCategories => Self::Validation(err.to_string()),
        }
    }
}

impl From<veza_core::CoreError> for AppError {
    fn from(err: veza_core::CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}
