//! # Validated JSON Extraction
//!
//! Request bodies implement [`Validate`]; handlers accept
//! `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_validated_json`], so both deserialization failures and
//! business-rule violations produce the same 422 shape.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request-body validation hook.
pub trait Validate {
    /// Check invariants the type system cannot express.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body, then run its validation.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) =
        body.map_err(|e| AppError::Validation(format!("invalid request body: {e}")))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
