//! # Error Types
//!
//! Core error hierarchy shared across the Veza Stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Errors raised by the foundational types in this crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A validated constructor rejected its input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A digest string failed to parse.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A timestamp string failed to parse or used a non-UTC offset.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
