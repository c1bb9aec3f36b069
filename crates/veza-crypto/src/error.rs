//! # Crypto Error Taxonomy
//!
//! Three failure kinds, kept deliberately distinct: a declined signature is
//! a user decision and must surface a user-actionable message, an integrity
//! failure means the envelope cannot be trusted and callers must not
//! attempt partial recovery, and a config failure means static key material
//! was missing or malformed at startup.

use thiserror::Error;

/// Errors from envelope key derivation, sealing, and opening.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The owner declined to sign the key-derivation message. Carries the
    /// wallet's own explanation so the caller can show it verbatim rather
    /// than a generic crypto error.
    #[error("signing declined: {0}")]
    SigningDeclined(String),

    /// Authentication tag mismatch, truncated payload, or malformed
    /// encoding. The envelope must be discarded.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Static key material (the server-side fallback key) was missing or
    /// malformed.
    #[error("config error: {0}")]
    Config(String),
}
