//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers in the consent pipeline. These
//! prevent accidental identifier confusion — you cannot pass a requester's
//! `PartyId` where a `RequestId` is expected, and a request id never leaks
//! into a digest field as an unvalidated string.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Generate a new random request identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Identity of a party in the consent pipeline — an owner or a requester.
///
/// Parties are identified by an opaque wallet-derived address string. The
/// constructor trims surrounding whitespace and rejects empty or oversized
/// values so that digest computation always sees the same canonical form
/// the store persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    /// Maximum accepted length for a party identifier.
    pub const MAX_LEN: usize = 255;

    /// Create a party identifier from a raw string, trimming whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(
                "party id must be non-empty".to_string(),
            ));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(CoreError::Validation(format!(
                "party id must not exceed {} characters",
                Self::MAX_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The canonical (trimmed) string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
