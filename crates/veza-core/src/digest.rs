//! # Consent Digest
//!
//! The 32-byte digest value that binds a consent decision to its
//! parameters. The digest is computed by the proof provider (see
//! `veza-proof`); this type only carries the value, with a strict hex
//! codec so that persisted and wire forms are unambiguous.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A 32-byte consent digest, rendered as 64 lowercase hex characters.
///
/// Serializes as its hex string form; parsing rejects uppercase input so
/// equality checks over persisted values never depend on case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsentDigest(pub [u8; 32]);

impl ConsentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a digest from exactly 64 lowercase hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        if s.len() != 64 {
            return Err(CoreError::InvalidDigest(format!(
                "expected 64 hex characters, got {}",
                s.len()
            )));
        }
        if s != s.to_ascii_lowercase() {
            return Err(CoreError::InvalidDigest(
                "digest hex must be lowercase".to_string(),
            ));
        }
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidDigest(format!("invalid hex: {e}")))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ConsentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ConsentDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ConsentDigest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let digest = ConsentDigest([0xab; 32]);
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(ConsentDigest::from_hex(&hex).unwrap(), digest);
    }

    #[test]
    fn rejects_uppercase_hex() {
        let upper = "AB".repeat(32);
        assert!(ConsentDigest::from_hex(&upper).is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(ConsentDigest::from_hex("abcd").is_err());
        assert!(ConsentDigest::from_hex(&"ab".repeat(33)).is_err());
    }

    #[test]
    fn serde_uses_hex_string() {
        let digest = ConsentDigest([0x01; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: ConsentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
