//! # Signature Source
//!
//! Abstraction over the owner's wallet credential. The envelope key is
//! derived from a signature over a fixed application message, so the
//! wallet only ever signs one well-known string for key derivation —
//! never attacker-chosen bytes.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use crate::error::CryptoError;

/// The fixed message an owner signs to derive their envelope key.
///
/// Changing this string rotates every derived key in the system, so it is
/// versioned in place.
pub const SIGNING_MESSAGE: &[u8] = b"veza: authorize record envelope key (v1)";

/// A source of wallet signatures over the fixed key-derivation message.
///
/// Implementations wrap whatever credential the owner controls. An
/// interactive wallet may refuse; that refusal surfaces as
/// [`CryptoError::SigningDeclined`] with the wallet's own message so the
/// caller can show the user why no key was derived.
pub trait SignatureSource: Send + Sync {
    /// Sign [`SIGNING_MESSAGE`] and return the raw signature bytes.
    fn sign_key_message(&self) -> Result<Vec<u8>, CryptoError>;
}

/// Signature source backed by an in-process ed25519 keypair.
#[derive(Debug)]
pub struct Ed25519SignatureSource {
    key: SigningKey,
}

impl Ed25519SignatureSource {
    /// Wrap an existing signing key.
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// The public half, for callers that need to verify.
    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        self.key.verifying_key()
    }
}

impl SignatureSource for Ed25519SignatureSource {
    fn sign_key_message(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(self.key.sign(SIGNING_MESSAGE).to_bytes().to_vec())
    }
}
