//! # Envelope Key Derivation and AEAD Sealing
//!
//! `derive_envelope_key` turns a wallet signature into a 256-bit AES key;
//! [`EnvelopeKey::encrypt`]/[`EnvelopeKey::decrypt`] seal and open byte
//! payloads in the nonce‖tag‖ciphertext wire format. Decryption fails
//! closed on tag mismatch, truncation, and malformed base64.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// HKDF info string for envelope key derivation.
const KEY_INFO: &[u8] = b"veza-envelope-key-v1";

/// A derived 256-bit envelope key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKey([u8; 32]);

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material never appears in logs.
        f.write_str("EnvelopeKey(..)")
    }
}

/// Derive the envelope key from the bytes of a wallet signature.
///
/// HKDF-SHA256 with no salt and a fixed info string: the same signature
/// always rederives the same key, which is what lets an owner recover
/// their envelope key from their credential alone.
pub fn derive_envelope_key(signature: &[u8]) -> EnvelopeKey {
    let hk = Hkdf::<Sha256>::new(None, signature);
    let mut okm = [0u8; 32];
    hk.expand(KEY_INFO, &mut okm)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    EnvelopeKey(okm)
}

impl EnvelopeKey {
    /// Construct a key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Load static key material from a 64-character hex string.
    ///
    /// Used for the server-side fallback key that seals administrative
    /// fields. Missing or malformed material is a [`CryptoError::Config`],
    /// not an integrity failure.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| CryptoError::Config(format!("fallback key is not valid hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(CryptoError::Config(format!(
                "fallback key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// Seal a plaintext into an envelope with a fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // aes-gcm appends the tag to the ciphertext; the wire format wants
        // it detached and placed directly after the nonce.
        let ct_with_tag = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Integrity("encryption failed".to_string()))?;
        let split = ct_with_tag.len() - TAG_LEN;

        let mut bytes = Vec::with_capacity(NONCE_LEN + ct_with_tag.len());
        bytes.extend_from_slice(&nonce_bytes);
        bytes.extend_from_slice(&ct_with_tag[split..]);
        bytes.extend_from_slice(&ct_with_tag[..split]);
        Ok(Envelope { bytes })
    }

    /// Open an envelope, verifying the authentication tag.
    ///
    /// Fails closed with [`CryptoError::Integrity`] on any mismatch —
    /// callers must not attempt partial recovery.
    pub fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0));
        let nonce = Nonce::from_slice(envelope.nonce());

        // Reassemble ciphertext‖tag, the layout aes-gcm verifies.
        let mut payload = Vec::with_capacity(envelope.ciphertext().len() + TAG_LEN);
        payload.extend_from_slice(envelope.ciphertext());
        payload.extend_from_slice(envelope.tag());

        cipher
            .decrypt(nonce, payload.as_slice())
            .map_err(|_| CryptoError::Integrity("authentication tag mismatch".to_string()))
    }
}

/// An encrypted envelope in the nonce‖tag‖ciphertext wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: Vec<u8>,
}

impl Envelope {
    /// Wrap raw wire bytes, rejecting anything shorter than nonce + tag.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Integrity(format!(
                "envelope truncated: {} bytes, need at least {}",
                bytes.len(),
                NONCE_LEN + TAG_LEN
            )));
        }
        Ok(Self { bytes })
    }

    /// Decode an envelope from its base64 transport form.
    pub fn from_base64(s: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(s.as_bytes())
            .map_err(|e| CryptoError::Integrity(format!("malformed base64: {e}")))?;
        Self::from_bytes(bytes)
    }

    /// Encode the envelope for transport.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// The raw wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 12-byte nonce.
    pub fn nonce(&self) -> &[u8] {
        &self.bytes[..NONCE_LEN]
    }

    /// The 16-byte authentication tag.
    pub fn tag(&self) -> &[u8] {
        &self.bytes[NONCE_LEN..NONCE_LEN + TAG_LEN]
    }

    /// The variable-length ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[NONCE_LEN + TAG_LEN..]
    }
}
