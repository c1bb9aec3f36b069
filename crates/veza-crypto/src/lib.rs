//! # veza-crypto — Envelope Encryption
//!
//! Protects record payloads at rest and in transit between owner and
//! counterparty. The owner signs a fixed application message with their
//! wallet credential; the signature bytes are fed through HKDF-SHA256 to
//! derive a stable 256-bit envelope key, which seals payloads with
//! AES-256-GCM.
//!
//! ## Wire Format
//!
//! ```text
//! [ 12-byte nonce ][ 16-byte tag ][ ciphertext ... ]
//! ```
//!
//! transported as a standard base64 string. The nonce is freshly random per
//! encryption call and must never repeat for a given key.
//!
//! ## Design
//!
//! Key derivation uses no salt and no per-call context beyond the fixed
//! info string, so the same credential always rederives the same key. All
//! operations are pure functions over supplied bytes — no key storage, no
//! network, no clock.

pub mod envelope;
pub mod error;
pub mod signer;

pub use envelope::{derive_envelope_key, Envelope, EnvelopeKey, NONCE_LEN, TAG_LEN};
pub use error::CryptoError;
pub use signer::{Ed25519SignatureSource, SignatureSource, SIGNING_MESSAGE};
