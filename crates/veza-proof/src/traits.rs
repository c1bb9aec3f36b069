//! # Proof Backend Trait
//!
//! Abstract interface for consent proof backends. Sealed — only the two
//! implementations in this crate exist, and they are selected by
//! configuration at process start.
//!
//! ## Security Invariant
//!
//! `verify_digest` recomputes the digest from the supplied parameters and
//! compares in constant time. It never consults the network: verification
//! must succeed or fail identically whether or not the backing service is
//! reachable.

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use thiserror::Error;

use veza_core::ConsentDigest;

use crate::digest::{consent_digest, ConsentParams, ConsentProof};

/// Error during proof submission.
///
/// These never abort an approval — the orchestrator degrades to a
/// placeholder result and records the failure.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The proof service could not be reached or timed out.
    #[error("proof service unavailable: {0}")]
    Unavailable(String),

    /// The proof service answered but refused the submission.
    #[error("proof submission rejected: {0}")]
    Rejected(String),
}

/// Abstract interface for a consent proof backend.
///
/// Both variants share the same deterministic digest function, so a proof
/// submitted by one backend verifies under the other. Implementations
/// differ only in where the proof handle is registered.
#[async_trait]
pub trait ProofBackend: private::Sealed + Send + Sync {
    /// Register a proof for the given parameters and return its handle.
    ///
    /// Idempotent for identical inputs at the same timestamp value.
    async fn submit(&self, params: &ConsentParams) -> Result<ConsentProof, ProofError>;

    /// Recompute the digest from `params` and compare against `expected`.
    ///
    /// Pure local computation; constant-time comparison.
    fn verify_digest(&self, params: &ConsentParams, expected: &ConsentDigest) -> bool {
        consent_digest(params)
            .as_bytes()
            .ct_eq(expected.as_bytes())
            .into()
    }

    /// Whether results from this backend are authoritative attestations,
    /// as opposed to local development stand-ins.
    fn is_authoritative(&self) -> bool;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

pub(crate) mod private {
    pub trait Sealed {}
    impl Sealed for crate::hash::HashProver {}
    impl Sealed for crate::remote::RemoteProver {}
}
