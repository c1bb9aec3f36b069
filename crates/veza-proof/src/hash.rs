//! # Local Hash Prover
//!
//! Deterministic local proof backend. The "proof" is the salted SHA-256
//! digest itself, with a reference derived from the digest so replaying
//! identical parameters yields an identical handle.
//!
//! ## Security Notice
//!
//! This backend provides NO zero-knowledge privacy. The digest attests
//! that specific parameters were fixed at approval time, nothing more. It
//! is the development and fallback mode; production deployments configure
//! [`crate::RemoteProver`].

use async_trait::async_trait;

use veza_core::Timestamp;

use crate::digest::{consent_digest, ConsentParams, ConsentProof, SCHEME_VERSION};
use crate::traits::{ProofBackend, ProofError};

/// Prefix on every locally generated proof reference, so a reader can tell
/// a local stand-in from a service-issued handle at a glance.
pub const LOCAL_PROOF_PREFIX: &str = "hash-proof-";

/// Deterministic local proof backend.
#[derive(Debug, Default)]
pub struct HashProver;

impl HashProver {
    /// Create a new local prover.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProofBackend for HashProver {
    async fn submit(&self, params: &ConsentParams) -> Result<ConsentProof, ProofError> {
        let digest = consent_digest(params);
        let proof_ref = format!("{LOCAL_PROOF_PREFIX}{}", &digest.to_hex()[..16]);
        Ok(ConsentProof {
            proof_ref,
            digest,
            generated_at: Timestamp::now(),
            scheme_version: SCHEME_VERSION.to_string(),
        })
    }

    fn is_authoritative(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "hash-prover"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use veza_core::{PartyId, RecordCategory, RequestId};

    fn params() -> ConsentParams {
        ConsentParams {
            request_id: RequestId::new(),
            owner: PartyId::new("owner-1").unwrap(),
            requester: PartyId::new("requester-1").unwrap(),
            categories: BTreeSet::from([RecordCategory::LabResults]),
            approved_at: Timestamp::parse("2026-02-14T09:00:00Z").unwrap(),
        }
    }

    #[tokio::test]
    async fn submit_is_idempotent_for_identical_inputs() {
        let prover = HashProver::new();
        let p = params();
        let a = prover.submit(&p).await.unwrap();
        let b = prover.submit(&p).await.unwrap();
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.proof_ref, b.proof_ref);
        assert!(a.proof_ref.starts_with(LOCAL_PROOF_PREFIX));
    }

    #[tokio::test]
    async fn submitted_digest_verifies() {
        let prover = HashProver::new();
        let p = params();
        let proof = prover.submit(&p).await.unwrap();
        assert!(prover.verify_digest(&p, &proof.digest));
    }

    #[tokio::test]
    async fn mutated_params_fail_verification() {
        let prover = HashProver::new();
        let p = params();
        let proof = prover.submit(&p).await.unwrap();

        let mut mutated = p.clone();
        mutated.requester = PartyId::new("someone-else").unwrap();
        assert!(!prover.verify_digest(&mutated, &proof.digest));
    }

    #[test]
    fn hash_prover_is_not_authoritative() {
        assert!(!HashProver::new().is_authoritative());
    }
}
