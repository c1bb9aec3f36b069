//! # Release Gate
//!
//! Stands in front of every data release. Both ledger references are
//! re-verified against the persisted digest before a ciphertext reference
//! is returned — verify-then-fetch, never fetch-then-verify, so no
//! ciphertext handle leaves the gate unless both independent checks pass.
//! This bounds the blast radius of a compromised single ledger.
//!
//! Verification re-derives from persisted request data, not from live
//! provider reachability: an approval recorded in degraded mode still
//! releases, and a corrupted persisted digest never does.

use std::sync::Arc;

use serde::Serialize;

use veza_audit::AuditLedger;
use veza_core::{PartyId, RequestId};
use veza_proof::{ConsentParams, ProofBackend};
use veza_state::{AccessRequest, RequestStatus, RequestStore};

use crate::error::{ConsentError, VerificationReason};

/// Result of a successful release: a reference into the opaque blob
/// store, never plaintext.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    /// The released request.
    pub request_id: RequestId,
    /// Blob-store key of the owner's encrypted payload envelope.
    pub ciphertext_ref: String,
    /// Whether the proof digest re-verification passed (always true on
    /// the success path; carried for the response body).
    pub proof_verified: bool,
    /// Whether the audit commitment check passed.
    pub audit_verified: bool,
}

/// The verification gate in front of record release.
pub struct ReleaseGate {
    prover: Arc<dyn ProofBackend>,
    ledger: Arc<dyn AuditLedger>,
    store: Arc<RequestStore>,
}

impl ReleaseGate {
    /// Create a gate over the given providers and store.
    pub fn new(
        prover: Arc<dyn ProofBackend>,
        ledger: Arc<dyn AuditLedger>,
        store: Arc<RequestStore>,
    ) -> Self {
        Self {
            prover,
            ledger,
            store,
        }
    }

    /// Authorize a release and return the ciphertext reference.
    ///
    /// 1. Require `Approved` and a requester match — else `Forbidden`
    ///    (the response carries no existence signal).
    /// 2. Recompute the digest from persisted parameters.
    /// 3. Check the audit ledger for the persisted digest.
    ///    Steps 2 and 3 are independent and run concurrently; both must
    ///    pass before anything is fetched.
    pub async fn release(
        &self,
        request_id: RequestId,
        requester: &PartyId,
    ) -> Result<ReleaseOutcome, ConsentError> {
        let request = self.authorize(request_id, requester)?;

        // Approved implies both fields are set (store invariant); a row
        // violating it must not release.
        let (refs, approved_at) = match (&request.ledger_refs, request.approved_at) {
            (Some(refs), Some(approved_at)) => (refs.clone(), approved_at),
            _ => return Err(ConsentError::Forbidden(request_id)),
        };

        let params = ConsentParams {
            request_id,
            owner: request.owner.clone(),
            requester: request.requester.clone(),
            categories: request.categories.clone(),
            approved_at,
        };

        let (proof_ok, audit) = tokio::join!(
            async { self.prover.verify_digest(&params, &refs.proof_digest) },
            self.ledger
                .exists(request_id, &refs.proof_digest, &refs.audit_tx_ref),
        );

        if !proof_ok {
            tracing::warn!(
                request_id = %request_id,
                "release denied: persisted digest does not match recomputed parameters"
            );
            return Err(ConsentError::Verification {
                reason: VerificationReason::ProofVerificationFailed,
            });
        }
        if !audit.present {
            tracing::warn!(
                request_id = %request_id,
                authoritative = audit.authoritative,
                "release denied: no audit commitment for persisted digest"
            );
            return Err(ConsentError::Verification {
                reason: VerificationReason::AuditVerificationFailed,
            });
        }

        Ok(ReleaseOutcome {
            request_id,
            ciphertext_ref: envelope_ref(&request),
            proof_verified: true,
            audit_verified: true,
        })
    }

    /// The gate's authorization check: `Approved` and the caller is the
    /// named requester. The grant relay's pull path applies the same rule.
    fn authorize(
        &self,
        request_id: RequestId,
        requester: &PartyId,
    ) -> Result<AccessRequest, ConsentError> {
        let request = self
            .store
            .get(request_id)
            .ok_or(ConsentError::Forbidden(request_id))?;
        if request.status != RequestStatus::Approved || &request.requester != requester {
            return Err(ConsentError::Forbidden(request_id));
        }
        Ok(request)
    }
}

/// Blob-store key of the encrypted payload envelope for a request.
///
/// The blob store itself is an external collaborator; this is only the
/// key convention the owner's deposit path and the gate agree on.
pub fn envelope_ref(request: &AccessRequest) -> String {
    format!("records/{}/{}.env", request.owner, request.id)
}
