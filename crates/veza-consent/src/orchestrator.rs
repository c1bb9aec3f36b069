//! # Consent Orchestrator
//!
//! Drives approval: private proof first, public audit second (the digest
//! from the proof step is an input to the audit step — no reordering),
//! then one atomic store write. Consent recording is attempted best-effort
//! against two independent systems, but the local state transition is the
//! source of truth and always succeeds once authorization passes. The
//! alternative — treating ledger failure as a hard error — would make the
//! whole product unusable whenever a third-party network is degraded,
//! which is unacceptable for a system whose primary job is to unblock
//! access.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use veza_audit::{derive_script_address, AuditLedger};
use veza_core::{ConsentDigest, RequestId, Timestamp};
use veza_proof::{consent_digest, ConsentParams, ProofBackend};
use veza_state::{AccessRequest, LedgerRefs, RelayStore, RequestStatus, RequestStore};

use crate::error::ConsentError;

/// Prefix on proof references synthesized when the proof backend failed.
pub const DEGRADED_PROOF_PREFIX: &str = "degraded-proof-";

/// Prefix on audit references synthesized when the audit ledger failed.
pub const DEGRADED_TX_PREFIX: &str = "degraded-tx-";

/// Default bound on each provider call during approval.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-ledger outcome of the proof step.
#[derive(Debug, Clone, Serialize)]
pub struct ProofOutcome {
    /// Proof handle — service-issued, or a `degraded-proof-…` placeholder.
    pub proof_ref: String,
    /// The consent digest bound to this approval.
    pub digest: ConsentDigest,
    /// Whether the proof backend authoritatively recorded the proof.
    pub is_real: bool,
}

/// Per-ledger outcome of the audit step.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutcome {
    /// Ledger transaction reference, or a `degraded-tx-…` placeholder.
    pub tx_ref: String,
    /// The verification script address the commitment targets.
    pub script_ref: String,
    /// The audit network identifier.
    pub network_id: String,
    /// Whether the ledger authoritatively recorded the commitment.
    pub is_real: bool,
}

/// Result of a successful approval, distinguishing per ledger whether the
/// recorded result is authoritative or a locally synthesized placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    /// The approved request.
    pub request_id: RequestId,
    /// Outcome of the private proof step.
    pub proof: ProofOutcome,
    /// Outcome of the public audit step.
    pub audit: AuditOutcome,
}

/// Orchestrates the two-phase consent recording on approval.
///
/// Holds explicitly constructed providers, built once at process start and
/// injected by reference.
pub struct ConsentOrchestrator {
    prover: Arc<dyn ProofBackend>,
    ledger: Arc<dyn AuditLedger>,
    store: Arc<RequestStore>,
    relay: Arc<RelayStore>,
    provider_timeout: Duration,
}

impl ConsentOrchestrator {
    /// Create an orchestrator over the given providers and stores.
    pub fn new(
        prover: Arc<dyn ProofBackend>,
        ledger: Arc<dyn AuditLedger>,
        store: Arc<RequestStore>,
        relay: Arc<RelayStore>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            prover,
            ledger,
            store,
            relay,
            provider_timeout,
        }
    }

    /// Approve a pending request as its owner.
    ///
    /// 1. Authorize against the stored request.
    /// 2. Record the private proof (degrading to a placeholder on failure).
    /// 3. Record the public audit commitment (same degrade rule).
    /// 4. Persist status, references, and approval timestamp atomically.
    ///
    /// A concurrent competing transition loses at step 4 and surfaces as
    /// `InvalidTransition`.
    pub async fn approve(
        &self,
        request_id: RequestId,
        owner: &veza_core::PartyId,
    ) -> Result<ApprovalOutcome, ConsentError> {
        let request = self
            .store
            .get(request_id)
            .ok_or(ConsentError::NotFound(request_id))?;

        // Pre-flight authorization, so provider calls are never made on
        // behalf of the wrong actor. The store re-validates at commit.
        if &request.owner != owner {
            return Err(ConsentError::Unauthorized(request_id));
        }
        if request.status != RequestStatus::Pending {
            return Err(ConsentError::InvalidTransition {
                id: request_id,
                status: request.status,
            });
        }

        let approved_at = Timestamp::now();
        let params = ConsentParams {
            request_id,
            owner: request.owner.clone(),
            requester: request.requester.clone(),
            categories: request.categories.clone(),
            approved_at,
        };

        let proof = self.record_proof(&params).await;
        let audit = self.record_audit(&request, &proof.digest, approved_at).await;

        let refs = LedgerRefs {
            proof_ref: proof.proof_ref.clone(),
            proof_digest: proof.digest,
            audit_tx_ref: audit.tx_ref.clone(),
            audit_script_ref: audit.script_ref.clone(),
            audit_network_id: audit.network_id.clone(),
        };
        self.store.approve(request_id, owner, approved_at, refs)?;

        tracing::info!(
            request_id = %request_id,
            proof_real = proof.is_real,
            audit_real = audit.is_real,
            "access request approved"
        );

        Ok(ApprovalOutcome {
            request_id,
            proof,
            audit,
        })
    }

    /// Reject a pending request as its owner.
    pub async fn reject(
        &self,
        request_id: RequestId,
        owner: &veza_core::PartyId,
    ) -> Result<AccessRequest, ConsentError> {
        let rejected = self.store.reject(request_id, owner)?;
        tracing::info!(request_id = %request_id, "access request rejected");
        Ok(rejected)
    }

    /// Delete a request and cascade its relay payloads.
    pub fn delete_request(&self, request_id: RequestId) -> Option<AccessRequest> {
        let removed = self.store.remove(request_id);
        if removed.is_some() {
            let dropped = self.relay.remove_request(request_id);
            if dropped > 0 {
                tracing::debug!(
                    request_id = %request_id,
                    rows = dropped,
                    "cascaded relay payload deletion"
                );
            }
        }
        removed
    }

    /// Step 2: private proof, degrading to a placeholder on any failure.
    ///
    /// The digest itself is pure local computation and cannot fail; only
    /// the registration of the proof handle can, so the placeholder keeps
    /// the real digest and the release gate's later recomputation still
    /// matches.
    async fn record_proof(&self, params: &ConsentParams) -> ProofOutcome {
        match tokio::time::timeout(self.provider_timeout, self.prover.submit(params)).await {
            Ok(Ok(proof)) => ProofOutcome {
                proof_ref: proof.proof_ref,
                digest: proof.digest,
                is_real: self.prover.is_authoritative(),
            },
            Ok(Err(err)) => {
                tracing::warn!(
                    request_id = %params.request_id,
                    backend = self.prover.name(),
                    error = %err,
                    "proof provider degraded; continuing with placeholder"
                );
                Self::placeholder_proof(params)
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %params.request_id,
                    backend = self.prover.name(),
                    timeout_ms = self.provider_timeout.as_millis() as u64,
                    "proof provider timed out; continuing with placeholder"
                );
                Self::placeholder_proof(params)
            }
        }
    }

    fn placeholder_proof(params: &ConsentParams) -> ProofOutcome {
        let digest = consent_digest(params);
        ProofOutcome {
            proof_ref: format!("{DEGRADED_PROOF_PREFIX}{}", &digest.to_hex()[..16]),
            digest,
            is_real: false,
        }
    }

    /// Step 3: public audit, degrading to a placeholder on any failure.
    async fn record_audit(
        &self,
        request: &AccessRequest,
        digest: &ConsentDigest,
        approved_at: Timestamp,
    ) -> AuditOutcome {
        let record = tokio::time::timeout(
            self.provider_timeout,
            self.ledger
                .record(&request.owner, &request.requester, digest, approved_at),
        )
        .await;

        match record {
            Ok(Ok(record)) => AuditOutcome {
                tx_ref: record.tx_ref,
                script_ref: record.script_ref,
                network_id: record.network_id,
                is_real: self.ledger.is_authoritative(),
            },
            Ok(Err(err)) => {
                tracing::warn!(
                    request_id = %request.id,
                    network = self.ledger.network_id(),
                    error = %err,
                    "audit ledger degraded; continuing with placeholder"
                );
                self.placeholder_audit(digest)
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %request.id,
                    network = self.ledger.network_id(),
                    timeout_ms = self.provider_timeout.as_millis() as u64,
                    "audit ledger timed out; continuing with placeholder"
                );
                self.placeholder_audit(digest)
            }
        }
    }

    fn placeholder_audit(&self, digest: &ConsentDigest) -> AuditOutcome {
        let network_id = self.ledger.network_id().to_string();
        AuditOutcome {
            tx_ref: format!("{DEGRADED_TX_PREFIX}{}", &digest.to_hex()[..16]),
            script_ref: derive_script_address(&network_id),
            network_id,
            is_real: false,
        }
    }
}
