//! # Audit Ledger Trait and Local Degraded Mode
//!
//! The [`AuditLedger`] trait is **sealed** — only implementations within
//! this crate are permitted. This prevents external code from introducing
//! unaudited ledger targets that could weaken the release gate's
//! verification assumptions.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

use veza_core::{ConsentDigest, PartyId, RequestId, Timestamp};

/// Network identifier reported by the degraded local mode.
pub const LOCAL_NETWORK_ID: &str = "local";

/// Identifier of the fixed consent verification script. The script address
/// on any network is derived from this identifier, so every deployment on
/// the same network resolves the same address.
const VERIFICATION_SCRIPT_ID: &str = "veza-consent-registry-v1";

/// Errors from audit ledger operations.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The ledger rejected the commitment.
    #[error("audit commitment rejected: {0}")]
    Rejected(String),

    /// The ledger is unreachable or timed out.
    #[error("ledger unavailable: {network_id}")]
    Unavailable {
        /// The target network identifier.
        network_id: String,
    },

    /// The commitment transaction failed on the ledger.
    #[error("audit transaction failed on {network_id}: {reason}")]
    TransactionFailed {
        /// The target network identifier.
        network_id: String,
        /// Failure reason.
        reason: String,
    },
}

/// A committed audit record. Ephemeral — its fields are copied onto the
/// owning access request; the record itself lives on the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Transaction reference on the target ledger.
    pub tx_ref: String,
    /// Address of the verification script the commitment went through.
    pub script_ref: String,
    /// The target network identifier.
    pub network_id: String,
    /// Whether the commitment is already final on the ledger.
    pub finalized: bool,
}

/// Result of an `exists` check.
///
/// A ledger-confirmed result is authoritative. When the ledger cannot be
/// queried, the check falls back to the persisted reference+digest pair —
/// still useful, but weaker, and callers can tell the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditAttestation {
    /// Whether a commitment matching the digest was found.
    pub present: bool,
    /// Whether the answer came from the ledger itself.
    pub authoritative: bool,
}

/// Derive the deterministic script address for a network.
///
/// Truncated SHA-256 of the fixed verification script identifier plus the
/// network identifier, rendered in the ledger's 20-byte address form.
pub fn derive_script_address(network_id: &str) -> String {
    let hash = Sha256::digest(format!("{VERIFICATION_SCRIPT_ID}|{network_id}").as_bytes());
    format!("0x{}", hex::encode(&hash[..20]))
}

/// Check a persisted transaction reference against an expected digest.
///
/// Both local and degraded-placeholder references embed the leading 16 hex
/// characters of the digest they committed, so a corrupted digest no
/// longer matches its own reference.
pub(crate) fn matches_persisted_pair(tx_ref: &str, expected: &ConsentDigest) -> bool {
    !tx_ref.is_empty() && tx_ref.contains(&expected.to_hex()[..16])
}

/// Trait for public audit ledger targets.
///
/// Sealed — only implementations within this crate are permitted.
///
/// ## Security Invariant
///
/// `record` must only return `Ok` once the commitment is durably recorded
/// on its target (for [`LocalLedger`], the in-process index). Returning
/// `Ok` for an unrecorded commitment would let the release gate assume an
/// audit trail that does not exist.
#[async_trait]
pub trait AuditLedger: private::Sealed + Send + Sync {
    /// Commit an audit record referencing the digest to the ledger.
    async fn record(
        &self,
        owner: &PartyId,
        requester: &PartyId,
        digest: &ConsentDigest,
        timestamp: Timestamp,
    ) -> Result<AuditRecord, AuditError>;

    /// Check whether a commitment matching `expected` exists.
    ///
    /// Never fails hard: an unreachable ledger degrades to the persisted
    /// reference+digest pair with `authoritative: false`.
    async fn exists(
        &self,
        request_id: RequestId,
        expected: &ConsentDigest,
        persisted_tx_ref: &str,
    ) -> AuditAttestation;

    /// Whether commitments from this ledger are publicly verifiable.
    fn is_authoritative(&self) -> bool;

    /// The network identifier this ledger commits to.
    fn network_id(&self) -> &str;
}

pub(crate) mod private {
    pub trait Sealed {}
    impl Sealed for super::LocalLedger {}
    impl Sealed for crate::rpc::JsonRpcLedger {}
}

/// Degraded local mode: no network, immediate finality, deterministic
/// references.
///
/// ## Warning
///
/// Provides NO public verifiability. Records exist only in this process.
/// Suitable for development, testing, and deployments that have not yet
/// configured a ledger — the unconfigured state is not an error.
#[derive(Debug, Default)]
pub struct LocalLedger {
    recorded: RwLock<HashSet<String>>,
}

impl LocalLedger {
    /// Create a new local ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLedger for LocalLedger {
    async fn record(
        &self,
        owner: &PartyId,
        requester: &PartyId,
        digest: &ConsentDigest,
        timestamp: Timestamp,
    ) -> Result<AuditRecord, AuditError> {
        let digest_hex = digest.to_hex();
        self.recorded.write().insert(digest_hex.clone());

        tracing::info!(
            owner = %owner,
            requester = %requester,
            at = %timestamp,
            "recorded consent commitment on local ledger (degraded mode, not publicly verifiable)"
        );

        Ok(AuditRecord {
            tx_ref: format!("local-tx-{}", &digest_hex[..16]),
            script_ref: derive_script_address(LOCAL_NETWORK_ID),
            network_id: LOCAL_NETWORK_ID.to_string(),
            finalized: true,
        })
    }

    async fn exists(
        &self,
        _request_id: RequestId,
        expected: &ConsentDigest,
        persisted_tx_ref: &str,
    ) -> AuditAttestation {
        let present = self.recorded.read().contains(&expected.to_hex())
            || matches_persisted_pair(persisted_tx_ref, expected);
        AuditAttestation {
            present,
            authoritative: false,
        }
    }

    fn is_authoritative(&self) -> bool {
        false
    }

    fn network_id(&self) -> &str {
        LOCAL_NETWORK_ID
    }
}
