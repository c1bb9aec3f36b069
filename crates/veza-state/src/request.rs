//! # Access Request Model

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use veza_core::{ConsentDigest, PartyId, RecordCategory, RequestId, Timestamp};

/// Lifecycle status of an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting the owner's decision.
    Pending,
    /// Granted by the owner. Terminal.
    Approved,
    /// Declined by the owner. Terminal.
    Rejected,
}

impl RequestStatus {
    /// The canonical wire label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// References into the two consent ledgers, captured at approval time.
///
/// Set iff the owning request is `Approved`; written exactly once in the
/// same store write as the status flip; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRefs {
    /// Opaque handle to the private consent proof.
    pub proof_ref: String,
    /// The consent digest the proof attests.
    pub proof_digest: ConsentDigest,
    /// Transaction reference on the public audit ledger.
    pub audit_tx_ref: String,
    /// Address of the verification script the audit commitment went through.
    pub audit_script_ref: String,
    /// The audit ledger's network identifier.
    pub audit_network_id: String,
}

/// An access request from a counterparty to a record owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The counterparty asking for access.
    pub requester: PartyId,
    /// The data subject who must decide.
    pub owner: PartyId,
    /// The record categories requested. Never empty.
    pub categories: BTreeSet<RecordCategory>,
    /// Optional free-text reason supplied by the requester.
    pub reason: Option<String>,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// When the request was created.
    pub created_at: Timestamp,
    /// When the owner approved. `Some` iff `status == Approved`.
    pub approved_at: Option<Timestamp>,
    /// Ledger references. `Some` iff `status == Approved`.
    pub ledger_refs: Option<LedgerRefs>,
}
