//! # Consent Digest Computation
//!
//! The digest is a pure deterministic function of the consent parameters
//! plus a fixed application salt. It can be recomputed at verification
//! time from persisted request fields alone — no raw inputs are stored
//! anywhere else.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use veza_core::{ConsentDigest, PartyId, RecordCategory, RequestId, Timestamp};

/// Version tag carried on every proof so a future scheme can be told apart
/// from the salted-SHA-256 reference scheme.
pub const SCHEME_VERSION: &str = "sha256-salted-v1";

/// Fixed application salt mixed into every consent digest.
const DIGEST_SALT: &str = "veza-consent-digest-v1";

/// The parameters a consent digest binds together.
///
/// Field values are canonical by construction: party ids are trimmed at
/// the type boundary, the timestamp renders seconds-precision UTC, and
/// category labels are sorted before hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentParams {
    /// The access request being consented to.
    pub request_id: RequestId,
    /// The data subject granting access.
    pub owner: PartyId,
    /// The counterparty receiving access.
    pub requester: PartyId,
    /// The record categories covered by the grant.
    pub categories: BTreeSet<RecordCategory>,
    /// The approval timestamp. Part of the digest, so a replayed approval
    /// at a different instant produces a different digest.
    pub approved_at: Timestamp,
}

/// A generated consent proof. Ephemeral — its `proof_ref` and `digest`
/// are copied onto the owning access request; nothing else is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentProof {
    /// Opaque handle to the registered proof.
    pub proof_ref: String,
    /// The digest binding the consent parameters.
    pub digest: ConsentDigest,
    /// When the proof was generated.
    pub generated_at: Timestamp,
    /// Digest scheme identifier.
    pub scheme_version: String,
}

/// Compute the consent digest for a set of parameters.
///
/// Concatenates the sorted, trimmed representations of every field joined
/// by `|`, appends the fixed application salt, and hashes with SHA-256.
/// Deterministic: identical parameters (including the timestamp) always
/// produce an identical digest.
pub fn consent_digest(params: &ConsentParams) -> ConsentDigest {
    let mut labels: Vec<&str> = params.categories.iter().map(|c| c.as_str()).collect();
    labels.sort_unstable();

    let preimage = format!(
        "{}|{}|{}|{}|{}|{}",
        params.request_id,
        params.owner.as_str(),
        params.requester.as_str(),
        labels.join(","),
        params.approved_at.to_iso8601(),
        DIGEST_SALT,
    );

    let hash = Sha256::digest(preimage.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ConsentDigest(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ConsentParams {
        ConsentParams {
            request_id: RequestId::new(),
            owner: PartyId::new("owner-wallet-1").unwrap(),
            requester: PartyId::new("requester-wallet-1").unwrap(),
            categories: [RecordCategory::LabResults, RecordCategory::Imaging]
                .into_iter()
                .collect(),
            approved_at: Timestamp::parse("2026-02-14T09:00:00Z").unwrap(),
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let p = params();
        assert_eq!(consent_digest(&p), consent_digest(&p));
    }

    #[test]
    fn digest_binds_every_field() {
        let base = params();
        let base_digest = consent_digest(&base);

        let mut changed = base.clone();
        changed.owner = PartyId::new("owner-wallet-2").unwrap();
        assert_ne!(consent_digest(&changed), base_digest);

        let mut changed = base.clone();
        changed.requester = PartyId::new("requester-wallet-2").unwrap();
        assert_ne!(consent_digest(&changed), base_digest);

        let mut changed = base.clone();
        changed.categories.insert(RecordCategory::Billing);
        assert_ne!(consent_digest(&changed), base_digest);

        let mut changed = base.clone();
        changed.approved_at = Timestamp::parse("2026-02-14T09:00:01Z").unwrap();
        assert_ne!(consent_digest(&changed), base_digest);

        let mut changed = base.clone();
        changed.request_id = RequestId::new();
        assert_ne!(consent_digest(&changed), base_digest);
    }

    #[test]
    fn category_insertion_order_is_irrelevant() {
        let mut a = params();
        a.categories = [RecordCategory::Imaging, RecordCategory::LabResults]
            .into_iter()
            .collect();
        let mut b = params();
        b.request_id = a.request_id;
        b.categories = [RecordCategory::LabResults, RecordCategory::Imaging]
            .into_iter()
            .collect();
        assert_eq!(consent_digest(&a), consent_digest(&b));
    }

    #[test]
    fn whitespace_in_party_input_does_not_change_digest() {
        let a = params();
        let mut b = a.clone();
        b.owner = PartyId::new("  owner-wallet-1  ").unwrap();
        assert_eq!(consent_digest(&a), consent_digest(&b));
    }
}
