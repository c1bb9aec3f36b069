//! # Grant Relay
//!
//! Owner-side staging and counterparty pickup of per-file payloads. The
//! owner decrypts a file with their own envelope key and pushes the
//! resulting bytes into the request's bucket; the approved counterparty
//! pulls them without holding the owner's key.
//!
//! Pull uses the same authorization check as the release gate (approved
//! request, caller is the named requester) but deliberately does not
//! repeat digest/audit re-verification on every pull — a flagged scope
//! reduction: the owner-side decrypt-then-relay pattern trades end-to-end
//! confidentiality for interoperability with a counterparty that does not
//! hold the owner's key.

use std::sync::Arc;

use veza_core::{PartyId, RequestId};
use veza_state::{GrantedPayload, RelayStore, RequestStatus, RequestStore};

use crate::error::ConsentError;

/// Authorized push/pull access to the relay store.
pub struct GrantRelay {
    store: Arc<RequestStore>,
    relay: Arc<RelayStore>,
}

impl GrantRelay {
    /// Create a relay over the given stores.
    pub fn new(store: Arc<RequestStore>, relay: Arc<RelayStore>) -> Self {
        Self { store, relay }
    }

    /// Stage a payload for pickup, as the owner.
    ///
    /// Requires an approved request and the caller to be its owner.
    /// Re-submission for the same `(request, file_ref)` overwrites.
    pub fn push(
        &self,
        request_id: RequestId,
        owner: &PartyId,
        file_ref: String,
        payload: String,
    ) -> Result<GrantedPayload, ConsentError> {
        let request = self
            .store
            .get(request_id)
            .ok_or(ConsentError::NotFound(request_id))?;
        if &request.owner != owner {
            return Err(ConsentError::Unauthorized(request_id));
        }
        if request.status != RequestStatus::Approved {
            return Err(ConsentError::InvalidTransition {
                id: request_id,
                status: request.status,
            });
        }

        tracing::debug!(
            request_id = %request_id,
            file_ref = %file_ref,
            "staged granted payload"
        );
        Ok(self.relay.put(request_id, file_ref, payload))
    }

    /// Pick up a staged payload, as the approved counterparty.
    ///
    /// Same authorization as the release gate; no per-pull ledger
    /// re-verification.
    pub fn pull(
        &self,
        request_id: RequestId,
        requester: &PartyId,
        file_ref: &str,
    ) -> Result<GrantedPayload, ConsentError> {
        let request = self
            .store
            .get(request_id)
            .ok_or(ConsentError::Forbidden(request_id))?;
        if request.status != RequestStatus::Approved || &request.requester != requester {
            return Err(ConsentError::Forbidden(request_id));
        }

        self.relay
            .get(request_id, file_ref)
            .ok_or_else(|| ConsentError::PayloadNotFound {
                request_id,
                file_ref: file_ref.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use veza_core::{ConsentDigest, RecordCategory, Timestamp};
    use veza_state::LedgerRefs;

    fn owner() -> PartyId {
        PartyId::new("owner-1").unwrap()
    }

    fn requester() -> PartyId {
        PartyId::new("requester-1").unwrap()
    }

    fn refs() -> LedgerRefs {
        LedgerRefs {
            proof_ref: "hash-proof-0011223344556677".to_string(),
            proof_digest: ConsentDigest([0x01; 32]),
            audit_tx_ref: "local-tx-0011223344556677".to_string(),
            audit_script_ref: format!("0x{}", "0".repeat(40)),
            audit_network_id: "local".to_string(),
        }
    }

    fn setup() -> (Arc<RequestStore>, GrantRelay) {
        let store = Arc::new(RequestStore::new());
        let relay = GrantRelay::new(Arc::clone(&store), Arc::new(RelayStore::new()));
        (store, relay)
    }

    fn approved(store: &RequestStore) -> RequestId {
        let request = store
            .create(
                requester(),
                owner(),
                BTreeSet::from([RecordCategory::Imaging]),
                None,
            )
            .unwrap();
        store
            .approve(request.id, &owner(), Timestamp::now(), refs())
            .unwrap();
        request.id
    }

    #[test]
    fn push_then_pull_round_trips() {
        let (store, relay) = setup();
        let id = approved(&store);

        relay
            .push(id, &owner(), "scan.dcm".into(), "decrypted-bytes".into())
            .unwrap();
        let row = relay.pull(id, &requester(), "scan.dcm").unwrap();
        assert_eq!(row.payload, "decrypted-bytes");
    }

    #[test]
    fn push_overwrites_prior_payload() {
        let (store, relay) = setup();
        let id = approved(&store);

        relay.push(id, &owner(), "f".into(), "v1".into()).unwrap();
        relay.push(id, &owner(), "f".into(), "v2".into()).unwrap();
        assert_eq!(relay.pull(id, &requester(), "f").unwrap().payload, "v2");
    }

    #[test]
    fn push_to_pending_request_is_rejected() {
        let (store, relay) = setup();
        let request = store
            .create(
                requester(),
                owner(),
                BTreeSet::from([RecordCategory::Imaging]),
                None,
            )
            .unwrap();

        let err = relay
            .push(request.id, &owner(), "f".into(), "v".into())
            .unwrap_err();
        assert!(matches!(err, ConsentError::InvalidTransition { .. }));
    }

    #[test]
    fn push_by_wrong_owner_is_unauthorized() {
        let (store, relay) = setup();
        let id = approved(&store);

        let err = relay
            .push(id, &PartyId::new("impostor").unwrap(), "f".into(), "v".into())
            .unwrap_err();
        assert_eq!(err, ConsentError::Unauthorized(id));
    }

    #[test]
    fn pull_by_wrong_requester_is_forbidden() {
        let (store, relay) = setup();
        let id = approved(&store);
        relay.push(id, &owner(), "f".into(), "v".into()).unwrap();

        let err = relay
            .pull(id, &PartyId::new("someone-else").unwrap(), "f")
            .unwrap_err();
        assert_eq!(err, ConsentError::Forbidden(id));
    }

    #[test]
    fn pull_of_missing_file_is_payload_not_found() {
        let (store, relay) = setup();
        let id = approved(&store);

        let err = relay.pull(id, &requester(), "missing").unwrap_err();
        assert!(matches!(err, ConsentError::PayloadNotFound { .. }));
    }
}
