//! # Access Request Store
//!
//! In-memory store for access requests. Transitions are atomically
//! read-validate-update under a single write lock, which eliminates the
//! TOCTOU race where two requests could both observe `Pending` and both
//! transition — the loser of the race fails with `InvalidTransition`.

use std::collections::BTreeSet;
use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use veza_core::{PartyId, RecordCategory, RequestId, Timestamp};

use crate::request::{AccessRequest, LedgerRefs, RequestStatus};

/// Errors from request creation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// A pending request for the same requester/owner pair already exists.
    #[error("a pending request for this requester/owner pair already exists")]
    DuplicatePending,

    /// The requested category set was empty.
    #[error("category set must be non-empty")]
    EmptyCategories,
}

/// Errors from state machine transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No request with the given id exists.
    #[error("access request {0} not found")]
    NotFound(RequestId),

    /// The acting party is not the owner named on the request.
    #[error("party is not authorized to act on request {0}")]
    Unauthorized(RequestId),

    /// The request has already reached a terminal state.
    #[error("request {id} is {status}; only pending requests may transition")]
    InvalidTransition {
        /// The request that refused the transition.
        id: RequestId,
        /// Its current (terminal) status.
        status: RequestStatus,
    },
}

/// In-memory access request store.
///
/// All mutation paths take the write lock once and hold it across the
/// validate-and-apply sequence.
#[derive(Debug, Default)]
pub struct RequestStore {
    requests: RwLock<HashMap<RequestId, AccessRequest>>,
}

impl RequestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pending request.
    ///
    /// Rejects an empty category set and a duplicate pending request for
    /// the same (requester, owner) pair.
    pub fn create(
        &self,
        requester: PartyId,
        owner: PartyId,
        categories: BTreeSet<RecordCategory>,
        reason: Option<String>,
    ) -> Result<AccessRequest, CreateError> {
        if categories.is_empty() {
            return Err(CreateError::EmptyCategories);
        }

        let mut requests = self.requests.write();
        let duplicate = requests.values().any(|r| {
            r.status == RequestStatus::Pending && r.requester == requester && r.owner == owner
        });
        if duplicate {
            return Err(CreateError::DuplicatePending);
        }

        let request = AccessRequest {
            id: RequestId::new(),
            requester,
            owner,
            categories,
            reason,
            status: RequestStatus::Pending,
            created_at: Timestamp::now(),
            approved_at: None,
            ledger_refs: None,
        };
        requests.insert(request.id, request.clone());
        Ok(request)
    }

    /// Fetch a request by id.
    pub fn get(&self, id: RequestId) -> Option<AccessRequest> {
        self.requests.read().get(&id).cloned()
    }

    /// Snapshot of every stored request.
    pub fn list(&self) -> Vec<AccessRequest> {
        self.requests.read().values().cloned().collect()
    }

    /// All pending requests addressed to the given owner, oldest first.
    pub fn list_pending_for_owner(&self, owner: &PartyId) -> Vec<AccessRequest> {
        let mut pending: Vec<_> = self
            .requests
            .read()
            .values()
            .filter(|r| r.status == RequestStatus::Pending && &r.owner == owner)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending
    }

    /// Transition a pending request to `Approved`, persisting the supplied
    /// ledger references and approval timestamp in the same write.
    ///
    /// The store does not produce the references — the orchestrator does —
    /// but persisting them atomically with the status flip means a reader
    /// can never observe `Approved` with missing references.
    pub fn approve(
        &self,
        id: RequestId,
        owner: &PartyId,
        approved_at: Timestamp,
        refs: LedgerRefs,
    ) -> Result<AccessRequest, TransitionError> {
        self.transition(id, owner, |request| {
            request.status = RequestStatus::Approved;
            request.approved_at = Some(approved_at);
            request.ledger_refs = Some(refs);
        })
    }

    /// Transition a pending request to `Rejected`.
    pub fn reject(&self, id: RequestId, owner: &PartyId) -> Result<AccessRequest, TransitionError> {
        self.transition(id, owner, |request| {
            request.status = RequestStatus::Rejected;
        })
    }

    /// Delete a request. Returns the removed request, if any.
    ///
    /// Relay payloads for the request are owned by `RelayStore`; callers
    /// that delete a request must cascade there as well.
    pub fn remove(&self, id: RequestId) -> Option<AccessRequest> {
        self.requests.write().remove(&id)
    }

    /// Number of stored requests.
    pub fn len(&self) -> usize {
        self.requests.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.read().is_empty()
    }

    /// Atomically validate and apply a transition under one write lock.
    ///
    /// Guard order matters: existence, then actor, then status — so a
    /// terminal-state failure is reported as `InvalidTransition` and never
    /// masked as `Unauthorized` or `NotFound`.
    fn transition(
        &self,
        id: RequestId,
        owner: &PartyId,
        apply: impl FnOnce(&mut AccessRequest),
    ) -> Result<AccessRequest, TransitionError> {
        let mut requests = self.requests.write();
        let request = requests.get_mut(&id).ok_or(TransitionError::NotFound(id))?;

        if &request.owner != owner {
            return Err(TransitionError::Unauthorized(id));
        }
        if request.status != RequestStatus::Pending {
            return Err(TransitionError::InvalidTransition {
                id,
                status: request.status,
            });
        }

        apply(request);
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use veza_core::ConsentDigest;

    fn owner() -> PartyId {
        PartyId::new("owner-1").unwrap()
    }

    fn requester() -> PartyId {
        PartyId::new("requester-1").unwrap()
    }

    fn categories() -> BTreeSet<RecordCategory> {
        BTreeSet::from([RecordCategory::LabResults])
    }

    fn refs() -> LedgerRefs {
        LedgerRefs {
            proof_ref: "hash-proof-0011223344556677".to_string(),
            proof_digest: ConsentDigest([0x01; 32]),
            audit_tx_ref: "local-tx-0011223344556677".to_string(),
            audit_script_ref: "0x0000000000000000000000000000000000000001".to_string(),
            audit_network_id: "local".to_string(),
        }
    }

    #[test]
    fn create_starts_pending_without_refs() {
        let store = RequestStore::new();
        let request = store
            .create(requester(), owner(), categories(), Some("checkup".into()))
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.approved_at.is_none());
        assert!(request.ledger_refs.is_none());
    }

    #[test]
    fn create_rejects_empty_categories() {
        let store = RequestStore::new();
        let err = store
            .create(requester(), owner(), BTreeSet::new(), None)
            .unwrap_err();
        assert_eq!(err, CreateError::EmptyCategories);
    }

    #[test]
    fn create_rejects_duplicate_pending_pair() {
        let store = RequestStore::new();
        store
            .create(requester(), owner(), categories(), None)
            .unwrap();
        let err = store
            .create(requester(), owner(), categories(), None)
            .unwrap_err();
        assert_eq!(err, CreateError::DuplicatePending);

        // A different requester for the same owner is fine.
        store
            .create(PartyId::new("requester-2").unwrap(), owner(), categories(), None)
            .unwrap();
    }

    #[test]
    fn resolved_pair_can_request_again() {
        let store = RequestStore::new();
        let first = store
            .create(requester(), owner(), categories(), None)
            .unwrap();
        store.reject(first.id, &owner()).unwrap();

        // The prior request is terminal, so the pair may try again.
        store
            .create(requester(), owner(), categories(), None)
            .unwrap();
    }

    #[test]
    fn approve_sets_refs_and_timestamp_atomically() {
        let store = RequestStore::new();
        let request = store
            .create(requester(), owner(), categories(), None)
            .unwrap();

        let approved = store
            .approve(request.id, &owner(), Timestamp::now(), refs())
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(approved.approved_at.is_some());
        assert!(approved.ledger_refs.is_some());
    }

    #[test]
    fn approve_by_wrong_owner_is_unauthorized() {
        let store = RequestStore::new();
        let request = store
            .create(requester(), owner(), categories(), None)
            .unwrap();

        let err = store
            .approve(
                request.id,
                &PartyId::new("impostor").unwrap(),
                Timestamp::now(),
                refs(),
            )
            .unwrap_err();
        assert_eq!(err, TransitionError::Unauthorized(request.id));
        // Status untouched.
        assert_eq!(store.get(request.id).unwrap().status, RequestStatus::Pending);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let store = RequestStore::new();
        let id = RequestId::new();
        assert_eq!(
            store.reject(id, &owner()).unwrap_err(),
            TransitionError::NotFound(id)
        );
    }

    #[test]
    fn reject_then_approve_is_invalid_transition() {
        let store = RequestStore::new();
        let request = store
            .create(requester(), owner(), categories(), None)
            .unwrap();

        store.reject(request.id, &owner()).unwrap();
        let err = store
            .approve(request.id, &owner(), Timestamp::now(), refs())
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                id: request.id,
                status: RequestStatus::Rejected,
            }
        );
    }

    #[test]
    fn approve_twice_has_exactly_one_winner() {
        let store = RequestStore::new();
        let request = store
            .create(requester(), owner(), categories(), None)
            .unwrap();

        store
            .approve(request.id, &owner(), Timestamp::now(), refs())
            .unwrap();
        let err = store
            .approve(request.id, &owner(), Timestamp::now(), refs())
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn concurrent_approve_and_reject_have_one_winner() {
        let store = Arc::new(RequestStore::new());
        let request = store
            .create(requester(), owner(), categories(), None)
            .unwrap();

        let approve_store = Arc::clone(&store);
        let approve_id = request.id;
        let approver = std::thread::spawn(move || {
            approve_store.approve(approve_id, &owner(), Timestamp::now(), refs())
        });

        let reject_store = Arc::clone(&store);
        let rejecter =
            std::thread::spawn(move || reject_store.reject(request.id, &owner()));

        let approve_result = approver.join().unwrap();
        let reject_result = rejecter.join().unwrap();

        // Exactly one side wins; the loser sees InvalidTransition.
        assert_ne!(approve_result.is_ok(), reject_result.is_ok());
        let loser_err = if approve_result.is_ok() {
            reject_result.unwrap_err()
        } else {
            approve_result.unwrap_err()
        };
        assert!(matches!(loser_err, TransitionError::InvalidTransition { .. }));

        // The stored status matches the winner.
        let status = store.get(request.id).unwrap().status;
        assert!(status.is_terminal());
    }

    #[test]
    fn list_pending_filters_by_owner_and_status() {
        let store = RequestStore::new();
        let r1 = store
            .create(requester(), owner(), categories(), None)
            .unwrap();
        store
            .create(
                PartyId::new("requester-2").unwrap(),
                PartyId::new("other-owner").unwrap(),
                categories(),
                None,
            )
            .unwrap();
        let r3 = store
            .create(PartyId::new("requester-3").unwrap(), owner(), categories(), None)
            .unwrap();
        store.reject(r3.id, &owner()).unwrap();

        let pending = store.list_pending_for_owner(&owner());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, r1.id);
    }
}
