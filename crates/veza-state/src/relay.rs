//! # Grant Relay Store
//!
//! Per-request bucket of payloads the owner has staged for the approved
//! counterparty. One row per `(request_id, file_ref)`; re-submission
//! overwrites (last-write-wins, no versioning); rows are cascade-deleted
//! with the parent request.
//!
//! Authorization is NOT enforced here — the consent layer checks request
//! status and caller identity before any push or pull reaches this store.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use veza_core::{RequestId, Timestamp};

/// A staged payload awaiting pickup by the approved counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantedPayload {
    /// The access request this payload belongs to.
    pub request_id: RequestId,
    /// Opaque file reference within the request's bucket.
    pub file_ref: String,
    /// The staged payload bytes, as submitted by the owner.
    pub payload: String,
    /// When this row was last written.
    pub updated_at: Timestamp,
}

/// In-memory grant relay store.
#[derive(Debug, Default)]
pub struct RelayStore {
    payloads: RwLock<HashMap<(RequestId, String), GrantedPayload>>,
}

impl RelayStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a payload, overwriting any prior row for the same key.
    pub fn put(&self, request_id: RequestId, file_ref: String, payload: String) -> GrantedPayload {
        let row = GrantedPayload {
            request_id,
            file_ref: file_ref.clone(),
            payload,
            updated_at: Timestamp::now(),
        };
        self.payloads
            .write()
            .insert((request_id, file_ref), row.clone());
        row
    }

    /// Fetch a staged payload.
    pub fn get(&self, request_id: RequestId, file_ref: &str) -> Option<GrantedPayload> {
        self.payloads
            .read()
            .get(&(request_id, file_ref.to_string()))
            .cloned()
    }

    /// Delete every row belonging to a request. Returns the number of
    /// rows removed. Called when the parent request is deleted.
    pub fn remove_request(&self, request_id: RequestId) -> usize {
        let mut payloads = self.payloads.write();
        let before = payloads.len();
        payloads.retain(|(rid, _), _| *rid != request_id);
        before - payloads.len()
    }

    /// Number of staged rows across all requests.
    pub fn len(&self) -> usize {
        self.payloads.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.payloads.read().is_empty()
    }
}
