//! # Access Request API
//!
//! Request creation, the owner's pending queue, approve/reject (the
//! consent orchestrator), and release (the verification gate).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use veza_consent::{ApprovalOutcome, ReleaseOutcome};
use veza_core::{PartyId, RecordCategory, RequestId};
use veza_state::AccessRequest;

use crate::error::{AppError, ErrorBody, VerificationFailureBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/access/request", post(create_request))
        .route("/access/pending", get(list_pending))
        .route("/access/approve", post(approve_request))
        .route("/access/reject", post(reject_request))
        .route("/access/release", post(release_request))
}

// ── DTOs ────────────────────────────────────────────────────────────────────

/// Request body for `POST /access/request`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessRequest {
    /// The counterparty asking for access.
    pub requester_id: String,
    /// The data subject being asked.
    pub owner_id: String,
    /// Requested record categories. Must be non-empty.
    #[schema(value_type = Vec<String>, example = json!(["lab-results"]))]
    pub categories: Vec<RecordCategory>,
    /// Optional free-text reason.
    pub reason: Option<String>,
}

impl Validate for CreateAccessRequest {
    fn validate(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("categories must be non-empty".to_string());
        }
        if self.requester_id.trim() == self.owner_id.trim() {
            return Err("requester and owner must differ".to_string());
        }
        if let Some(reason) = &self.reason {
            if reason.len() > 2000 {
                return Err("reason must not exceed 2000 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Response body for `POST /access/request`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessResponse {
    /// The new request's identifier.
    pub request_id: Uuid,
    /// Creation timestamp (ISO 8601, UTC).
    pub created_at: String,
}

/// Query parameters for `GET /access/pending`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PendingParams {
    /// The owner whose pending queue to list.
    pub owner: String,
}

/// Response body for `GET /access/pending`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingResponse {
    /// Pending requests addressed to the owner, oldest first.
    pub requests: Vec<AccessRequestView>,
}

/// Wire view of an access request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequestView {
    pub request_id: Uuid,
    pub requester_id: String,
    pub owner_id: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_proof_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_proof_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_audit_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_script_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_network_id: Option<String>,
}

impl From<AccessRequest> for AccessRequestView {
    fn from(request: AccessRequest) -> Self {
        let refs = request.ledger_refs;
        Self {
            request_id: *request.id.as_uuid(),
            requester_id: request.requester.to_string(),
            owner_id: request.owner.to_string(),
            categories: request
                .categories
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            reason: request.reason,
            status: request.status.as_str().to_string(),
            created_at: request.created_at.to_iso8601(),
            approved_at: request.approved_at.map(|ts| ts.to_iso8601()),
            private_proof_ref: refs.as_ref().map(|r| r.proof_ref.clone()),
            private_proof_digest: refs.as_ref().map(|r| r.proof_digest.to_hex()),
            public_audit_ref: refs.as_ref().map(|r| r.audit_tx_ref.clone()),
            audit_script_ref: refs.as_ref().map(|r| r.audit_script_ref.clone()),
            audit_network_id: refs.map(|r| r.audit_network_id),
        }
    }
}

/// Request body for `POST /access/approve` and `POST /access/reject`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// The request to decide.
    pub request_id: Uuid,
    /// The deciding owner.
    pub owner_id: String,
}

impl Validate for DecisionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.owner_id.trim().is_empty() {
            return Err("ownerId must be non-empty".to_string());
        }
        Ok(())
    }
}

/// Per-ledger proof reference in an approval response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProofRefView {
    /// Proof handle, or a degraded placeholder.
    #[serde(rename = "ref")]
    pub reference: String,
    /// The consent digest, as lowercase hex.
    pub digest: String,
    /// Whether the proof backend authoritatively recorded the proof.
    pub is_real: bool,
}

/// Per-ledger audit reference in an approval response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditRefView {
    /// Ledger transaction reference, or a degraded placeholder.
    #[serde(rename = "ref")]
    pub reference: String,
    /// The verification script address.
    pub script_ref: String,
    /// The audit network identifier.
    pub network: String,
    /// Whether the ledger authoritatively recorded the commitment.
    pub is_real: bool,
}

/// Response body for `POST /access/approve`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveResponse {
    pub request_id: Uuid,
    pub proof: ProofRefView,
    pub audit: AuditRefView,
}

impl From<ApprovalOutcome> for ApproveResponse {
    fn from(outcome: ApprovalOutcome) -> Self {
        Self {
            request_id: *outcome.request_id.as_uuid(),
            proof: ProofRefView {
                reference: outcome.proof.proof_ref,
                digest: outcome.proof.digest.to_hex(),
                is_real: outcome.proof.is_real,
            },
            audit: AuditRefView {
                reference: outcome.audit.tx_ref,
                script_ref: outcome.audit.script_ref,
                network: outcome.audit.network_id,
                is_real: outcome.audit.is_real,
            },
        }
    }
}

/// Response body for `POST /access/reject`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectResponse {
    pub request_id: Uuid,
}

/// Request body for `POST /access/release`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    /// The approved request to release against.
    pub request_id: Uuid,
    /// The counterparty asking for the ciphertext reference.
    pub requester_id: String,
}

impl Validate for ReleaseRequest {
    fn validate(&self) -> Result<(), String> {
        if self.requester_id.trim().is_empty() {
            return Err("requesterId must be non-empty".to_string());
        }
        Ok(())
    }
}

/// Verification flags in a release response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationView {
    /// Proof digest re-verification result.
    pub proof: bool,
    /// Audit commitment check result.
    pub audit: bool,
}

/// Response body for `POST /access/release`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResponse {
    pub request_id: Uuid,
    /// Blob-store key of the encrypted payload envelope.
    pub ciphertext_ref: String,
    pub verification: VerificationView,
}

impl From<ReleaseOutcome> for ReleaseResponse {
    fn from(outcome: ReleaseOutcome) -> Self {
        Self {
            request_id: *outcome.request_id.as_uuid(),
            ciphertext_ref: outcome.ciphertext_ref,
            verification: VerificationView {
                proof: outcome.proof_verified,
                audit: outcome.audit_verified,
            },
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// POST /access/request — Create an access request.
#[utoipa::path(
    post,
    path = "/access/request",
    request_body = CreateAccessRequest,
    responses(
        (status = 200, description = "Request created", body = CreateAccessResponse),
        (status = 409, description = "Duplicate pending request for this pair", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "access"
)]
async fn create_request(
    State(state): State<AppState>,
    body: Result<Json<CreateAccessRequest>, JsonRejection>,
) -> Result<Json<CreateAccessResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let requester = PartyId::new(&req.requester_id)?;
    let owner = PartyId::new(&req.owner_id)?;
    let categories = req.categories.into_iter().collect();

    let request = state
        .requests
        .create(requester, owner, categories, req.reason)?;

    tracing::info!(
        request_id = %request.id,
        requester = %request.requester,
        owner = %request.owner,
        "access request created"
    );

    Ok(Json(CreateAccessResponse {
        request_id: *request.id.as_uuid(),
        created_at: request.created_at.to_iso8601(),
    }))
}

/// GET /access/pending — The owner's pending queue.
#[utoipa::path(
    get,
    path = "/access/pending",
    params(("owner" = String, Query, description = "Owner identity")),
    responses(
        (status = 200, description = "Pending requests", body = PendingResponse),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "access"
)]
async fn list_pending(
    State(state): State<AppState>,
    Query(params): Query<PendingParams>,
) -> Result<Json<PendingResponse>, AppError> {
    let owner = PartyId::new(&params.owner)?;
    let requests = state
        .requests
        .list_pending_for_owner(&owner)
        .into_iter()
        .map(AccessRequestView::from)
        .collect();
    Ok(Json(PendingResponse { requests }))
}

/// POST /access/approve — Approve a pending request as its owner.
///
/// Fires the consent orchestrator: private proof, public audit, then one
/// atomic state transition. Per-ledger `isReal` flags distinguish
/// authoritative results from degraded placeholders so callers can warn
/// the counterparty that consent is only locally attested.
#[utoipa::path(
    post,
    path = "/access/approve",
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Approved", body = ApproveResponse),
        (status = 400, description = "Request is not pending", body = ErrorBody),
        (status = 404, description = "Unknown request or wrong owner", body = ErrorBody),
    ),
    tag = "access"
)]
async fn approve_request(
    State(state): State<AppState>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<ApproveResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let owner = PartyId::new(&req.owner_id)?;

    let outcome = state
        .orchestrator
        .approve(RequestId::from(req.request_id), &owner)
        .await?;
    Ok(Json(ApproveResponse::from(outcome)))
}

/// POST /access/reject — Reject a pending request as its owner.
#[utoipa::path(
    post,
    path = "/access/reject",
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Rejected", body = RejectResponse),
        (status = 400, description = "Request is not pending", body = ErrorBody),
        (status = 404, description = "Unknown request or wrong owner", body = ErrorBody),
    ),
    tag = "access"
)]
async fn reject_request(
    State(state): State<AppState>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<RejectResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let owner = PartyId::new(&req.owner_id)?;

    let rejected = state
        .orchestrator
        .reject(RequestId::from(req.request_id), &owner)
        .await?;
    Ok(Json(RejectResponse {
        request_id: *rejected.id.as_uuid(),
    }))
}

/// POST /access/release — Release a ciphertext reference to the approved
/// counterparty.
///
/// Both ledger references are re-verified against the persisted digest
/// before anything is returned. Failures are 403 with a flat
/// machine-readable `{"reason"}` body.
#[utoipa::path(
    post,
    path = "/access/release",
    request_body = ReleaseRequest,
    responses(
        (status = 200, description = "Released", body = ReleaseResponse),
        (status = 403, description = "Denied or verification failed", body = VerificationFailureBody),
    ),
    tag = "access"
)]
async fn release_request(
    State(state): State<AppState>,
    body: Result<Json<ReleaseRequest>, JsonRejection>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let requester = PartyId::new(&req.requester_id)?;

    let outcome = state
        .gate
        .release(RequestId::from(req.request_id), &requester)
        .await?;
    Ok(Json(ReleaseResponse::from(outcome)))
}
