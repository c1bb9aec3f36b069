//! # Grant Relay API
//!
//! Owner-side payload staging and counterparty pickup. Push requires an
//! approved request and the caller to be its owner; pull uses the same
//! authorization check as the release gate.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use veza_core::{PartyId, RequestId};

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/access/grant-file", post(grant_file))
        .route("/access/view-granted-file", get(view_granted_file))
}

/// Request body for `POST /access/grant-file`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantFileRequest {
    /// The approved request whose bucket to stage into.
    pub request_id: Uuid,
    /// Opaque file reference within the bucket.
    pub file_ref: String,
    /// The payload bytes, as produced by the owner's local decryption.
    pub payload: String,
    /// The staging owner.
    pub owner_id: String,
}

impl Validate for GrantFileRequest {
    fn validate(&self) -> Result<(), String> {
        if self.file_ref.trim().is_empty() {
            return Err("fileRef must be non-empty".to_string());
        }
        if self.file_ref.len() > 512 {
            return Err("fileRef must not exceed 512 characters".to_string());
        }
        if self.payload.is_empty() {
            return Err("payload must be non-empty".to_string());
        }
        Ok(())
    }
}

/// Response body for `POST /access/grant-file`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantFileResponse {
    pub request_id: Uuid,
    pub file_ref: String,
    /// When the row was written (ISO 8601, UTC).
    pub updated_at: String,
}

/// Query parameters for `GET /access/view-granted-file`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewGrantedFileParams {
    /// The request whose bucket to read.
    pub request_id: Uuid,
    /// The file reference to fetch.
    pub file_ref: String,
    /// The pulling counterparty.
    pub requester_id: String,
}

/// Response body for `GET /access/view-granted-file`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewGrantedFileResponse {
    pub request_id: Uuid,
    pub file_ref: String,
    /// The staged payload bytes.
    pub payload: String,
}

/// POST /access/grant-file — Stage a payload for the counterparty.
///
/// Re-submission for the same `(request, fileRef)` overwrites the prior
/// payload — last write wins, no versioning.
#[utoipa::path(
    post,
    path = "/access/grant-file",
    request_body = GrantFileRequest,
    responses(
        (status = 200, description = "Payload staged", body = GrantFileResponse),
        (status = 400, description = "Request is not approved", body = ErrorBody),
        (status = 404, description = "Unknown request or wrong owner", body = ErrorBody),
    ),
    tag = "relay"
)]
async fn grant_file(
    State(state): State<AppState>,
    body: Result<Json<GrantFileRequest>, JsonRejection>,
) -> Result<Json<GrantFileResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let owner = PartyId::new(&req.owner_id)?;

    let row = state.relay.push(
        RequestId::from(req.request_id),
        &owner,
        req.file_ref,
        req.payload,
    )?;

    Ok(Json(GrantFileResponse {
        request_id: *row.request_id.as_uuid(),
        file_ref: row.file_ref,
        updated_at: row.updated_at.to_iso8601(),
    }))
}

/// GET /access/view-granted-file — Pick up a staged payload.
#[utoipa::path(
    get,
    path = "/access/view-granted-file",
    params(
        ("requestId" = Uuid, Query, description = "Request identifier"),
        ("fileRef" = String, Query, description = "File reference"),
        ("requesterId" = String, Query, description = "Requester identity"),
    ),
    responses(
        (status = 200, description = "Staged payload", body = ViewGrantedFileResponse),
        (status = 403, description = "Not the approved requester", body = ErrorBody),
        (status = 404, description = "No payload under this file reference", body = ErrorBody),
    ),
    tag = "relay"
)]
async fn view_granted_file(
    State(state): State<AppState>,
    Query(params): Query<ViewGrantedFileParams>,
) -> Result<Json<ViewGrantedFileResponse>, AppError> {
    let requester = PartyId::new(&params.requester_id)?;

    let row = state.relay.pull(
        RequestId::from(params.request_id),
        &requester,
        &params.file_ref,
    )?;

    Ok(Json(ViewGrantedFileResponse {
        request_id: *row.request_id.as_uuid(),
        file_ref: row.file_ref,
        payload: row.payload,
    }))
}
