//! # OpenAPI Document
//!
//! OpenAPI spec generated from the utoipa annotations on route handlers,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes::{access, relay};
use crate::state::AppState;

/// The assembled OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Veza Consent API",
        description = "Consent-gated release of encrypted personal records, \
                       recorded on a private proof ledger and a public audit ledger."
    ),
    paths(
        access::create_request,
        access::list_pending,
        access::approve_request,
        access::reject_request,
        access::release_request,
        relay::grant_file,
        relay::view_granted_file,
    ),
    components(schemas(
        access::CreateAccessRequest,
        access::CreateAccessResponse,
        access::PendingResponse,
        access::AccessRequestView,
        access::DecisionRequest,
        access::ApproveResponse,
        access::ProofRefView,
        access::AuditRefView,
        access::RejectResponse,
        access::ReleaseRequest,
        access::ReleaseResponse,
        access::VerificationView,
        relay::GrantFileRequest,
        relay::GrantFileResponse,
        relay::ViewGrantedFileResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::error::VerificationFailureBody,
    )),
    tags(
        (name = "access", description = "Access request lifecycle and release gate"),
        (name = "relay", description = "Grant relay push/pull"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
