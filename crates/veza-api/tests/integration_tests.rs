//! # Integration Tests for veza-api
//!
//! Exercises the consent pipeline end to end over HTTP: request creation,
//! approval with dual-ledger recording (reachable and unreachable
//! providers), the verified release gate, the grant relay, authentication
//! middleware, health probes, metrics, and the OpenAPI document.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use veza_api::auth::SecretString;
use veza_api::config::AppConfig;
use veza_api::state::AppState;
use veza_core::{PartyId, Timestamp};
use veza_crypto::{derive_envelope_key, Ed25519SignatureSource, SignatureSource};
use veza_state::LedgerRefs;

const OWNER: &str = "owner-wallet-1";
const REQUESTER: &str = "requester-wallet-1";

/// Build the test app with local providers and auth disabled, returning
/// the state for direct store access.
fn test_state_and_app() -> (AppState, Router) {
    let state = AppState::new();
    let app = veza_api::app(state.clone());
    (state, app)
}

fn test_app() -> Router {
    test_state_and_app().1
}

/// App whose providers point at a reserved TEST-NET-1 address, so every
/// provider call fails and approvals run the degrade path.
fn degraded_app_and_state() -> (AppState, Router) {
    let config = AppConfig {
        proof_service_url: Some("http://192.0.2.1:9".to_string()),
        audit_rpc_url: Some("http://192.0.2.1:9".to_string()),
        audit_network: "testnet".to_string(),
        audit_from: Some(format!("0x{}", "a".repeat(40))),
        provider_timeout: Duration::from_millis(250),
        ..AppConfig::default()
    };
    let state = AppState::from_config(config).unwrap();
    let app = veza_api::app(state.clone());
    (state, app)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Create a request over HTTP and return its id.
async fn create_request(app: &Router) -> Uuid {
    let response = send(
        app,
        post_json(
            "/access/request",
            serde_json::json!({
                "requesterId": REQUESTER,
                "ownerId": OWNER,
                "categories": ["lab-results"],
                "reason": "annual checkup"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["requestId"].as_str().unwrap().parse().unwrap()
}

/// Approve a request over HTTP and return the response body.
async fn approve(app: &Router, request_id: Uuid) -> serde_json::Value {
    let response = send(
        app,
        post_json(
            "/access/approve",
            serde_json::json!({ "requestId": request_id, "ownerId": OWNER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn liveness_probe() {
    let app = test_app();
    let response = send(
        &app,
        Request::builder()
            .uri("/health/liveness")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn readiness_probe() {
    let app = test_app();
    let response = send(
        &app,
        Request::builder()
            .uri("/health/readiness")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Request Creation ---------------------------------------------------------

#[tokio::test]
async fn create_then_pending_lists_the_request() {
    let app = test_app();
    let id = create_request(&app).await;

    let response = send(
        &app,
        Request::builder()
            .uri(&format!("/access/pending?owner={OWNER}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["requestId"].as_str().unwrap(), id.to_string());
    assert_eq!(requests[0]["status"], "pending");
    assert_eq!(requests[0]["categories"][0], "lab-results");
}

#[tokio::test]
async fn duplicate_pending_pair_returns_409() {
    let app = test_app();
    create_request(&app).await;

    let response = send(
        &app,
        post_json(
            "/access/request",
            serde_json::json!({
                "requesterId": REQUESTER,
                "ownerId": OWNER,
                "categories": ["imaging"]
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_body_returns_422() {
    let app = test_app();
    let response = send(
        &app,
        post_json("/access/request", serde_json::json!({"bogus": true})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- Approval -----------------------------------------------------------------

#[tokio::test]
async fn approve_with_local_providers_populates_both_ledgers() {
    let app = test_app();
    let id = create_request(&app).await;
    let body = approve(&app, id).await;

    // Local backends are stand-ins, so neither ledger is authoritative.
    assert_eq!(body["proof"]["isReal"], false);
    assert_eq!(body["audit"]["isReal"], false);
    assert!(body["proof"]["ref"]
        .as_str()
        .unwrap()
        .starts_with("hash-proof-"));
    assert_eq!(body["proof"]["digest"].as_str().unwrap().len(), 64);
    assert!(body["audit"]["ref"]
        .as_str()
        .unwrap()
        .starts_with("local-tx-"));
    assert_eq!(body["audit"]["network"], "local");
}

#[tokio::test]
async fn approve_by_wrong_owner_returns_404() {
    let app = test_app();
    let id = create_request(&app).await;

    let response = send(
        &app,
        post_json(
            "/access/approve",
            serde_json::json!({ "requestId": id, "ownerId": "impostor" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approve_twice_returns_400() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    let response = send(
        &app,
        post_json(
            "/access/approve",
            serde_json::json!({ "requestId": id, "ownerId": OWNER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reject_then_approve_returns_400() {
    let app = test_app();
    let id = create_request(&app).await;

    let response = send(
        &app,
        post_json(
            "/access/reject",
            serde_json::json!({ "requestId": id, "ownerId": OWNER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        post_json(
            "/access/approve",
            serde_json::json!({ "requestId": id, "ownerId": OWNER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Release Gate -------------------------------------------------------------

#[tokio::test]
async fn release_after_approval_returns_ciphertext_ref() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    let response = send(
        &app,
        post_json(
            "/access/release",
            serde_json::json!({ "requestId": id, "requesterId": REQUESTER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["ciphertextRef"].as_str().unwrap(),
        format!("records/{OWNER}/{id}.env")
    );
    assert_eq!(body["verification"]["proof"], true);
    assert_eq!(body["verification"]["audit"], true);
}

#[tokio::test]
async fn release_by_wrong_requester_returns_403() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    let response = send(
        &app,
        post_json(
            "/access/release",
            serde_json::json!({ "requestId": id, "requesterId": "someone-else" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn release_of_pending_request_returns_403() {
    let app = test_app();
    let id = create_request(&app).await;

    let response = send(
        &app,
        post_json(
            "/access/release",
            serde_json::json!({ "requestId": id, "requesterId": REQUESTER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn corrupted_persisted_digest_returns_403_with_reason() {
    let (state, app) = test_state_and_app();
    let id = create_request(&app).await;

    // Approve directly at the store with a digest that does not match the
    // request parameters, simulating a corrupted persisted row.
    let owner = PartyId::new(OWNER).unwrap();
    let refs = LedgerRefs {
        proof_ref: "hash-proof-0000000000000000".to_string(),
        proof_digest: veza_core::ConsentDigest([0xee; 32]),
        audit_tx_ref: format!("local-tx-{}", "ee".repeat(8)),
        audit_script_ref: format!("0x{}", "0".repeat(40)),
        audit_network_id: "local".to_string(),
    };
    state
        .requests
        .approve(veza_core::RequestId::from(id), &owner, Timestamp::now(), refs)
        .unwrap();

    let response = send(
        &app,
        post_json(
            "/access/release",
            serde_json::json!({ "requestId": id, "requesterId": REQUESTER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["reason"], "proof-verification-failed");
}

// -- Degraded End-to-End ------------------------------------------------------

#[tokio::test]
async fn unreachable_providers_still_approve_and_release() {
    let (_state, app) = degraded_app_and_state();
    let id = create_request(&app).await;

    // Approval succeeds with placeholder references on both ledgers.
    let body = approve(&app, id).await;
    assert_eq!(body["proof"]["isReal"], false);
    assert_eq!(body["audit"]["isReal"], false);
    assert!(body["proof"]["ref"]
        .as_str()
        .unwrap()
        .starts_with("degraded-proof-"));
    assert!(body["audit"]["ref"]
        .as_str()
        .unwrap()
        .starts_with("degraded-tx-"));
    assert_eq!(body["audit"]["network"], "testnet");

    // Release still passes: verification re-derives from persisted data,
    // not from live provider reachability.
    let response = send(
        &app,
        post_json(
            "/access/release",
            serde_json::json!({ "requestId": id, "requesterId": REQUESTER }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let release = body_json(response).await;
    assert_eq!(release["verification"]["proof"], true);
    assert_eq!(release["verification"]["audit"], true);
}

// -- Grant Relay --------------------------------------------------------------

#[tokio::test]
async fn grant_file_before_approval_returns_400() {
    let app = test_app();
    let id = create_request(&app).await;

    let response = send(
        &app,
        post_json(
            "/access/grant-file",
            serde_json::json!({
                "requestId": id,
                "fileRef": "labs/2026-02.pdf",
                "payload": "bytes",
                "ownerId": OWNER
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_stages_decrypted_payload_and_requester_pulls_it() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    // Owner side: derive the envelope key from a wallet signature,
    // decrypt the stored record, and stage the result for the requester.
    let wallet = Ed25519SignatureSource::generate();
    let key = derive_envelope_key(&wallet.sign_key_message().unwrap());
    let stored = key.encrypt(b"cholesterol panel: 182 mg/dL").unwrap();
    let decrypted = key.decrypt(&stored).unwrap();
    let payload = String::from_utf8(decrypted).unwrap();

    let response = send(
        &app,
        post_json(
            "/access/grant-file",
            serde_json::json!({
                "requestId": id,
                "fileRef": "labs/2026-02.pdf",
                "payload": payload,
                "ownerId": OWNER
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Requester side: pull the staged payload.
    let response = send(
        &app,
        Request::builder()
            .uri(&format!(
                "/access/view-granted-file?requestId={id}&fileRef=labs%2F2026-02.pdf&requesterId={REQUESTER}"
            ))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["payload"], "cholesterol panel: 182 mg/dL");
}

#[tokio::test]
async fn resubmission_overwrites_the_staged_payload() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    for version in ["v1", "v2"] {
        let response = send(
            &app,
            post_json(
                "/access/grant-file",
                serde_json::json!({
                    "requestId": id,
                    "fileRef": "f",
                    "payload": version,
                    "ownerId": OWNER
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(
        &app,
        Request::builder()
            .uri(&format!(
                "/access/view-granted-file?requestId={id}&fileRef=f&requesterId={REQUESTER}"
            ))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["payload"], "v2");
}

#[tokio::test]
async fn view_granted_file_by_wrong_requester_returns_403() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;
    send(
        &app,
        post_json(
            "/access/grant-file",
            serde_json::json!({
                "requestId": id,
                "fileRef": "f",
                "payload": "v",
                "ownerId": OWNER
            }),
        ),
    )
    .await;

    let response = send(
        &app,
        Request::builder()
            .uri(&format!(
                "/access/view-granted-file?requestId={id}&fileRef=f&requesterId=someone-else"
            ))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn view_of_missing_file_returns_404() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    let response = send(
        &app,
        Request::builder()
            .uri(&format!(
                "/access/view-granted-file?requestId={id}&fileRef=missing&requesterId={REQUESTER}"
            ))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Authentication -----------------------------------------------------------

fn authed_app(token: &str) -> Router {
    let config = AppConfig {
        auth_token: Some(SecretString::new(token)),
        ..AppConfig::default()
    };
    veza_api::app(AppState::from_config(config).unwrap())
}

#[tokio::test]
async fn missing_bearer_token_returns_401() {
    let app = authed_app("zone-token");
    let response = send(
        &app,
        post_json(
            "/access/request",
            serde_json::json!({
                "requesterId": REQUESTER,
                "ownerId": OWNER,
                "categories": ["lab-results"]
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_bearer_token_returns_401() {
    let app = authed_app("zone-token");
    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/access/request")
            .header("content-type", "application/json")
            .header("authorization", "Bearer not-the-token")
            .body(Body::from(
                serde_json::json!({
                    "requesterId": REQUESTER,
                    "ownerId": OWNER,
                    "categories": ["lab-results"]
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn correct_bearer_token_passes() {
    let app = authed_app("zone-token");
    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/access/request")
            .header("content-type", "application/json")
            .header("authorization", "Bearer zone-token")
            .body(Body::from(
                serde_json::json!({
                    "requesterId": REQUESTER,
                    "ownerId": OWNER,
                    "categories": ["lab-results"]
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_probes_skip_authentication() {
    let app = authed_app("zone-token");
    let response = send(
        &app,
        Request::builder()
            .uri("/health/liveness")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Metrics & OpenAPI --------------------------------------------------------

#[tokio::test]
async fn metrics_endpoint_reports_domain_gauges() {
    let app = test_app();
    let id = create_request(&app).await;
    approve(&app, id).await;

    let response = send(
        &app,
        Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains("veza_access_requests_total"));
    assert!(text.contains("veza_http_requests_total"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app();
    let response = send(
        &app,
        Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/access/approve"].is_object());
}
