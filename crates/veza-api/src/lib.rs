//! # veza-api — Axum API for the Veza Consent Pipeline
//!
//! HTTP surface over the consent pipeline: access request lifecycle,
//! approval with dual-ledger recording, the verified release gate, and
//! the grant relay.
//!
//! ## API Surface
//!
//! | Route                         | Module            | Operation        |
//! |-------------------------------|-------------------|------------------|
//! | `POST /access/request`        | [`routes::access`]| Create request   |
//! | `GET  /access/pending`        | [`routes::access`]| Owner queue      |
//! | `POST /access/approve`        | [`routes::access`]| Approve + record |
//! | `POST /access/reject`         | [`routes::access`]| Reject           |
//! | `POST /access/release`        | [`routes::access`]| Verified release |
//! | `POST /access/grant-file`     | [`routes::relay`] | Relay push       |
//! | `GET  /access/view-granted-file` | [`routes::relay`] | Relay pull    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Health probes (`/health/*`) and `/metrics` are mounted outside the
//! auth middleware so they remain accessible without credentials.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use veza_state::RequestStatus;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    // Authenticated API routes.
    //
    // Body size limit: 2 MiB, which bounds relay payload submissions.
    // Auth runs after metrics so rejected requests still show up in the
    // request counters.
    let mut api = Router::new()
        .merge(routes::access::router())
        .merge(routes::relay::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn(auth::auth_middleware));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated health probes and metrics scrape endpoint.
    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus scrape endpoint.
///
/// Updates domain gauges from current `AppState` on each scrape (pull
/// model), then encodes the registry in text exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    // Access requests by status, plus degraded-consent count.
    let requests = state.requests.list();
    let mut pending = 0usize;
    let mut approved = 0usize;
    let mut rejected = 0usize;
    let mut degraded = 0usize;
    for request in &requests {
        match request.status {
            RequestStatus::Pending => pending += 1,
            RequestStatus::Approved => approved += 1,
            RequestStatus::Rejected => rejected += 1,
        }
        if let Some(refs) = &request.ledger_refs {
            if refs
                .proof_ref
                .starts_with(veza_consent::DEGRADED_PROOF_PREFIX)
                || refs.audit_tx_ref.starts_with(veza_consent::DEGRADED_TX_PREFIX)
            {
                degraded += 1;
            }
        }
    }
    metrics.access_requests_total().reset();
    metrics
        .access_requests_total()
        .with_label_values(&["pending"])
        .set(pending as f64);
    metrics
        .access_requests_total()
        .with_label_values(&["approved"])
        .set(approved as f64);
    metrics
        .access_requests_total()
        .with_label_values(&["rejected"])
        .set(rejected as f64);
    metrics.degraded_consents_total().set(degraded as f64);
    metrics
        .relay_payloads_total()
        .set(state.relay_store.len() as f64);

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application can serve traffic.
///
/// Checks that the stores are accessible and, when a fallback key is
/// configured, that it loaded.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Stores accessible (read lock acquirable).
    let _ = state.requests.len();
    let _ = state.relay_store.len();

    // Fallback key configured implies it parsed at startup; double-check
    // the Arc is populated rather than assuming.
    if state.config.fallback_key.is_none() && std::env::var("VEZA_FALLBACK_KEY_HEX").is_ok() {
        return (StatusCode::SERVICE_UNAVAILABLE, "fallback key degraded").into_response();
    }

    (StatusCode::OK, "ready").into_response()
}
