//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Domain-level gauges (requests by status, degraded
//! consents, staged relay payloads) are updated on each `/metrics`
//! scrape (pull model) — see the metrics handler in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use prometheus::{
    Encoder, Gauge, GaugeVec, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    access_requests_total: GaugeVec,
    degraded_consents_total: Gauge,
    relay_payloads_total: Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiMetrics")
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("veza_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "veza_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("veza_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let access_requests_total = GaugeVec::new(
            Opts::new("veza_access_requests_total", "Access requests by status"),
            &["status"],
        )
        .expect("metric can be created");

        let degraded_consents_total = Gauge::new(
            "veza_degraded_consents_total",
            "Approved requests whose proof or audit reference is a degraded placeholder",
        )
        .expect("metric can be created");

        let relay_payloads_total = Gauge::new(
            "veza_relay_payloads_total",
            "Payloads currently staged in the grant relay",
        )
        .expect("metric can be created");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(access_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(degraded_consents_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(relay_payloads_total.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                access_requests_total,
                degraded_consents_total,
                relay_payloads_total,
            }),
        }
    }

    /// Gauge of access requests by status.
    pub fn access_requests_total(&self) -> &GaugeVec {
        &self.inner.access_requests_total
    }

    /// Gauge of approvals carrying degraded placeholder references.
    pub fn degraded_consents_total(&self) -> &Gauge {
        &self.inner.degraded_consents_total
    }

    /// Gauge of currently staged relay payloads.
    pub fn relay_payloads_total(&self) -> &Gauge {
        &self.inner.relay_payloads_total
    }

    /// Gather and encode all metrics in Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buf = Vec::new();
        encoder
            .encode(&families, &mut buf)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buf).map_err(|e| e.to_string())
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Record request count, duration, and error status for every request.
pub async fn metrics_middleware(
    Extension(metrics): Extension<ApiMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics
        .inner
        .http_requests_total
        .with_label_values(&[&method, &path, &status])
        .inc();
    metrics
        .inner
        .http_request_duration_seconds
        .with_label_values(&[&method, &path])
        .observe(start.elapsed().as_secs_f64());
    if response.status().is_client_error() || response.status().is_server_error() {
        metrics
            .inner
            .http_errors_total
            .with_label_values(&[&method, &path, &status])
            .inc();
    }

    response
}
