//! Prometheus metrics for mediashelf.
//!
//! Installs a global Prometheus recorder using `metrics-exporter-prometheus`,
//! defines metric name constants, provides an axum middleware for HTTP RED
//! metrics, and exposes the `/metrics` endpoint handler.

use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

// -- Metric name constants ----------------------------------------------------

/// Total HTTP requests (counter). Labels: method, path, status.
pub const HTTP_REQUESTS_TOTAL: &str = "mediashelf_http_requests_total";

/// HTTP request duration in seconds (histogram). Labels: method, path.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "mediashelf_http_request_duration_seconds";

/// Directory listings served (counter). Labels: status.
pub const LISTINGS_TOTAL: &str = "mediashelf_listings_total";

/// Listings that had to search artwork sub-directories for a cover (counter).
pub const ARTWORK_FALLBACK_TOTAL: &str = "mediashelf_artwork_fallback_total";

/// Content URLs issued (counter). Labels: status.
pub const CONTENT_URLS_TOTAL: &str = "mediashelf_content_urls_total";

// -- Global recorder installation ---------------------------------------------

/// Singleton handle to the Prometheus recorder.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus metrics recorder. Idempotent.
pub fn init_metrics() -> anyhow::Result<&'static PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle);
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle))
}

/// Register metric descriptions with the global recorder. Call once after
/// `init_metrics()`.
pub fn describe_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_counter!(LISTINGS_TOTAL, "Directory listings by outcome");
    describe_counter!(
        ARTWORK_FALLBACK_TOTAL,
        "Listings that searched artwork directories for a cover"
    );
    describe_counter!(CONTENT_URLS_TOTAL, "Content URLs issued by outcome");
}

// -- Metrics middleware -------------------------------------------------------

/// Axum middleware that records HTTP RED metrics for every request.
///
/// Excludes `/metrics` from self-instrumentation to avoid feedback loops.
pub async fn metrics_middleware(
    req: Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Response {
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    if req.uri().path() == "/metrics" {
        return next.run(req).await;
    }

    let start = Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

// -- Path normalization -------------------------------------------------------

/// Normalize a request path to a route template for metric labels.
///
/// Library paths are unbounded, so only the route prefix is kept:
/// - `/library/Artist/Album` -> `/library/{path}`
/// - `/api/library/` -> `/api/library/{path}`
/// - `/stream/Artist/01.mp3` -> `/stream/{path}`
/// - anything unknown -> `/{other}`
fn normalize_path(path: &str) -> String {
    const ROUTES: &[&str] = &["/api/library/", "/library/", "/stream/", "/static/"];

    match path {
        "/" | "/health" | "/metrics" => path.to_string(),
        _ => ROUTES
            .iter()
            .find(|route| path.starts_with(*route) || path == route.trim_end_matches('/'))
            .map(|route| format!("{route}{{path}}"))
            .unwrap_or_else(|| "/{other}".to_string()),
    }
}

// -- Metrics endpoint handler -------------------------------------------------

/// `GET /metrics` -- Render Prometheus exposition format text.
pub async fn metrics_handler() -> Response {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled\n").into_response(),
    }
}

// -- Tests --------------------------------------------------------------------
