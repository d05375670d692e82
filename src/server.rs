//! Axum router construction.
//!
//! The [`app`] function wires the library pages, the JSON listing API,
//! the stream redirects and the versioned player asset to their handlers
//! and returns a ready-to-serve [`axum::Router`].
//!
//! Paths reach the library already decoded, with surrounding
//! delimiters trimmed, and free of `./` traversal sequences.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::errors::{generate_request_id, LibraryError};
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::render::{render_listing, PLAYER_JS};
use crate::AppState;

/// Build the axum [`Router`] with all library routes.
pub fn app(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/", get(redirect_to_library))
        .route("/library", get(redirect_to_library))
        .route("/library/", get(handle_listing_page))
        .route("/library/*path", get(handle_listing_page))
        .route("/api/library/", get(handle_listing_json))
        .route("/api/library/*path", get(handle_listing_json))
        .route("/stream/*path", get(handle_stream))
        .route("/static/:version/*file", get(handle_static));

    if state.config.observability.metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .with_state(state)
        // Layer ordering: inner layers run first, outer layers wrap them.
        .layer(middleware::from_fn(path_guard_middleware))
        .layer(middleware::from_fn(common_headers_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

// -- Middleware ----------------------------------------------------------------

/// Reject request paths that try to climb out of the library.
async fn path_guard_middleware(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, LibraryError> {
    let decoded = percent_encoding::percent_decode_str(req.uri().path())
        .decode_utf8_lossy()
        .into_owned();
    if decoded.contains("./") || decoded.contains(".\\") {
        return Err(LibraryError::InvalidPath { path: decoded });
    }
    Ok(next.run(req).await)
}

/// Add `x-request-id`, `Date` and `Server` headers to every response.
async fn common_headers_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    // Error responses carry their own request id.
    if !headers.contains_key("x-request-id") {
        if let Ok(value) = HeaderValue::from_str(&generate_request_id()) {
            headers.insert("x-request-id", value);
        }
    }

    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    if let Ok(value) = HeaderValue::from_str(&date) {
        headers.insert(header::DATE, value);
    }
    headers.insert(header::SERVER, HeaderValue::from_static("mediashelf"));

    response
}

// -- Handlers ------------------------------------------------------------------

/// Turn an optional wildcard capture into a delimiter-clean virtual path.
fn virtual_path(path: Option<Path<String>>) -> String {
    path.map(|Path(p)| p.trim_matches('/').to_string())
        .unwrap_or_default()
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        r#"{"status":"ok"}"#,
    )
}

async fn redirect_to_library() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/library/")])
}

/// `GET /library/*path` -- HTML listing page.
async fn handle_listing_page(
    State(state): State<Arc<AppState>>,
    path: Option<Path<String>>,
) -> Result<Response, LibraryError> {
    let path = virtual_path(path);
    debug!("listing page: '{}'", path);
    let listing = state.library.list(&path).await?;
    Ok(Html(render_listing(&listing, &state.static_version)).into_response())
}

/// `GET /api/library/*path` -- listing as JSON.
async fn handle_listing_json(
    State(state): State<Arc<AppState>>,
    path: Option<Path<String>>,
) -> Result<Response, LibraryError> {
    let path = virtual_path(path);
    debug!("listing json: '{}'", path);
    let listing = state.library.list(&path).await?;
    Ok(Json(listing).into_response())
}

/// `GET /stream/*path` -- redirect to a presigned content URL.
async fn handle_stream(
    State(state): State<Arc<AppState>>,
    path: Option<Path<String>>,
) -> Result<Response, LibraryError> {
    let path = virtual_path(path);
    let url = state.library.content_url(&path).await?;
    debug!("stream redirect: '{}'", path);
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// `GET /static/{version}/*file` -- embedded assets.
///
/// Only the current version is served, and directory paths never list
/// their contents.
async fn handle_static(
    State(state): State<Arc<AppState>>,
    Path((version, file)): Path<(String, String)>,
) -> Response {
    if version != state.static_version || file.is_empty() || file.ends_with('/') {
        return StatusCode::NOT_FOUND.into_response();
    }
    match file.trim_start_matches('/') {
        "player.js" => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
                (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
            ],
            PLAYER_JS,
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

// -- Tests -------------------------------------------------------------------
