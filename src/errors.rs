//! Library error types.
//!
//! The core surfaces three kinds of failure and never recovers from any
//! of them locally.  The enum implements
//! [`axum::response::IntoResponse`] so handlers can simply return
//! `Err(LibraryError::NotFound { .. })`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes).to_uppercase()
}

/// Errors produced while listing the library or resolving content.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The prefix holds neither sub-directories nor non-empty objects.
    /// An empty directory and a missing one are indistinguishable.
    #[error("directory doesn't exist: '{path}'")]
    NotFound { path: String },

    /// The file exists but has zero bytes.
    #[error("no content: '{path}'")]
    NoContent { path: String },

    /// The request path was rejected before reaching the library.
    #[error("invalid path: '{path}'")]
    InvalidPath { path: String },

    /// Transport, auth, or service error from the object store.
    #[error("storage failure: {0}")]
    StoreFailure(#[from] anyhow::Error),
}

impl LibraryError {
    /// Short machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            LibraryError::NotFound { .. } => "NotFound",
            LibraryError::NoContent { .. } => "NoContent",
            LibraryError::InvalidPath { .. } => "InvalidPath",
            LibraryError::StoreFailure(_) => "StoreFailure",
        }
    }

    /// Return the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LibraryError::NotFound { .. } => StatusCode::NOT_FOUND,
            LibraryError::NoContent { .. } => StatusCode::NOT_FOUND,
            LibraryError::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            LibraryError::StoreFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let request_id = generate_request_id();
        let status = self.status_code();

        tracing::warn!(
            request_id = %request_id,
            code = self.code(),
            status = status.as_u16(),
            "failed request: {}",
            self
        );

        (
            status,
            [
                ("content-type", "text/plain; charset=utf-8".to_string()),
                ("x-request-id", request_id),
            ],
            format!("{}: {}\n", self.code(), self),
        )
            .into_response()
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_format() {
        let id = generate_request_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_status_codes() {
        let not_found = LibraryError::NotFound {
            path: "a".to_string(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "NotFound");

        let invalid = LibraryError::InvalidPath {
            path: "../etc".to_string(),
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let failure = LibraryError::from(anyhow::anyhow!("connection refused"));
        assert_eq!(failure.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(failure.to_string(), "storage failure: connection refused");
    }

    #[test]
    fn test_into_response_sets_request_id() {
        let resp = LibraryError::NoContent {
            path: "empty.mp3".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().contains_key("x-request-id"));
    }
}
