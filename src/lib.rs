//! mediashelf library -- an S3-compatible bucket browsed as a music library.
//!
//! This crate maps a virtual directory hierarchy onto flat object keys,
//! classifies each listing into audio tracks, a cover image and other
//! files, and serves the result over HTTP.

pub mod classifier;
pub mod config;
pub mod errors;
pub mod library;
pub mod metrics;
pub mod render;
pub mod server;
pub mod storage;

use crate::config::Config;
use crate::library::MediaLibrary;

/// Shared application state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// The media library over the configured bucket.
    pub library: MediaLibrary,
    /// Random per-process segment of static asset URLs, so browsers never
    /// keep a stale player script across restarts.
    pub static_version: String,
}

impl AppState {
    pub fn new(config: Config, library: MediaLibrary) -> Self {
        Self {
            config,
            library,
            static_version: format!("{:x}", rand::random::<u64>()),
        }
    }
}
