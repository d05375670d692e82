//! Configuration loading and types for mediashelf.
//!
//! Configuration is read from a YAML file and deserialized into the
//! [`Config`] struct.  Each subsection governs a different part of the
//! system: networking, the backing bucket, classification rules,
//! logging, and observability.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::classifier::{
    DEFAULT_ARTWORK_DIRS, DEFAULT_AUDIO_EXTENSIONS, DEFAULT_COVER_NAMES, DEFAULT_IMAGE_EXTENSIONS,
};
use crate::storage::keys::normalize_base_prefix;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Object storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Media classification rules.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable Prometheus metrics collection and `/metrics` endpoint.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { metrics: true }
    }
}

/// Object storage backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend type; only `s3` is supported.
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// S3 bucket configuration.
    #[serde(default)]
    pub s3: S3Config,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            s3: S3Config::default(),
        }
    }
}

/// S3 bucket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// Bucket holding the library.
    #[serde(default)]
    pub bucket: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom S3-compatible endpoint (e.g. MinIO, LocalStack).
    #[serde(default)]
    pub endpoint_url: String,
    /// Force path-style URL addressing.
    #[serde(default)]
    pub use_path_style: bool,
    /// Key prefix the library is rooted at.  Ends with `/` after loading.
    #[serde(default)]
    pub base_prefix: String,
    /// Explicit access key (falls back to env/credential chain).
    #[serde(alias = "id", default)]
    pub access_key_id: String,
    /// Explicit secret key (falls back to env/credential chain).
    #[serde(alias = "secret", default)]
    pub secret_access_key: String,
    /// Optional session token for temporary credentials.
    #[serde(alias = "token", default)]
    pub session_token: String,
    /// Lifetime of presigned content URLs, in seconds.
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            endpoint_url: String::new(),
            use_path_style: false,
            base_prefix: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
            presign_expiry_secs: default_presign_expiry_secs(),
        }
    }
}

impl S3Config {
    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }
}

/// Filename rules used to classify a listing.  Matching is case-insensitive.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Extensions of audio tracks.
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
    /// Extensions of images considered as covers.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    /// Cover file stems, matched exactly or as a substring.
    #[serde(default = "default_cover_names")]
    pub cover_names: Vec<String>,
    /// Sub-directory names searched when a directory has no cover.
    #[serde(default = "default_artwork_dirs")]
    pub artwork_dirs: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            audio_extensions: default_audio_extensions(),
            image_extensions: default_image_extensions(),
            cover_names: default_cover_names(),
            artwork_dirs: default_artwork_dirs(),
        }
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_storage_backend() -> String {
    "s3".to_string()
}

fn default_presign_expiry_secs() -> u64 {
    2 * 60 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_audio_extensions() -> Vec<String> {
    to_strings(DEFAULT_AUDIO_EXTENSIONS)
}

fn default_image_extensions() -> Vec<String> {
    to_strings(DEFAULT_IMAGE_EXTENSIONS)
}

fn default_cover_names() -> Vec<String> {
    to_strings(DEFAULT_COVER_NAMES)
}

fn default_artwork_dirs() -> Vec<String> {
    to_strings(DEFAULT_ARTWORK_DIRS)
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_config(&contents)
}

/// Parse YAML configuration, then validate and normalise it.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    // An empty document deserializes to `null`; treat it as all defaults.
    let mut config: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(contents)?
    };

    match config.storage.backend.as_str() {
        "s3" => {
            if config.storage.s3.bucket.is_empty() {
                anyhow::bail!("s3 bucket is required");
            }
        }
        other => anyhow::bail!("unknown storage backend '{other}' (expected s3)"),
    }
    if config.storage.s3.presign_expiry_secs == 0 {
        anyhow::bail!("s3.presign_expiry_secs must be greater than zero");
    }

    config.storage.s3.base_prefix = normalize_base_prefix(&config.storage.s3.base_prefix);
    Ok(config)
}

// -- Tests -------------------------------------------------------------------
