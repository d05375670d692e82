//! Mapping between virtual library paths and object store keys.
//!
//! The whole library lives under a configured base prefix in the bucket:
//!
//!   Virtual path `Artist/Album`  ->  key `{base_prefix}Artist/Album`
//!   Listing prefix for a dir     ->  `{key}/` (empty for the bucket root)

use super::entry::DELIMITER;

/// Normalise a configured base prefix so that it ends with the
/// delimiter when non-empty.
pub fn normalize_base_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with(DELIMITER) {
        prefix.to_string()
    } else {
        format!("{prefix}{DELIMITER}")
    }
}

/// Join path elements with a single delimiter, dropping empty segments.
///
/// `join_path(&["music/", "a//b/"])` is `"music/a/b"`; all-empty input
/// yields `""`.
pub fn join_path(parts: &[&str]) -> String {
    let segments: Vec<&str> = parts
        .iter()
        .flat_map(|p| p.split(DELIMITER))
        .filter(|s| !s.is_empty())
        .collect();
    segments.join("/")
}

/// Converts between virtual paths and store keys for one base prefix.
#[derive(Debug, Clone, Default)]
pub struct KeyMapper {
    base_prefix: String,
}

impl KeyMapper {
    pub fn new(base_prefix: &str) -> Self {
        Self {
            base_prefix: normalize_base_prefix(base_prefix),
        }
    }

    pub fn base_prefix(&self) -> &str {
        &self.base_prefix
    }

    /// Store key for a virtual path.  May name an object or a prefix.
    pub fn to_store_key(&self, path: &str) -> String {
        join_path(&[&self.base_prefix, path])
    }

    /// Prefix to list one level under `path`.
    pub fn listing_prefix(&self, path: &str) -> String {
        let key = self.to_store_key(path);
        if key.is_empty() {
            key
        } else {
            format!("{key}{DELIMITER}")
        }
    }

    /// Virtual path for a store key or common prefix.
    pub fn to_virtual_path(&self, key: &str) -> String {
        key.strip_prefix(self.base_prefix.as_str())
            .unwrap_or(key)
            .trim_end_matches(DELIMITER)
            .to_string()
    }
}

// -- Tests -------------------------------------------------------------------
