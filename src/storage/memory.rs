//! In-memory storage backend used as the bucket stand-in in tests.
//!
//! Object sizes are held in a `BTreeMap` so listings come back in key
//! order, the same order S3 uses.  Only sizes are kept: the library
//! never reads object bodies, it hands out URLs instead.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use std::time::Duration;

use super::backend::{Listing, ObjectEntry, StorageBackend};

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// key -> size in bytes.
    objects: RwLock<BTreeMap<String, u64>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend pre-populated with `(key, size)` pairs.
    pub fn with_objects<I, K>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let backend = Self::new();
        for (key, size) in objects {
            backend.insert(key, size);
        }
        backend
    }

    /// Insert or replace an object.
    pub fn insert(&self, key: impl Into<String>, size: u64) {
        self.objects
            .write()
            .expect("rwlock poisoned")
            .insert(key.into(), size);
    }

    fn list_sync(&self, prefix: &str) -> Listing {
        let objects = self.objects.read().expect("rwlock poisoned");
        let mut prefixes = BTreeSet::new();
        let mut entries = Vec::new();

        for (key, size) in objects.range(prefix.to_string()..) {
            let Some(after_prefix) = key.strip_prefix(prefix) else {
                break;
            };
            match after_prefix.find('/') {
                Some(pos) => {
                    prefixes.insert(format!("{}{}/", prefix, &after_prefix[..pos]));
                }
                None => entries.push(ObjectEntry {
                    key: key.clone(),
                    size: *size,
                }),
            }
        }

        Listing {
            prefixes: prefixes.into_iter().collect(),
            objects: entries,
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn list_one_level(
        &self,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Listing>> + Send + '_>> {
        let prefix = prefix.to_string();
        Box::pin(async move {
            tracing::debug!("memory list: prefix='{}'", prefix);
            Ok(self.list_sync(&prefix))
        })
    }

    fn object_size(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<u64>>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let objects = self.objects.read().expect("rwlock poisoned");
            Ok(objects.get(&key).copied())
        })
    }

    fn presign_get(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            if !self.objects.read().expect("rwlock poisoned").contains_key(&key) {
                anyhow::bail!("Object not found at key: {key}");
            }
            let encoded = percent_encoding::utf8_percent_encode(&key, super::KEY_ENCODE_SET);
            Ok(format!(
                "memory:///{encoded}?X-Amz-Expires={}",
                ttl.as_secs()
            ))
        })
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::with_objects([
            ("file1.jpg", 1),
            ("empty", 0),
            ("dir1/file2.jpg", 2),
            ("dir1/empty", 0),
            ("dir2/file3.jpg", 3),
            ("dir2/dir22/file4.jpg", 4),
            ("dir10/x.mp3", 5),
        ])
    }

    #[tokio::test]
    async fn test_list_root() {
        let listing = backend().list_one_level("").await.unwrap();
        assert_eq!(listing.prefixes, vec!["dir1/", "dir10/", "dir2/"]);
        let keys: Vec<&str> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["empty", "file1.jpg"]);
    }

    #[tokio::test]
    async fn test_list_nested_prefix() {
        let listing = backend().list_one_level("dir2/").await.unwrap();
        assert_eq!(listing.prefixes, vec!["dir2/dir22/"]);
        assert_eq!(
            listing.objects,
            vec![ObjectEntry {
                key: "dir2/file3.jpg".to_string(),
                size: 3
            }]
        );
    }

    #[tokio::test]
    async fn test_list_prefix_does_not_match_sibling() {
        // "dir1/" must not pick up "dir10/x.mp3".
        let listing = backend().list_one_level("dir1/").await.unwrap();
        assert!(listing.prefixes.is_empty());
        assert_eq!(listing.objects.len(), 2);
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let listing = backend().list_one_level("dir3/").await.unwrap();
        assert_eq!(listing, Listing::default());
    }

    #[tokio::test]
    async fn test_object_size() {
        let b = backend();
        assert_eq!(b.object_size("dir2/dir22/file4.jpg").await.unwrap(), Some(4));
        assert_eq!(b.object_size("empty").await.unwrap(), Some(0));
        assert_eq!(b.object_size("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_presign_get() {
        let b = backend();
        let url = b
            .presign_get("dir1/file2.jpg", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "memory:///dir1/file2.jpg?X-Amz-Expires=60");
        assert!(b.presign_get("missing", Duration::from_secs(60)).await.is_err());
    }

    #[tokio::test]
    async fn test_insert_replaces_size() {
        let b = MemoryBackend::new();
        b.insert("a/b.mp3", 10);
        b.insert("a/b.mp3", 0);
        assert_eq!(b.object_size("a/b.mp3").await.unwrap(), Some(0));
    }
}
