//! Abstract object store contract.
//!
//! Every storage backend must implement [`StorageBackend`].  The trait
//! speaks raw store keys; mapping to virtual paths happens one layer up
//! in [`super::bucket::BucketStore`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// One object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full store key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// One level of a delimiter listing, with every page already collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Common prefixes (sub-directories), each ending with the delimiter.
    pub prefixes: Vec<String>,
    /// Objects directly at this level, including zero-byte markers.
    pub objects: Vec<ObjectEntry>,
}

/// Async object store contract.
pub trait StorageBackend: Send + Sync + 'static {
    /// List one level under `prefix` using `/` as the delimiter.
    ///
    /// An empty `prefix` lists the bucket root.
    fn list_one_level(
        &self,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Listing>> + Send + '_>>;

    /// Size of the object at `key`, or `None` when it does not exist.
    fn object_size(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<u64>>> + Send + '_>>;

    /// Produce a time-limited GET URL for the object at `key`.
    fn presign_get(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;
}
