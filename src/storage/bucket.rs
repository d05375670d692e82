//! Virtual-path view over a [`StorageBackend`].
//!
//! [`BucketStore`] applies the base prefix, turns one delimiter listing
//! into [`Directory`] and [`File`] values, and drops zero-byte objects,
//! which only emulate empty directories.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::backend::StorageBackend;
use super::entry::{Directory, File};
use super::keys::KeyMapper;
use crate::errors::LibraryError;

/// Object store addressed by virtual paths.
#[derive(Clone)]
pub struct BucketStore {
    backend: Arc<dyn StorageBackend>,
    keys: KeyMapper,
    presign_ttl: Duration,
}

impl BucketStore {
    pub fn new(backend: Arc<dyn StorageBackend>, keys: KeyMapper, presign_ttl: Duration) -> Self {
        Self {
            backend,
            keys,
            presign_ttl,
        }
    }

    /// List the directories and non-empty files directly under `path`.
    ///
    /// Fails with [`LibraryError::NotFound`] when nothing is left after
    /// dropping zero-byte objects.
    pub async fn list(&self, path: &str) -> Result<(Vec<Directory>, Vec<File>), LibraryError> {
        let prefix = self.keys.listing_prefix(path);
        let listing = self.backend.list_one_level(&prefix).await?;

        let dirs: Vec<Directory> = listing
            .prefixes
            .iter()
            .map(|p| Directory::new(self.keys.to_virtual_path(p)))
            .collect();
        let files: Vec<File> = listing
            .objects
            .iter()
            .filter(|obj| obj.size != 0)
            .map(|obj| File::new(self.keys.to_virtual_path(&obj.key), obj.size))
            .collect();

        if dirs.is_empty() && files.is_empty() {
            return Err(LibraryError::NotFound {
                path: path.to_string(),
            });
        }

        debug!(
            "listed '{}': {} directories, {} files",
            path,
            dirs.len(),
            files.len()
        );
        Ok((dirs, files))
    }

    /// Size of the file at `path`.
    pub async fn file_size(&self, path: &str) -> Result<u64, LibraryError> {
        let key = self.keys.to_store_key(path);
        self.backend
            .object_size(&key)
            .await?
            .ok_or_else(|| LibraryError::NotFound {
                path: path.to_string(),
            })
    }

    /// Time-limited direct URL for the file at `path`.
    pub async fn content_url(&self, path: &str) -> Result<String, LibraryError> {
        if self.file_size(path).await? == 0 {
            return Err(LibraryError::NoContent {
                path: path.to_string(),
            });
        }
        let key = self.keys.to_store_key(path);
        Ok(self.backend.presign_get(&key, self.presign_ttl).await?)
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::Listing;
    use crate::storage::memory::MemoryBackend;
    use std::future::Future;
    use std::pin::Pin;

    fn memory() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::with_objects([
            ("file1.jpg", 1),
            ("empty", 0),
            ("dir1/file2.jpg", 2),
            ("dir1/empty", 0),
            ("dir2/file3.jpg", 3),
            ("dir2/dir22/file4.jpg", 4),
            ("dir4/", 0),
        ]))
    }

    fn store(backend: Arc<MemoryBackend>, prefix: &str) -> BucketStore {
        BucketStore::new(backend, KeyMapper::new(prefix), Duration::from_secs(60))
    }

    fn paths<T>(items: &[T], path: impl Fn(&T) -> &str) -> Vec<&str> {
        items.iter().map(path).collect()
    }

    #[tokio::test]
    async fn test_list_root_drops_empty_objects() {
        let s = store(memory(), "");
        let (dirs, files) = s.list("").await.unwrap();
        assert_eq!(paths(&dirs, Directory::path), vec!["dir1", "dir2", "dir4"]);
        assert_eq!(paths(&files, File::path), vec!["file1.jpg"]);
    }

    #[tokio::test]
    async fn test_list_nested() {
        let s = store(memory(), "");
        let (dirs, files) = s.list("dir2").await.unwrap();
        assert_eq!(paths(&dirs, Directory::path), vec!["dir2/dir22"]);
        assert_eq!(dirs[0].name(), "dir22");
        assert_eq!(dirs[0].parents(), vec![Directory::root(), Directory::new("dir2")]);
        assert_eq!(paths(&files, File::path), vec!["dir2/file3.jpg"]);

        let (dirs, files) = s.list("dir1").await.unwrap();
        assert!(dirs.is_empty());
        assert_eq!(files[0].name(), "file2.jpg");
        assert_eq!(files[0].friendly_name(), "file2");
        assert_eq!(files[0].size, 2);
    }

    #[tokio::test]
    async fn test_list_missing_is_not_found() {
        let s = store(memory(), "");
        assert!(matches!(s.list("dir3").await, Err(LibraryError::NotFound { .. })));
        assert!(matches!(
            s.list("dir2/dir23").await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_marker_only_directory_is_not_found() {
        let s = store(memory(), "");
        assert!(matches!(s.list("dir4").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_empty_bucket_is_not_found() {
        let s = store(Arc::new(MemoryBackend::new()), "");
        assert!(matches!(s.list("").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_with_base_prefix() {
        let backend = memory();

        let (dirs, files) = store(backend.clone(), "dir1/").list("").await.unwrap();
        assert!(dirs.is_empty());
        assert_eq!(paths(&files, File::path), vec!["file2.jpg"]);

        let s = store(backend.clone(), "dir2");
        let (dirs, files) = s.list("").await.unwrap();
        assert_eq!(paths(&dirs, Directory::path), vec!["dir22"]);
        assert_eq!(dirs[0].parents(), vec![Directory::root()]);
        assert_eq!(paths(&files, File::path), vec!["file3.jpg"]);

        let (_, files) = s.list("dir22").await.unwrap();
        assert_eq!(paths(&files, File::path), vec!["dir22/file4.jpg"]);

        assert!(matches!(
            store(backend, "dir3/").list("").await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_size() {
        let s = store(memory(), "");
        assert_eq!(s.file_size("file1.jpg").await.unwrap(), 1);
        assert_eq!(s.file_size("dir2/dir22/file4.jpg").await.unwrap(), 4);
        assert!(matches!(
            s.file_size("dir2/dir22/file5.jpg").await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_content_url() {
        let s = store(memory(), "dir2/");
        let url = s.content_url("dir22/file4.jpg").await.unwrap();
        assert_eq!(url, "memory:///dir2/dir22/file4.jpg?X-Amz-Expires=60");
    }

    #[tokio::test]
    async fn test_content_url_zero_size_is_no_content() {
        let s = store(memory(), "");
        assert!(matches!(
            s.content_url("empty").await,
            Err(LibraryError::NoContent { .. })
        ));
    }

    #[tokio::test]
    async fn test_content_url_missing_is_not_found() {
        let s = store(memory(), "");
        assert!(matches!(
            s.content_url("nope.mp3").await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn list_one_level(
            &self,
            _prefix: &str,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<Listing>> + Send + '_>> {
            Box::pin(async { Err::<Listing, _>(anyhow::anyhow!("S3 list_objects_v2: access denied")) })
        }

        fn object_size(
            &self,
            _key: &str,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<u64>>> + Send + '_>> {
            Box::pin(async { Err::<Option<u64>, _>(anyhow::anyhow!("S3 head_object: access denied")) })
        }

        fn presign_get(
            &self,
            _key: &str,
            _ttl: Duration,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
            Box::pin(async { Err::<String, _>(anyhow::anyhow!("presign not expected")) })
        }
    }

    #[tokio::test]
    async fn test_store_errors_propagate_as_store_failure() {
        let s = BucketStore::new(
            Arc::new(FailingBackend),
            KeyMapper::default(),
            Duration::from_secs(1),
        );
        assert!(matches!(s.list("").await, Err(LibraryError::StoreFailure(_))));
        assert!(matches!(
            s.content_url("a.mp3").await,
            Err(LibraryError::StoreFailure(_))
        ));
    }
}
