//! Media library: turns one directory listing into a structured view.
//!
//! A listing request runs raw listing -> cover resolution -> (only when
//! no cover was found) artwork sub-directory fallback -> partition.
//! Artwork sub-directories are listed concurrently; the first failure
//! fails the whole request.

use futures::future::try_join_all;
use metrics::counter;
use serde::Serialize;
use tracing::debug;

use crate::classifier::MediaClassifier;
use crate::errors::LibraryError;
use crate::metrics::{ARTWORK_FALLBACK_TOTAL, CONTENT_URLS_TOTAL, LISTINGS_TOTAL};
use crate::storage::bucket::BucketStore;
use crate::storage::entry::{Directory, File};

/// Result of listing one directory.
///
/// Every non-empty file of the directory ends up in exactly one of
/// `audio_tracks`, `cover` or `files`.  The cover may also come from an
/// artwork sub-directory, in which case it is not part of this
/// directory's files at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaListing {
    pub current_directory: Directory,
    pub directories: Vec<Directory>,
    /// Files that are neither tracks nor the cover.
    pub files: Vec<File>,
    pub cover: Option<File>,
    pub audio_tracks: Vec<File>,
}

fn status_label<T>(result: &Result<T, LibraryError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.code(),
    }
}

/// Browsable view over a bucket.
pub struct MediaLibrary {
    store: BucketStore,
    classifier: MediaClassifier,
}

impl MediaLibrary {
    pub fn new(store: BucketStore, classifier: MediaClassifier) -> Self {
        Self { store, classifier }
    }

    /// List the directory at `path`.
    pub async fn list(&self, path: &str) -> Result<MediaListing, LibraryError> {
        let result = self.list_inner(path).await;
        counter!(LISTINGS_TOTAL, "status" => status_label(&result)).increment(1);
        result
    }

    async fn list_inner(&self, path: &str) -> Result<MediaListing, LibraryError> {
        let (directories, files) = self.store.list(path).await?;

        let cover = match self.classifier.find_cover(&files) {
            Some(cover) => Some(cover),
            None => self.find_artwork_cover(&directories).await?,
        };

        let mut audio_tracks = Vec::new();
        let mut other_files = Vec::new();
        for file in files {
            if self.classifier.is_audio_file(&file) {
                audio_tracks.push(file);
            } else if cover.as_ref().map_or(true, |c| c.path() != file.path()) {
                other_files.push(file);
            }
        }

        Ok(MediaListing {
            current_directory: Directory::new(path),
            directories,
            files: other_files,
            cover,
            audio_tracks,
        })
    }

    /// Look for a cover one level down, inside artwork sub-directories.
    async fn find_artwork_cover(
        &self,
        directories: &[Directory],
    ) -> Result<Option<File>, LibraryError> {
        let artwork: Vec<&Directory> = directories
            .iter()
            .filter(|d| self.classifier.is_artwork_dir(d))
            .collect();
        if artwork.is_empty() {
            return Ok(None);
        }

        debug!(
            "no cover found, searching {} artwork directories",
            artwork.len()
        );
        counter!(ARTWORK_FALLBACK_TOTAL).increment(1);

        // Results come back in directory order, so ties still resolve to
        // the first file in listing order. An artwork directory holding only
        // zero-byte markers lists as NotFound and fails the whole listing.
        let listings = try_join_all(artwork.iter().map(|d| self.store.list(d.path()))).await?;
        let pool: Vec<File> = listings.into_iter().flat_map(|(_, files)| files).collect();
        Ok(self.classifier.find_cover(&pool))
    }

    /// Time-limited direct URL for the file at `path`.
    pub async fn content_url(&self, path: &str) -> Result<String, LibraryError> {
        let result = self.store.content_url(path).await;
        counter!(CONTENT_URLS_TOTAL, "status" => status_label(&result)).increment(1);
        result
    }
}

// -- Tests -------------------------------------------------------------------
