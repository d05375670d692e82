//! Filename-based media classification.
//!
//! Nothing here looks inside a file: tracks, covers and artwork
//! directories are recognised from names and extensions only.  The
//! lookup sets are fixed when the classifier is built and shared
//! read-only afterwards.

use serde::Serialize;
use std::collections::HashSet;

use crate::config::LibraryConfig;
use crate::storage::entry::{split_name_ext, Directory, File};

pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "ogg", "oga", "flac"];
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
pub const DEFAULT_COVER_NAMES: &[&str] = &["cover", "front", "folder"];
pub const DEFAULT_ARTWORK_DIRS: &[&str] = &["covers", "scans", "artwork"];

/// Score of a file that is not a cover candidate at all.
pub const REJECTED: i32 = -1;

/// An image file with its cover likelihood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredFile {
    pub file: File,
    /// 0 = any image, 1 = name contains a cover token, 2 = exact cover name.
    pub score: i32,
}

fn lowercase_set<S: AsRef<str>>(items: &[S]) -> HashSet<String> {
    items.iter().map(|s| s.as_ref().to_lowercase()).collect()
}

/// Classifies files and directories of one listing.
#[derive(Debug, Clone)]
pub struct MediaClassifier {
    audio_extensions: HashSet<String>,
    image_extensions: HashSet<String>,
    cover_names: HashSet<String>,
    artwork_dirs: HashSet<String>,
}

impl Default for MediaClassifier {
    fn default() -> Self {
        Self {
            audio_extensions: lowercase_set(DEFAULT_AUDIO_EXTENSIONS),
            image_extensions: lowercase_set(DEFAULT_IMAGE_EXTENSIONS),
            cover_names: lowercase_set(DEFAULT_COVER_NAMES),
            artwork_dirs: lowercase_set(DEFAULT_ARTWORK_DIRS),
        }
    }
}

impl MediaClassifier {
    pub fn new(cfg: &LibraryConfig) -> Self {
        Self {
            audio_extensions: lowercase_set(&cfg.audio_extensions),
            image_extensions: lowercase_set(&cfg.image_extensions),
            cover_names: lowercase_set(&cfg.cover_names),
            artwork_dirs: lowercase_set(&cfg.artwork_dirs),
        }
    }

    /// Whether the file's extension is a known audio extension.
    pub fn is_audio_file(&self, file: &File) -> bool {
        self.audio_extensions.contains(&file.extension())
    }

    /// Cover likelihood of a single file, or [`REJECTED`] for non-images.
    pub fn score_cover(&self, file: &File) -> i32 {
        let lower = file.name().to_lowercase();
        let (name, ext) = split_name_ext(&lower);
        if !self.image_extensions.contains(ext) {
            return REJECTED;
        }
        if self.cover_names.contains(name) {
            return 2;
        }
        if self.cover_names.iter().any(|token| name.contains(token.as_str())) {
            return 1;
        }
        0
    }

    /// Score every image in `files`, keeping listing order.
    pub fn score_covers(&self, files: &[File]) -> Vec<ScoredFile> {
        files
            .iter()
            .filter_map(|f| {
                let score = self.score_cover(f);
                (score != REJECTED).then(|| ScoredFile {
                    file: f.clone(),
                    score,
                })
            })
            .collect()
    }

    /// Best cover among `files`.  Among equal scores the earliest file wins.
    pub fn find_cover(&self, files: &[File]) -> Option<File> {
        let mut candidates = self.score_covers(files);
        // Stable sort keeps listing order among equal scores.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.into_iter().next().map(|c| c.file)
    }

    /// Whether `dir` is a place where cover scans are usually kept.
    pub fn is_artwork_dir(&self, dir: &Directory) -> bool {
        self.artwork_dirs.contains(&dir.name().to_lowercase())
    }
}

// -- Tests -------------------------------------------------------------------
