//! Object storage access.
//!
//! The [`backend::StorageBackend`] trait abstracts over the bucket
//! holding the library.  The S3 gateway is the runtime implementation;
//! tests use an in-memory store.  [`bucket::BucketStore`] layers virtual paths on top.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

pub mod aws;
pub mod backend;
pub mod bucket;
pub mod entry;
pub mod keys;
#[cfg(test)]
pub mod memory;

/// Characters escaped when a key or virtual path is embedded in a URL.
/// Delimiters stay readable.
pub const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
