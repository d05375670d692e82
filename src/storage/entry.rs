//! Nodes of the virtual library tree.
//!
//! A virtual path uses `/` as the delimiter, never starts or ends with
//! it, and `""` denotes the root.  [`Directory`] and [`File`] are plain
//! value types built fresh for every request.

use serde::Serialize;

/// Delimiter between path segments, both in virtual paths and store keys.
pub const DELIMITER: char = '/';

/// Split `name` at its last `.` into `(stem, extension)`.
///
/// The extension is empty when the name has no `.`.
pub fn split_name_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => (name, ""),
    }
}

/// A virtual path shared by directories and files.
///
/// Holds the path string and answers the questions common to every
/// entry: its full path and its last segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryPath(String);

impl EntryPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment; empty for the root.
    pub fn name(&self) -> &str {
        match self.0.rfind(DELIMITER) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// A directory in the virtual tree, identified by its path alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Directory {
    path: EntryPath,
}

impl Directory {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: EntryPath::new(path),
        }
    }

    /// The library root.
    pub fn root() -> Self {
        Self::new("")
    }

    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Last path segment; empty for the root.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// All ancestors ordered from the root down to the immediate parent.
    ///
    /// `a/b/c` yields `["", "a", "a/b"]`; the root has no parents.
    pub fn parents(&self) -> Vec<Directory> {
        if self.is_root() {
            return Vec::new();
        }
        let mut dirs = Vec::new();
        let mut p = self.path();
        while let Some(idx) = p.rfind(DELIMITER) {
            p = &p[..idx];
            dirs.push(Directory::new(p));
        }
        dirs.push(Directory::root());
        dirs.reverse();
        dirs
    }
}

impl std::fmt::Display for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-empty object in the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct File {
    path: EntryPath,
    /// Object size in bytes.
    pub size: u64,
}

impl File {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: EntryPath::new(path),
            size,
        }
    }

    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Lower-cased text after the last `.` of the name, or empty.
    pub fn extension(&self) -> String {
        split_name_ext(self.name()).1.to_lowercase()
    }

    /// The name with its extension stripped.
    pub fn friendly_name(&self) -> &str {
        split_name_ext(self.name()).0
    }
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// -- Tests -------------------------------------------------------------------
