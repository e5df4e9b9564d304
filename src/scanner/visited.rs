//! Directory identity tracking for cycle-free traversal.
//!
//! # Overview
//!
//! Bind mounts and other filesystem aliasing can make the same directory
//! reachable under several paths. [`VisitedDirs`] records each directory's
//! identity the first time it is walked so later aliases are skipped.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from directory metadata
//! - **Other**: Uses the canonicalized path
//!
//! # Example
//!
//! ```no_run
//! use xdupes::scanner::VisitedDirs;
//! use std::path::Path;
//!
//! let mut visited = VisitedDirs::new();
//! let path = Path::new("/some/dir");
//! let meta = std::fs::metadata(path).unwrap();
//!
//! assert!(visited.first_visit(path, &meta));
//! assert!(!visited.first_visit(path, &meta));
//! ```

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;
#[cfg(not(unix))]
use std::path::PathBuf;

/// Tracks directories already walked.
///
/// Not thread-safe: the walker owns one instance for the whole traversal.
#[derive(Debug, Default)]
pub struct VisitedDirs {
    seen: HashSet<DirKey>,
}

impl VisitedDirs {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record a directory, returning `true` the first time it is seen.
    ///
    /// When no identity can be determined the directory is always treated as
    /// a first visit.
    pub fn first_visit(&mut self, path: &Path, metadata: &Metadata) -> bool {
        match DirKey::new(path, metadata) {
            Some(key) => self.seen.insert(key),
            None => true,
        }
    }

    /// Number of distinct directories recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Platform-specific directory identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DirKey {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl DirKey {
    #[cfg(unix)]
    fn new(_path: &Path, metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn new(path: &Path, _metadata: &Metadata) -> Option<Self> {
        std::fs::canonicalize(path).ok().map(Self::Canonical)
    }
}
