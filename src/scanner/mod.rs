//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Stack-based directory walking over one or more source roots
//! - Streaming content hashing with XXH3-128 or BLAKE3
//! - Directory identity tracking to avoid re-walking aliased trees
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`hasher`]: Streaming file hashing and the [`Digest`] key type
//! - [`visited`]: Directory identity tracking
//!
//! # Example
//!
//! ```no_run
//! use xdupes::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig::new(true);
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod visited;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export main types
pub use hasher::{Digest, HashAlgorithm, HashOutcome, Hasher, ReadErrorPolicy, DEFAULT_BUFFER_SIZE};
pub use visited::VisitedDirs;
pub use walker::{collapse_roots, Walker};

/// A file discovered during traversal that may have a duplicate.
///
/// The size is recorded once at discovery time and is never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path to the file, as reached from its source root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl Candidate {
    /// Create a new Candidate.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into subdirectories of each source root.
    pub recursive: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }
}

/// Errors that can occur during directory scanning.
///
/// None of these are fatal: the walker yields them and moves on.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a directory.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("invalid directory: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: Arc::new(source),
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The file vanished between indexing and hashing.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when opening the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("read failed for {path} after {bytes_read} bytes: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Bytes successfully fed to the hash before the failure
        bytes_read: u64,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, bytes_read: u64, source: std::io::Error) -> Self {
        match (source.kind(), bytes_read) {
            (std::io::ErrorKind::NotFound, 0) => Self::NotFound(path),
            (std::io::ErrorKind::PermissionDenied, 0) => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                bytes_read,
                source: Arc::new(source),
            },
        }
    }
}
