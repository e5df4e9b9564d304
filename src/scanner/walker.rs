//! Directory walker implementation using an explicit work stack.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one or more
//! source roots and collecting [`Candidate`]s for duplicate detection.
//!
//! # Features
//!
//! - Overlapping source roots collapsed up front ([`collapse_roots`])
//! - Explicit work stack instead of native recursion
//! - Symbolic links are never followed and never reported
//! - Directories reachable under several paths are walked once
//! - Missing or unreadable directories are yielded as errors, not fatal
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use xdupes::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], WalkerConfig::new(true));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! println!("walked {} files", walker.walked_count());
//! ```

use std::collections::VecDeque;
use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::visited::VisitedDirs;
use super::{Candidate, ScanError, WalkerConfig};

/// Collapse source roots so that no root is walked twice.
///
/// Trailing separators are stripped, the roots are sorted as strings, and a
/// root is dropped when an already-kept root is a string prefix of it. The
/// check is lexical only: `/a/bc` is absorbed by `/a/b`, and `/a/../b` is not
/// recognised as `/b`.
#[must_use]
pub fn collapse_roots<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut trimmed: Vec<PathBuf> = roots
        .iter()
        .map(|root| trim_trailing_separators(root.as_ref()))
        .filter(|root| !root.as_os_str().is_empty())
        .collect();
    trimmed.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let mut kept: Vec<PathBuf> = Vec::with_capacity(trimmed.len());
    for root in trimmed {
        let bytes = root.as_os_str().as_encoded_bytes();
        let absorbed = kept
            .iter()
            .any(|prefix| bytes.starts_with(prefix.as_os_str().as_encoded_bytes()));
        if absorbed {
            log::debug!("Source {} already covered, skipping", root.display());
            continue;
        }
        kept.push(root);
    }
    kept
}

/// Strip trailing separators, keeping a bare root separator intact.
fn trim_trailing_separators(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => {
            let trimmed = s.trim_end_matches(std::path::is_separator);
            if trimmed.is_empty() && !s.is_empty() {
                PathBuf::from(&s[..1])
            } else {
                PathBuf::from(trimmed)
            }
        }
        None => path.to_path_buf(),
    }
}

/// Directory walker for candidate discovery.
#[derive(Debug)]
pub struct Walker {
    /// Collapsed source roots
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Regular files yielded so far
    walked: AtomicUsize,
}

impl Walker {
    /// Create a new walker over the given source roots.
    ///
    /// The roots are collapsed with [`collapse_roots`] immediately.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots: collapse_roots(&roots),
            config,
            shutdown_flag: None,
            walked: AtomicUsize::new(0),
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker will stop iteration
    /// as soon as possible. This allows for clean Ctrl+C handling.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The collapsed roots this walker will traverse.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Number of regular files yielded so far.
    #[must_use]
    pub fn walked_count(&self) -> usize {
        self.walked.load(Ordering::Relaxed)
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the source roots, yielding candidates.
    ///
    /// The returned iterator is lazy and single-pass. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration. Calling
    /// `walk` again starts a fresh traversal.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            walker: self,
            stack: self.roots.iter().cloned().collect(),
            visited: VisitedDirs::new(),
            current: None,
        }
    }

    /// Open a directory and return its entries sorted by file name.
    fn read_sorted(
        &self,
        dir: &Path,
        visited: &mut VisitedDirs,
    ) -> Result<Vec<io::Result<DirEntry>>, ScanError> {
        let metadata = fs::metadata(dir).map_err(|e| ScanError::from_io(dir.to_path_buf(), e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }
        if !visited.first_visit(dir, &metadata) {
            log::debug!("Already visited, skipping: {}", dir.display());
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(dir).map_err(|e| ScanError::from_io(dir.to_path_buf(), e))?;
        let mut children: Vec<io::Result<DirEntry>> = read_dir.collect();

        // Sort children for deterministic output
        children.sort_by(|a, b| match (a, b) {
            (Ok(a), Ok(b)) => a.file_name().cmp(&b.file_name()),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });
        Ok(children)
    }
}

/// Lazy traversal state returned by [`Walker::walk`].
pub struct Walk<'a> {
    walker: &'a Walker,
    stack: VecDeque<PathBuf>,
    visited: VisitedDirs,
    current: Option<(PathBuf, std::vec::IntoIter<io::Result<DirEntry>>)>,
}

impl Walk<'_> {
    /// Classify one directory entry.
    ///
    /// Returns `None` for entries that produce nothing (symlinks,
    /// directories, special files).
    fn process_entry(
        &mut self,
        dir: &Path,
        entry: io::Result<DirEntry>,
    ) -> Option<Result<Candidate, ScanError>> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return Some(Err(ScanError::from_io(dir.to_path_buf(), e))),
        };
        let path = entry.path();

        // DirEntry::file_type does not follow symlinks
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => return Some(Err(ScanError::from_io(path, e))),
        };

        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }

        if file_type.is_dir() {
            if self.walker.config.recursive {
                self.stack.push_back(path);
            }
            return None;
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", path.display());
            return None;
        }

        match entry.metadata() {
            Ok(metadata) => {
                self.walker.walked.fetch_add(1, Ordering::Relaxed);
                Some(Ok(Candidate::new(path, metadata.len())))
            }
            Err(e) => Some(Err(ScanError::from_io(path, e))),
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<Candidate, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Check shutdown flag between entries
            if self.walker.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            if let Some((dir, mut entries)) = self.current.take() {
                if let Some(entry) = entries.next() {
                    let item = self.process_entry(&dir, entry);
                    self.current = Some((dir, entries));
                    match item {
                        Some(item) => return Some(item),
                        None => continue,
                    }
                }
            }

            let dir = self.stack.pop_front()?;
            match self.walker.read_sorted(&dir, &mut self.visited) {
                Ok(children) => self.current = Some((dir, children.into_iter())),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
