//! Size-based candidate indexing and duplicate group types.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot be duplicates, so every file that is the only one
//! of its size is dropped before any content is read. Only the remaining
//! buckets become hashing work.
//!
//! # Example
//!
//! ```
//! use xdupes::scanner::Candidate;
//! use xdupes::duplicates::SizeIndex;
//! use std::path::PathBuf;
//!
//! let mut index = SizeIndex::new();
//! index.insert(Candidate::new(PathBuf::from("/file1.txt"), 1024));
//! index.insert(Candidate::new(PathBuf::from("/file2.txt"), 1024));
//! index.insert(Candidate::new(PathBuf::from("/file3.txt"), 2048));
//!
//! let (work, stats) = index.into_hash_work(false);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.files_to_hash, 2);  // Two 1024-byte files
//! assert_eq!(work.len(), 1);           // Only one size bucket survives
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scanner::{Candidate, Digest};

/// Accumulates candidates into buckets keyed by exact byte length.
///
/// Buckets preserve insertion order.
#[derive(Debug, Default)]
pub struct SizeIndex {
    buckets: BTreeMap<u64, Vec<Candidate>>,
    total_files: usize,
    total_size: u64,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate to the bucket for its size.
    pub fn insert(&mut self, candidate: Candidate) {
        self.total_files += 1;
        self.total_size = self.total_size.saturating_add(candidate.size);
        self.buckets.entry(candidate.size).or_default().push(candidate);
    }

    /// Number of candidates indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_files
    }

    /// Whether no candidate has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn unique_sizes(&self) -> usize {
        self.buckets.len()
    }

    /// Finish indexing and return the buckets worth hashing.
    ///
    /// Only buckets with two or more members survive. With `skip_empty` the
    /// zero-length bucket is dropped as well, since all empty files are
    /// trivially identical.
    #[must_use]
    pub fn into_hash_work(self, skip_empty: bool) -> (Vec<SizeBucket>, GroupingStats) {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            total_size: self.total_size,
            unique_sizes: self.buckets.len(),
            ..Default::default()
        };

        let mut work = Vec::new();
        for (size, files) in self.buckets {
            if size == 0 {
                stats.empty_files = files.len();
                if skip_empty {
                    log::debug!("Skipping {} empty files", files.len());
                    continue;
                }
            }
            if files.len() < 2 {
                stats.eliminated_unique += files.len();
                continue;
            }
            stats.files_to_hash += files.len();
            work.push(SizeBucket { size, files });
        }
        stats.buckets_to_hash = work.len();

        log::debug!(
            "Size grouping: {} files, {} unique sizes, {} to hash in {} buckets",
            stats.total_files,
            stats.unique_sizes,
            stats.files_to_hash,
            stats.buckets_to_hash
        );

        (work, stats)
    }
}

/// Candidates sharing one exact byte length.
#[derive(Debug, Clone)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size, in discovery order
    pub files: Vec<Candidate>,
}

impl SizeBucket {
    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Upper bound on savings if every file turned out identical.
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.size * (self.files.len().saturating_sub(1) as u64)
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files indexed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files eliminated as the only one of their size
    pub eliminated_unique: usize,
    /// Number of zero-length files encountered
    pub empty_files: usize,
    /// Number of files that will be content hashed
    pub files_to_hash: usize,
    /// Number of size buckets that will be content hashed
    pub buckets_to_hash: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Confirmed duplicate group of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content digest shared by every member
    pub digest: Digest,
    /// File size in bytes (shared by every member)
    pub size: u64,
    /// Member paths, two or more
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(digest: Digest, size: u64, paths: Vec<PathBuf>) -> Self {
        Self { digest, size, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes occupied by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        self.digest.to_hex()
    }
}
