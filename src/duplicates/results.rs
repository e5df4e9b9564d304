//! Digest-keyed result table and the aggregation pass over it.
//!
//! Hash workers append into a [`ResultTable`] while the pool runs. Once the
//! pool has drained, [`aggregate`] turns every digest with two or more paths
//! into a [`DuplicateGroup`] and totals the wasted space.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::DuplicateGroup;
use crate::scanner::Digest;

/// Map from content digest to the paths that hashed to it.
///
/// Entries are only ever appended. Enumeration follows digest order, which
/// is stable but unrelated to traversal order.
#[derive(Debug, Default)]
pub struct ResultTable {
    entries: BTreeMap<Digest, Vec<PathBuf>>,
    paths: usize,
}

impl ResultTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` hashed to `digest`.
    pub fn insert(&mut self, digest: Digest, path: PathBuf) {
        self.entries.entry(digest).or_default().push(path);
        self.paths += 1;
    }

    /// Total number of paths recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths
    }

    /// Whether no path has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths == 0
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn digest_count(&self) -> usize {
        self.entries.len()
    }

    /// Paths recorded under `digest`.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&[PathBuf]> {
        self.entries.get(digest).map(Vec::as_slice)
    }

    /// Iterate digests and their paths in digest order.
    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &[PathBuf])> {
        self.entries.iter().map(|(d, p)| (d, p.as_slice()))
    }
}

/// Output of the aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Confirmed duplicate groups in digest order
    pub groups: Vec<DuplicateGroup>,
    /// Sum of wasted space over all groups
    pub wasted_space: u64,
}

impl Aggregation {
    /// Build from groups, recomputing the wasted-space total.
    #[must_use]
    pub fn from_groups(groups: Vec<DuplicateGroup>) -> Self {
        let wasted_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        Self {
            groups,
            wasted_space,
        }
    }

    /// Number of redundant copies across all groups.
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }
}

/// Collect duplicate groups from a drained result table.
///
/// `size_of` supplies the size recorded at discovery time. When it has no
/// answer the size is read from the filesystem. Every member of a group
/// shares one size because hashing only ever happens within a size bucket,
/// so the first path's size stands for the whole group.
pub fn aggregate<F>(table: &ResultTable, mut size_of: F) -> Aggregation
where
    F: FnMut(&Path) -> Option<u64>,
{
    let mut groups = Vec::new();

    for (digest, paths) in table.iter() {
        if paths.len() < 2 {
            continue;
        }
        let first = &paths[0];
        let size = size_of(first).unwrap_or_else(|| match std::fs::metadata(first) {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::warn!("cannot stat {}: {}", first.display(), e);
                0
            }
        });
        groups.push(DuplicateGroup::new(*digest, size, paths.to_vec()));
    }

    let aggregation = Aggregation::from_groups(groups);
    log::debug!(
        "Aggregation: {} groups, {} duplicate files, {} bytes wasted",
        aggregation.groups.len(),
        aggregation.duplicate_files(),
        aggregation.wasted_space
    );
    aggregation
}
