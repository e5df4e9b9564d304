//! Duplicate finder orchestrating the detection pipeline.
//!
//! # Overview
//!
//! A scan runs these phases in order:
//! 1. **Walk** - collect candidates from every source root into a [`SizeIndex`]
//! 2. **Size grouping** - drop every file that is the only one of its size
//! 3. **Hash** - stream every remaining file through the [`HashWorkerPool`]
//! 4. **Aggregate** - turn digests shared by two or more paths into groups
//! 5. **Verify** (paranoid only) - confirm groups byte-for-byte
//!
//! # Example
//!
//! ```no_run
//! use xdupes::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_threads(4).with_recursive(true);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! println!("Wasted: {} bytes", summary.wasted_space);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::pool::{HashWorkerPool, PoolConfig, PoolError};
use super::results::{aggregate, Aggregation};
use super::{verify, DuplicateGroup, SizeIndex};
use crate::format::format_duration;
use crate::progress::{Phase, ProgressCallback};
use crate::scanner::{Hasher, ReadErrorPolicy, ScanError, Walker, WalkerConfig};

/// Default interval between progress refreshes while hashing.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Requested worker count; `0` means half the available cores.
    pub threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Prune the zero-length bucket before hashing.
    pub skip_empty: bool,
    /// Content hasher shared by every worker.
    pub hasher: Hasher,
    /// Treatment of files that fail to open or read.
    pub read_error_policy: ReadErrorPolicy,
    /// Enable byte-by-byte verification after hash matching.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// How often the hashing phase refreshes progress.
    pub poll_interval: Duration,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("threads", &self.threads)
            .field("walker_config", &self.walker_config)
            .field("skip_empty", &self.skip_empty)
            .field("hasher", &self.hasher)
            .field("read_error_policy", &self.read_error_policy)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            walker_config: WalkerConfig::default(),
            skip_empty: false,
            hasher: Hasher::default(),
            read_error_policy: ReadErrorPolicy::default(),
            paranoid: false,
            shutdown_flag: None,
            progress_callback: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl FinderConfig {
    /// Set the requested worker count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set whether subdirectories are descended into.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.walker_config.recursive = recursive;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set whether empty files are ignored.
    #[must_use]
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Set the content hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the read error policy.
    #[must_use]
    pub fn with_read_error_policy(mut self, policy: ReadErrorPolicy) -> Self {
        self.read_error_policy = policy;
        self
    }

    /// Enable paranoid mode (byte-by-byte verification).
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the progress refresh interval used while hashing.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Regular files discovered by the walker
    pub files_walked: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Distinct file sizes among discovered files
    pub unique_sizes: usize,
    /// Files dropped as the only one of their size
    pub eliminated_by_size: usize,
    /// Files submitted to the hash pool
    pub files_hashed: usize,
    /// Bytes fed through the hash
    pub bytes_hashed: u64,
    /// Files that could not be fully read while hashing
    pub failed_reads: usize,
    /// Number of hash workers started
    pub workers: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of redundant copies across all groups
    pub duplicate_files: usize,
    /// Bytes used by all copies except one per group
    pub wasted_space: u64,
    /// Time spent walking and indexing
    pub walk_duration: Duration,
    /// Time spent hashing, aggregating, and verifying
    pub hash_duration: Duration,
    /// Duration of the entire scan
    pub total_duration: Duration,
    /// Traversal errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of discovered bytes taken by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.wasted_space as f64 / self.total_size as f64) * 100.0
        }
    }

    fn log_debug_lines(&self) {
        log::debug!("Threads: {}", self.workers);
        log::debug!("Total files found: {}", self.files_walked);
        log::debug!("Total files hashed: {}", self.files_hashed);
        log::debug!("Elapsed (walk): {}", format_duration(self.walk_duration));
        log::debug!("Elapsed (hash): {}", format_duration(self.hash_duration));
        log::debug!("Elapsed (total): {}", format_duration(self.total_duration));
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// No source root was supplied.
    #[error("no source directories given")]
    NoSources,

    /// The hash pool could not be run.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Duplicate finder that orchestrates the detection pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    fn progress(&self) -> Option<&dyn ProgressCallback> {
        self.config.progress_callback.as_deref()
    }

    fn interrupted(&self) -> FinderError {
        if let Some(progress) = self.progress() {
            progress.on_interrupt();
        }
        log::info!("Scan interrupted");
        FinderError::Interrupted
    }

    /// Find all duplicate files under the given source roots.
    ///
    /// Roots that do not exist, are unreadable, or are not directories are
    /// logged as warnings and skipped. Overlapping roots are walked once.
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - `Vec<DuplicateGroup>` - Confirmed duplicate groups
    /// - `ScanSummary` - Statistics about the scan
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - `roots` is empty
    /// - The scan is interrupted by shutdown signal
    /// - The hash pool cannot spawn its workers
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if roots.is_empty() {
            return Err(FinderError::NoSources);
        }

        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if self.config.is_shutdown_requested() {
            return Err(self.interrupted());
        }

        // Walk
        let mut walker = Walker::new(roots.to_vec(), self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        log::info!("Scanning {} source root(s)", walker.roots().len());

        if let Some(progress) = self.progress() {
            progress.on_phase_start(Phase::Walking, 0);
        }

        let mut index = SizeIndex::new();
        for result in walker.walk() {
            match result {
                Ok(candidate) => {
                    log::trace!("{} ({} bytes)", candidate.path.display(), candidate.size);
                    index.insert(candidate);
                    if let Some(progress) = self.progress() {
                        progress.on_progress(index.len());
                    }
                }
                Err(e) => {
                    log::warn!("{}", e);
                    summary.scan_errors.push(e);
                }
            }
        }

        if let Some(progress) = self.progress() {
            progress.on_phase_end(Phase::Walking);
        }
        if self.config.is_shutdown_requested() {
            return Err(self.interrupted());
        }

        summary.files_walked = index.len();
        summary.walk_duration = start_time.elapsed();

        // Size grouping
        let (work, size_stats) = index.into_hash_work(self.config.skip_empty);
        summary.total_size = size_stats.total_size;
        summary.unique_sizes = size_stats.unique_sizes;
        summary.eliminated_by_size = size_stats.eliminated_unique;
        summary.files_hashed = size_stats.files_to_hash;

        log::info!(
            "Found {} files, {} to hash ({:.1}% eliminated by size)",
            size_stats.total_files,
            size_stats.files_to_hash,
            size_stats.elimination_rate()
        );

        let sizes: HashMap<PathBuf, u64> = work
            .iter()
            .flat_map(|bucket| bucket.files.iter().map(|c| (c.path.clone(), c.size)))
            .collect();

        // Hash
        let hash_start = Instant::now();
        let mut pool_config = PoolConfig::default()
            .with_hasher(self.config.hasher.clone())
            .with_read_error_policy(self.config.read_error_policy);
        if let Some(ref flag) = self.config.shutdown_flag {
            pool_config = pool_config.with_shutdown_flag(flag.clone());
        }

        let mut pool = HashWorkerPool::new(pool_config);
        summary.workers = pool.start(self.config.threads)?;

        if let Some(progress) = self.progress() {
            progress.on_phase_start(Phase::Hashing, size_stats.files_to_hash);
        }

        for candidate in work.into_iter().flat_map(|bucket| bucket.files) {
            if self.config.is_shutdown_requested() {
                break;
            }
            pool.enqueue(candidate.path)?;
        }

        while !pool.join_timeout(self.config.poll_interval) {
            if let Some(progress) = self.progress() {
                progress.on_progress(pool.completed());
            }
        }
        if let Some(progress) = self.progress() {
            progress.on_progress(pool.completed());
            progress.on_phase_end(Phase::Hashing);
        }

        let (table, pool_stats) = pool.into_results();
        if self.config.is_shutdown_requested() {
            return Err(self.interrupted());
        }

        summary.bytes_hashed = pool_stats.bytes_hashed;
        summary.failed_reads = pool_stats.failed_files;

        // Aggregate
        let mut aggregation = aggregate(&table, |path| sizes.get(path).copied());

        // Verify
        if self.config.paranoid && !aggregation.groups.is_empty() {
            if let Some(progress) = self.progress() {
                progress.on_phase_start(Phase::Verifying, aggregation.groups.len());
            }

            let mut verified = Vec::with_capacity(aggregation.groups.len());
            for (ix, group) in aggregation.groups.iter().enumerate() {
                if self.config.is_shutdown_requested() {
                    return Err(self.interrupted());
                }
                verified.extend(verify::verify_group(group));
                if let Some(progress) = self.progress() {
                    progress.on_progress(ix + 1);
                }
            }

            if let Some(progress) = self.progress() {
                progress.on_phase_end(Phase::Verifying);
            }
            aggregation = Aggregation::from_groups(verified);
        }

        summary.duplicate_groups = aggregation.groups.len();
        summary.duplicate_files = aggregation.duplicate_files();
        summary.wasted_space = aggregation.wasted_space;
        summary.hash_duration = hash_start.elapsed();
        summary.total_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} bytes wasted ({:.1}%)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.wasted_space,
            summary.wasted_percentage()
        );
        summary.log_debug_lines();

        Ok((aggregation.groups, summary))
    }
}
