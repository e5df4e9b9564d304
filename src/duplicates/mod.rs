//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based candidate indexing
//! - Concurrent content hashing in a fixed worker pool
//! - Digest aggregation into duplicate groups
//! - Optional byte-for-byte verification
//! - The [`DuplicateFinder`] pipeline tying these together

pub mod finder;
pub mod groups;
pub mod pool;
pub mod results;
pub mod verify;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{DuplicateGroup, GroupingStats, SizeBucket, SizeIndex};
pub use pool::{
    available_concurrency, resolve_worker_count, HashWorkerPool, PoolConfig, PoolError, PoolStats,
};
pub use results::{aggregate, Aggregation, ResultTable};
