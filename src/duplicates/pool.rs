//! Fixed-size worker pool for concurrent content hashing.
//!
//! # Overview
//!
//! [`HashWorkerPool`] owns a task queue of file paths and a set of worker
//! threads. Each worker repeatedly takes one path off the queue, streams the
//! file through its own bounded buffer, and appends the path to the shared
//! [`ResultTable`] under the resulting digest.
//!
//! # Locking
//!
//! Three independently locked resources are shared:
//! - the task queue (`Mutex` + `Condvar`, workers sleep here when idle)
//! - the result table (its own `Mutex`, held only for the insert)
//! - the drain bookkeeping (`Mutex` + `Condvar`, signalled by the last task)
//!
//! No lock is held while a file is read or hashed.
//!
//! # Example
//!
//! ```no_run
//! use xdupes::duplicates::{HashWorkerPool, PoolConfig};
//! use std::path::PathBuf;
//!
//! let mut pool = HashWorkerPool::new(PoolConfig::default());
//! pool.start(4).unwrap();
//! pool.enqueue(PathBuf::from("a.bin")).unwrap();
//! pool.enqueue(PathBuf::from("b.bin")).unwrap();
//! pool.join();
//! let (table, stats) = pool.into_results();
//! println!("{} digests from {} files", table.digest_count(), stats.completed);
//! ```

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::results::ResultTable;
use crate::scanner::{Hasher, ReadErrorPolicy};

/// Resolve the number of workers to spawn.
///
/// `requested` is clamped into `[1, available]`. A request of `0` means half
/// of the available hardware concurrency, and never less than one.
#[must_use]
pub fn resolve_worker_count(requested: usize, available: usize) -> usize {
    let available = available.max(1);
    if requested == 0 {
        (available / 2).max(1)
    } else {
        requested.min(available)
    }
}

/// Hardware concurrency reported by the OS, or 1 when unknown.
#[must_use]
pub fn available_concurrency() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Configuration for the hashing pool.
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Hasher used by every worker.
    pub hasher: Hasher,
    /// Treatment of files that fail to open or read.
    pub read_error_policy: ReadErrorPolicy,
    /// Optional shutdown flag; workers stop taking tasks once it is set.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl PoolConfig {
    /// Set the hasher.
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

    /// Set the shutdown flag for cooperative cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

/// Errors returned by pool operations.
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// `start` was called while workers were already running.
    #[error("hash pool already started")]
    AlreadyStarted,

    /// The pool has been stopped and accepts no more work.
    #[error("hash pool is stopped")]
    Stopped,

    /// A worker thread could not be spawned.
    #[error("failed to spawn hash worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Counters reported once the pool has been drained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of worker threads that were started
    pub workers: usize,
    /// Number of tasks submitted
    pub enqueued: usize,
    /// Number of tasks finished (including failed reads)
    pub completed: usize,
    /// Number of files that could not be fully read
    pub failed_files: usize,
    /// Total bytes fed to the hash
    pub bytes_hashed: u64,
}

struct Queue {
    tasks: VecDeque<PathBuf>,
    terminate: bool,
}

struct Drain {
    /// Tasks enqueued whose result is not yet published
    outstanding: usize,
    /// Worker threads still running their loop
    live_workers: usize,
}

impl Drain {
    /// Drained once every task has published, or no worker is left to run one.
    fn is_drained(&self) -> bool {
        self.outstanding == 0 || self.live_workers == 0
    }
}

struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
    results: Mutex<ResultTable>,
    drain: Mutex<Drain>,
    drained: Condvar,
    enqueued: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    bytes_hashed: AtomicU64,
    hasher: Hasher,
    policy: ReadErrorPolicy,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decrements the live worker count when a worker exits, even by panic.
struct LiveWorker<'a>(&'a Shared);

impl Drop for LiveWorker<'_> {
    fn drop(&mut self) {
        let mut drain = lock(&self.0.drain);
        drain.live_workers = drain.live_workers.saturating_sub(1);
        self.0.drained.notify_all();
    }
}

/// Fixed-size pool of hashing threads.
pub struct HashWorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    started: usize,
}

impl HashWorkerPool {
    /// Create a pool with no workers running yet.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        let shared = Shared {
            queue: Mutex::new(Queue {
                tasks: VecDeque::new(),
                terminate: false,
            }),
            available: Condvar::new(),
            results: Mutex::new(ResultTable::new()),
            drain: Mutex::new(Drain {
                outstanding: 0,
                live_workers: 0,
            }),
            drained: Condvar::new(),
            enqueued: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            bytes_hashed: AtomicU64::new(0),
            hasher: config.hasher,
            policy: config.read_error_policy,
            shutdown_flag: config.shutdown_flag,
        };
        Self {
            shared: Arc::new(shared),
            workers: Vec::new(),
            started: 0,
        }
    }

    /// Spawn the workers and return how many were started.
    ///
    /// See [`resolve_worker_count`] for how `worker_count` is interpreted.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadyStarted`] if workers are already running
    /// - [`PoolError::Stopped`] if the pool was stopped
    /// - [`PoolError::Spawn`] if the OS refuses a new thread
    pub fn start(&mut self, worker_count: usize) -> Result<usize, PoolError> {
        if !self.workers.is_empty() {
            return Err(PoolError::AlreadyStarted);
        }
        if lock(&self.shared.queue).terminate {
            return Err(PoolError::Stopped);
        }

        let count = resolve_worker_count(worker_count, available_concurrency());
        for ix in 0..count {
            lock(&self.shared.drain).live_workers += 1;
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("xdupes-hash-{ix}"))
                .spawn(move || worker_loop(&shared));
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    lock(&self.shared.drain).live_workers -= 1;
                    self.stop();
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        self.started = count;
        log::debug!("Hash pool started with {} workers", count);
        Ok(count)
    }

    /// Submit one file for hashing and wake one idle worker.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Stopped`] once [`stop`](Self::stop) has run.
    pub fn enqueue(&self, path: PathBuf) -> Result<(), PoolError> {
        {
            let mut queue = lock(&self.shared.queue);
            if queue.terminate {
                return Err(PoolError::Stopped);
            }
            // Counted before a worker can possibly pop it
            lock(&self.shared.drain).outstanding += 1;
            queue.tasks.push_back(path);
        }
        self.shared.enqueued.fetch_add(1, Ordering::SeqCst);
        self.shared.available.notify_one();
        Ok(())
    }

    /// Whether tasks are waiting in the queue.
    ///
    /// This only inspects queue depth: it is `false` while the last tasks
    /// are still being hashed. Use [`join`](Self::join) to wait for drain.
    #[must_use]
    pub fn busy(&self) -> bool {
        !lock(&self.shared.queue).tasks.is_empty()
    }

    /// Number of tasks that have finished.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.shared.completed.load(Ordering::SeqCst)
    }

    /// Number of tasks submitted so far.
    #[must_use]
    pub fn total_enqueued(&self) -> usize {
        self.shared.enqueued.load(Ordering::SeqCst)
    }

    /// Number of workers spawned by [`start`](Self::start).
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.started
    }

    /// Block until the pool has drained.
    ///
    /// Returns early if every worker has exited, which happens after
    /// cancellation or when the pool was never started.
    pub fn join(&self) {
        let drain = lock(&self.shared.drain);
        let _drain = self
            .shared
            .drained
            .wait_while(drain, |d| !d.is_drained())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Wait at most `timeout` for the pool to drain.
    ///
    /// Returns `true` if it drained.
    pub fn join_timeout(&self, timeout: Duration) -> bool {
        let drain = lock(&self.shared.drain);
        let (drain, _) = self
            .shared
            .drained
            .wait_timeout_while(drain, timeout, |d| !d.is_drained())
            .unwrap_or_else(PoisonError::into_inner);
        drain.is_drained()
    }

    /// Signal termination and wait for every worker to exit.
    ///
    /// Workers finish their in-flight task first. Calling this again is a
    /// no-op.
    pub fn stop(&mut self) {
        {
            let mut queue = lock(&self.shared.queue);
            queue.terminate = true;
        }
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("hash worker panicked");
            }
        }
    }

    /// Stop the pool and hand back the frozen result table.
    #[must_use]
    pub fn into_results(mut self) -> (ResultTable, PoolStats) {
        self.stop();
        let table = std::mem::take(&mut *lock(&self.shared.results));
        let stats = PoolStats {
            workers: self.started,
            enqueued: self.total_enqueued(),
            completed: self.completed(),
            failed_files: self.shared.failed.load(Ordering::SeqCst),
            bytes_hashed: self.shared.bytes_hashed.load(Ordering::SeqCst),
        };
        (table, stats)
    }
}

impl Drop for HashWorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for HashWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashWorkerPool")
            .field("workers", &self.workers.len())
            .field("enqueued", &self.total_enqueued())
            .field("completed", &self.completed())
            .finish()
    }
}

/// Body of every worker thread.
fn worker_loop(shared: &Shared) {
    let _live = LiveWorker(shared);
    let mut buffer = shared.hasher.new_buffer();

    loop {
        let task = {
            let mut queue = lock(&shared.queue);
            loop {
                if queue.terminate || shared.is_cancelled() {
                    return;
                }
                if let Some(task) = queue.tasks.pop_front() {
                    break task;
                }
                queue = shared
                    .available
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        hash_task(shared, task, &mut buffer);
    }
}

/// Hash one file and publish the result.
fn hash_task(shared: &Shared, path: PathBuf, buffer: &mut [u8]) {
    let outcome = shared.hasher.hash_file(&path, buffer);
    shared
        .bytes_hashed
        .fetch_add(outcome.bytes_read, Ordering::Relaxed);

    let record = match &outcome.error {
        None => true,
        Some(err) => {
            shared.failed.fetch_add(1, Ordering::Relaxed);
            match shared.policy {
                ReadErrorPolicy::Exclude => {
                    log::warn!("{}; excluded from grouping", err);
                    false
                }
                ReadErrorPolicy::HashPartial => {
                    log::warn!("{}; grouping by the {} bytes read", err, outcome.bytes_read);
                    true
                }
            }
        }
    };

    if record {
        log::trace!("{} {}", outcome.digest, path.display());
        lock(&shared.results).insert(outcome.digest, path);
    }

    shared.completed.fetch_add(1, Ordering::SeqCst);

    let mut drain = lock(&shared.drain);
    drain.outstanding = drain.outstanding.saturating_sub(1);
    if drain.outstanding == 0 {
        shared.drained.notify_all();
    }
}
