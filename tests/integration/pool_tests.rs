use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::tempdir;
use xdupes::duplicates::{resolve_worker_count, HashWorkerPool, PoolConfig};

fn make_files(dir: &std::path::Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("task_{i:04}"));
            fs::write(&path, format!("payload {}", i % 13)).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_zero_threads_uses_half_the_cores() {
    assert_eq!(resolve_worker_count(0, 8), 4);
    assert_eq!(resolve_worker_count(0, 2), 1);
    assert_eq!(resolve_worker_count(0, 3), 1);
}

#[test]
fn test_requested_threads_clamped_to_cores() {
    assert_eq!(resolve_worker_count(100, 8), 8);
    assert_eq!(resolve_worker_count(5, 8), 5);
}

#[test]
fn test_more_tasks_than_workers_no_loss() {
    let dir = tempdir().unwrap();
    let files = make_files(dir.path(), 250);

    let mut pool = HashWorkerPool::new(PoolConfig::default());
    let workers = pool.start(2).unwrap();
    assert!((1..=2).contains(&workers));

    for path in &files {
        pool.enqueue(path.clone()).unwrap();
    }
    pool.join();

    assert_eq!(pool.completed(), 250);
    let (table, stats) = pool.into_results();
    assert_eq!(table.len(), 250);
    assert_eq!(stats.enqueued, 250);

    let recorded: Vec<PathBuf> = table.iter().flat_map(|(_, p)| p.to_vec()).collect();
    let unique: HashSet<_> = recorded.iter().collect();
    assert_eq!(unique.len(), recorded.len(), "no path processed twice");
    assert_eq!(table.digest_count(), 13);
}

#[test]
fn test_enqueue_from_several_threads() {
    let dir = tempdir().unwrap();
    let files = make_files(dir.path(), 120);

    let mut pool = HashWorkerPool::new(PoolConfig::default());
    pool.start(4).unwrap();

    thread::scope(|scope| {
        for chunk in files.chunks(30) {
            let pool = &pool;
            scope.spawn(move || {
                for path in chunk {
                    pool.enqueue(path.clone()).unwrap();
                }
            });
        }
    });
    pool.join();

    assert_eq!(pool.total_enqueued(), 120);
    assert_eq!(pool.completed(), 120);
}

#[test]
fn test_join_timeout_reports_drain() {
    let dir = tempdir().unwrap();
    let files = make_files(dir.path(), 10);

    let mut pool = HashWorkerPool::new(PoolConfig::default());
    pool.start(1).unwrap();
    for path in &files {
        pool.enqueue(path.clone()).unwrap();
    }

    let mut polls = 0;
    while !pool.join_timeout(Duration::from_millis(5)) {
        polls += 1;
        assert!(polls < 2000, "pool never drained");
    }
    assert_eq!(pool.completed(), 10);
}

#[test]
fn test_cancellation_mid_run_unblocks_join() {
    let dir = tempdir().unwrap();
    let files = make_files(dir.path(), 500);
    let flag = Arc::new(AtomicBool::new(false));

    let mut pool = HashWorkerPool::new(PoolConfig::default().with_shutdown_flag(flag.clone()));
    pool.start(2).unwrap();
    for path in &files {
        pool.enqueue(path.clone()).unwrap();
    }
    flag.store(true, Ordering::SeqCst);
    pool.join();

    let (table, stats) = pool.into_results();
    assert!(stats.completed <= 500);
    assert_eq!(table.len(), stats.completed);
}

#[test]
fn test_drop_without_join_stops_workers() {
    let dir = tempdir().unwrap();
    let files = make_files(dir.path(), 5);

    let mut pool = HashWorkerPool::new(PoolConfig::default());
    pool.start(2).unwrap();
    for path in &files {
        pool.enqueue(path.clone()).unwrap();
    }
    drop(pool);
}
