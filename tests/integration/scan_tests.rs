use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use tempfile::tempdir;
use xdupes::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig};
use xdupes::scanner::{HashAlgorithm, Hasher, ReadErrorPolicy};

fn sorted_groups(groups: &[DuplicateGroup]) -> HashSet<Vec<PathBuf>> {
    groups
        .iter()
        .map(|g| {
            let mut paths = g.paths.clone();
            paths.sort();
            paths
        })
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_walked, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.wasted_space, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("a.txt"))
        .unwrap()
        .write_all(b"content a")
        .unwrap();
    File::create(dir.path().join("b.txt"))
        .unwrap()
        .write_all(b"content bb")
        .unwrap();
    File::create(dir.path().join("c.txt"))
        .unwrap()
        .write_all(b"content ccc")
        .unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_walked, 3);
    assert_eq!(summary.files_hashed, 0);
    assert_eq!(summary.eliminated_by_size, 3);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "aaaa").unwrap();
    fs::write(dir.path().join("b"), "bbbb").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_hashed, 2);
}

#[test]
fn test_scan_reference_scenario() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "x".repeat(100)).unwrap();
    fs::write(dir.path().join("b"), "x".repeat(100)).unwrap();
    fs::write(dir.path().join("c"), "y".repeat(100)).unwrap();
    fs::write(dir.path().join("d"), "z".repeat(50)).unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_skip_empty(true));
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    let expected: HashSet<_> = [vec![dir.path().join("a"), dir.path().join("b")]].into();
    assert_eq!(sorted_groups(&groups), expected);
    assert_eq!(summary.wasted_space, 100);
}

#[test]
fn test_scan_groups_of_three() {
    let dir = tempdir().unwrap();
    for name in ["one", "two", "three"] {
        fs::write(dir.path().join(name), [9u8; 2048]).unwrap();
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_threads(2));
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.wasted_space, 4096);
}

#[test]
fn test_scan_nested_directories_recursive() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    let deeper = sub.join("deeper");
    fs::create_dir_all(&deeper).unwrap();

    fs::write(dir.path().join("a.txt"), "nested dup").unwrap();
    fs::write(sub.join("b.txt"), "nested dup").unwrap();
    fs::write(deeper.join("c.txt"), "nested dup").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(true));
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.files_walked, 3);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("f{i}")), format!("{:06}", i % 4)).unwrap();
    }
    let roots = [dir.path().to_path_buf()];
    let finder = DuplicateFinder::new(FinderConfig::default().with_threads(3));

    let (first, _) = finder.find_duplicates(&roots).unwrap();
    let (second, _) = finder.find_duplicates(&roots).unwrap();

    assert_eq!(sorted_groups(&first), sorted_groups(&second));
    assert_eq!(first.len(), 4);
}

#[test]
fn test_scan_algorithms_agree() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        fs::write(dir.path().join(format!("f{i}")), format!("{:04}", i % 3)).unwrap();
    }
    let roots = [dir.path().to_path_buf()];

    let xxh3 = DuplicateFinder::new(
        FinderConfig::default().with_hasher(Hasher::new(HashAlgorithm::Xxh3)),
    );
    let blake3 = DuplicateFinder::new(
        FinderConfig::default().with_hasher(Hasher::new(HashAlgorithm::Blake3)),
    );

    let (a, _) = xxh3.find_duplicates(&roots).unwrap();
    let (b, _) = blake3.find_duplicates(&roots).unwrap();
    assert_eq!(sorted_groups(&a), sorted_groups(&b));
}

#[test]
fn test_scan_small_buffer_matches_default() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(dir.path().join("a"), &data).unwrap();
    fs::write(dir.path().join("b"), &data).unwrap();
    let roots = [dir.path().to_path_buf()];

    let finder = DuplicateFinder::new(
        FinderConfig::default().with_hasher(Hasher::default().with_buffer_size(4096)),
    );
    let (groups, summary) = finder.find_duplicates(&roots).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.bytes_hashed, 100_000);
}

#[test]
fn test_scan_paranoid_mode() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(dir.path().join("b"), "same").unwrap();
    fs::write(dir.path().join("c"), "diff").unwrap();

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_paranoid(true)
            .with_read_error_policy(ReadErrorPolicy::Exclude),
    );
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.wasted_space, 4);
}
