use std::fs;

use tempfile::tempdir;
use xdupes::duplicates::{DuplicateFinder, FinderConfig};
use xdupes::scanner::ScanError;

#[test]
fn test_duplicates_across_roots() {
    let left = tempdir().unwrap();
    let right = tempdir().unwrap();
    fs::write(left.path().join("photo.jpg"), "jpeg bytes").unwrap();
    fs::write(right.path().join("copy.jpg"), "jpeg bytes").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let roots = vec![left.path().to_path_buf(), right.path().to_path_buf()];
    let (groups, summary) = finder.find_duplicates(&roots).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.files_walked, 2);
}

#[test]
fn test_nested_root_is_absorbed() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(sub.join("b"), "same").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(true));
    let roots = vec![sub.clone(), dir.path().to_path_buf()];
    let (groups, summary) = finder.find_duplicates(&roots).unwrap();

    assert_eq!(summary.files_walked, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_same_root_with_trailing_separator() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(dir.path().join("b"), "same").unwrap();

    let with_slash = format!("{}/", dir.path().display());
    let roots = vec![dir.path().to_path_buf(), with_slash.into()];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(summary.files_walked, 2);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_missing_and_file_roots_are_warnings() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "not a dir").unwrap();

    let roots = vec![dir.path().join("nope"), file];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);
    assert!(summary
        .scan_errors
        .iter()
        .any(|e| matches!(e, ScanError::NotFound(_))));
    assert!(summary
        .scan_errors
        .iter()
        .any(|e| matches!(e, ScanError::NotADirectory(_))));
}
