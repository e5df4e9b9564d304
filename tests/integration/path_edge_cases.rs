use std::fs;

use tempfile::tempdir;
use xdupes::duplicates::{DuplicateFinder, FinderConfig};
use xdupes::scanner::ReadErrorPolicy;

#[cfg(unix)]
#[test]
fn test_symlinked_subdirectory_not_followed() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("x"), "linked dup").unwrap();
    fs::write(outside.path().join("y"), "linked dup").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(true));
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_walked, 0);
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_not_counted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real"), "content").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_walked, 1);
}

#[test]
fn test_unicode_and_space_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("résumé final.txt"), "same text").unwrap();
    fs::write(dir.path().join("日本語 copy.txt"), "same text").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_empty_files_form_group_without_waste() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("e1"), "").unwrap();
    fs::write(dir.path().join("e2"), "").unwrap();
    fs::write(dir.path().join("e3"), "").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.wasted_space, 0);
}

#[cfg(unix)]
fn permissions_are_bypassed() -> bool {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::write(&locked, "p").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    fs::read(&locked).is_ok()
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_policy() {
    use std::os::unix::fs::PermissionsExt;

    if permissions_are_bypassed() {
        return;
    }

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ok1"), "").unwrap();
    fs::write(dir.path().join("ok2"), "").unwrap();
    let locked = dir.path().join("locked");
    fs::write(&locked, "").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let roots = [dir.path().to_path_buf()];

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();
    assert_eq!(summary.failed_reads, 1);
    assert_eq!(groups[0].len(), 2);

    let finder = DuplicateFinder::new(
        FinderConfig::default().with_read_error_policy(ReadErrorPolicy::HashPartial),
    );
    let (groups, summary) = finder.find_duplicates(&roots).unwrap();
    assert_eq!(summary.failed_reads, 1);
    assert_eq!(groups[0].len(), 3);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
