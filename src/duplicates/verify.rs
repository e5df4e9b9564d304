//! Byte-for-byte confirmation of digest groups.
//!
//! Digest equality is treated as final unless paranoid mode is on. In that
//! mode every group is split into classes of files whose contents compare
//! equal, and only classes with two or more members survive.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::DuplicateGroup;

/// Chunk size for comparisons.
pub const COMPARE_CHUNK_SIZE: usize = 64 * 1024;

/// Which operand of a comparison failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Compare two files byte-for-byte.
///
/// # Errors
///
/// Returns the first I/O error hit while opening or reading either file.
pub fn files_equal(a: &Path, b: &Path) -> io::Result<bool> {
    compare(a, b).map_err(|(_, e)| e)
}

fn compare(a: &Path, b: &Path) -> Result<bool, (Side, io::Error)> {
    let mut fa = File::open(a).map_err(|e| (Side::Left, e))?;
    let mut fb = File::open(b).map_err(|e| (Side::Right, e))?;
    let mut buf_a = vec![0u8; COMPARE_CHUNK_SIZE];
    let mut buf_b = vec![0u8; COMPARE_CHUNK_SIZE];

    loop {
        let na = read_full(&mut fa, &mut buf_a).map_err(|e| (Side::Left, e))?;
        let nb = read_full(&mut fb, &mut buf_b).map_err(|e| (Side::Right, e))?;
        if na != nb || buf_a[..na] != buf_b[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows, returning the byte count.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Split a group into byte-identical sub-groups.
///
/// Paths that cannot be read are logged and dropped. Member order within
/// each sub-group follows the input.
#[must_use]
pub fn verify_group(group: &DuplicateGroup) -> Vec<DuplicateGroup> {
    let mut classes: Vec<Vec<PathBuf>> = Vec::new();
    for path in &group.paths {
        classify(&mut classes, path);
    }

    if classes.len() > 1 {
        log::debug!(
            "Digest {} split into {} classes on byte comparison",
            group.digest,
            classes.len()
        );
    }

    classes
        .into_iter()
        .filter(|class| class.len() >= 2)
        .map(|paths| DuplicateGroup::new(group.digest, group.size, paths))
        .collect()
}

/// Add `path` to the first class whose representative has the same bytes,
/// or open a new class for it.
///
/// A representative that can no longer be read is evicted and the next
/// member of its class takes over.
fn classify(classes: &mut Vec<Vec<PathBuf>>, path: &Path) {
    let mut ix = 0;
    while ix < classes.len() {
        match compare(&classes[ix][0], path) {
            Ok(true) => {
                classes[ix].push(path.to_path_buf());
                return;
            }
            Ok(false) => ix += 1,
            Err((Side::Right, e)) => {
                log::warn!("cannot verify {}: {}", path.display(), e);
                return;
            }
            Err((Side::Left, e)) => {
                let evicted = classes[ix].remove(0);
                log::warn!("cannot verify {}: {}", evicted.display(), e);
                if classes[ix].is_empty() {
                    classes.remove(ix);
                }
            }
        }
    }

    match File::open(path) {
        Ok(_) => classes.push(vec![path.to_path_buf()]),
        Err(e) => log::warn!("cannot verify {}: {}", path.display(), e),
    }
}
