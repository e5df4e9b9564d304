//! Streaming file hasher.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing content digests
//! of whole files using memory-efficient streaming: files are read through a
//! fixed-size buffer and fed to an incremental hash state, so files of any
//! size are hashed in bounded memory.
//!
//! Two algorithms are supported:
//! - [`HashAlgorithm::Xxh3`]: 128-bit XXH3, very fast (default)
//! - [`HashAlgorithm::Blake3`]: 256-bit BLAKE3, cryptographically secure
//!
//! # Example
//!
//! ```no_run
//! use xdupes::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Blake3);
//! let digest = hasher.full_hash(Path::new("some_file.bin")).unwrap();
//! println!("{}", digest);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use super::HashError;

/// Default read buffer size (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Smallest accepted read buffer size (4 KiB).
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

/// Content hash algorithm.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 128-bit XXH3
    #[default]
    Xxh3,
    /// 256-bit BLAKE3
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Xxh3 => write!(f, "xxh3"),
            HashAlgorithm::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Fixed-width digest of a file's full byte stream.
///
/// Used directly as the key of the result table. Digests from different
/// algorithms never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Digest {
    /// XXH3-128 output
    Xxh3(u128),
    /// BLAKE3 output
    Blake3([u8; 32]),
}

impl Digest {
    /// Algorithm that produced this digest.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Digest::Xxh3(_) => HashAlgorithm::Xxh3,
            Digest::Blake3(_) => HashAlgorithm::Blake3,
        }
    }

    /// Digest bytes, big-endian for XXH3.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Digest::Xxh3(value) => value.to_be_bytes().to_vec(),
            Digest::Blake3(bytes) => bytes.to_vec(),
        }
    }

    /// Lowercase hexadecimal representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// How the hash workers treat a file that fails to open or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadErrorPolicy {
    /// Leave the file out of the result table.
    #[default]
    Exclude,
    /// Record the digest of whatever bytes were read before the failure.
    HashPartial,
}

/// Result of hashing one file.
///
/// The digest always covers exactly the `bytes_read` bytes fed to the hash,
/// so on failure it is the digest of a truncated (possibly empty) stream.
#[derive(Debug)]
pub struct HashOutcome {
    /// Digest of the bytes that were read
    pub digest: Digest,
    /// Number of bytes fed to the hash
    pub bytes_read: u64,
    /// The error that stopped reading, if any
    pub error: Option<HashError>,
}

impl HashOutcome {
    /// Whether the whole file was read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Incremental hash state for one file.
enum StreamState {
    Xxh3(Box<Xxh3>),
    Blake3(Box<blake3::Hasher>),
}

impl StreamState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Xxh3 => StreamState::Xxh3(Box::new(Xxh3::new())),
            HashAlgorithm::Blake3 => StreamState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            StreamState::Xxh3(state) => state.update(data),
            StreamState::Blake3(state) => {
                state.update(data);
            }
        }
    }

    fn finalize(self) -> Digest {
        match self {
            StreamState::Xxh3(state) => Digest::Xxh3(state.digest128()),
            StreamState::Blake3(state) => Digest::Blake3(*state.finalize().as_bytes()),
        }
    }
}

/// Streaming file hasher.
///
/// `Hasher` is cheap to clone and holds no per-file state; each worker owns
/// its own read buffer obtained from [`Hasher::new_buffer`].
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the read buffer size, clamped to at least [`MIN_BUFFER_SIZE`].
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured buffer size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Allocate a read buffer of the configured size.
    #[must_use]
    pub fn new_buffer(&self) -> Vec<u8> {
        vec![0u8; self.buffer_size]
    }

    /// Digest an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> Digest {
        let mut state = StreamState::new(self.algorithm);
        state.update(data);
        state.finalize()
    }

    /// Stream-hash a file through `buffer`.
    ///
    /// Never fails outright: open and read errors are reported in
    /// [`HashOutcome::error`] alongside the digest of the bytes read so far.
    pub fn hash_file(&self, path: &Path, buffer: &mut [u8]) -> HashOutcome {
        let mut state = StreamState::new(self.algorithm);
        let mut bytes_read: u64 = 0;

        let error = match File::open(path) {
            Err(e) => Some(HashError::from_io(path.to_path_buf(), 0, e)),
            Ok(mut file) => loop {
                match file.read(buffer) {
                    Ok(0) => break None,
                    Ok(n) => {
                        state.update(&buffer[..n]);
                        bytes_read += n as u64;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => break Some(HashError::from_io(path.to_path_buf(), bytes_read, e)),
                }
            },
        };

        HashOutcome {
            digest: state.finalize(),
            bytes_read,
            error,
        }
    }

    /// Hash an entire file, failing on any I/O error.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or fully read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let mut buffer = self.new_buffer();
        let outcome = self.hash_file(path, &mut buffer);
        match outcome.error {
            Some(err) => Err(err),
            None => Ok(outcome.digest),
        }
    }
}
