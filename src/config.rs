//! Application configuration management.
//!
//! Settings are layered, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. `XDUPES_*` environment variables
//! 4. command-line flags

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{parse_thread_count, Cli};
use crate::scanner::{HashAlgorithm, Hasher, ReadErrorPolicy, DEFAULT_BUFFER_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "XDUPES_";

/// Default numeric log level (warning).
pub const DEFAULT_LOGLEVEL: u32 = 30;

/// Errors raised while resolving configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A config file or environment value could not be parsed.
    #[error("invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The thread count flag was malformed.
    #[error("{0}")]
    InvalidThreads(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker count; `0` means half the available cores.
    pub threads: usize,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Ignore empty files.
    pub skip_empty: bool,
    /// Binary prefixes for sizes.
    pub binary: bool,
    /// Content hash algorithm.
    pub hash: HashAlgorithm,
    /// Byte-for-byte verification of every group.
    pub paranoid: bool,
    /// Hash unreadable files as truncated streams.
    pub hash_unreadable: bool,
    /// Numeric log level.
    pub loglevel: u32,
    /// Per-worker read buffer in bytes.
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 1,
            recursive: false,
            skip_empty: false,
            binary: false,
            hash: HashAlgorithm::default(),
            paranoid: false,
            hash_unreadable: false,
            loglevel: DEFAULT_LOGLEVEL,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Load defaults, the config file, and the environment.
    ///
    /// An explicit `path` must parse. Without one, the default file is used
    /// only if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if an explicit `path` is missing and
    /// [`ConfigError::Load`] if a file or environment value is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        Self::figment(file.as_deref()).extract().map_err(ConfigError::from)
    }

    /// Load from a specific file without consulting the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file is malformed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(ConfigError::from)
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            log::debug!("Loading config from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "xdupes", "xdupes")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply explicit command-line flags on top of the loaded layers.
    ///
    /// Boolean flags only ever switch a setting on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThreads`] for a malformed `--threads`.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(ref threads) = cli.threads {
            self.threads = parse_thread_count(threads).map_err(ConfigError::InvalidThreads)?;
        }
        if let Some(level) = cli.requested_loglevel() {
            self.loglevel = level;
        }
        if let Some(hash) = cli.hash {
            self.hash = hash;
        }
        self.recursive |= cli.recursive;
        self.skip_empty |= cli.skip_empty;
        self.binary |= cli.binary;
        self.paranoid |= cli.paranoid;
        self.hash_unreadable |= cli.hash_unreadable;
        Ok(())
    }

    /// Read error policy selected by `hash_unreadable`.
    #[must_use]
    pub fn read_error_policy(&self) -> ReadErrorPolicy {
        if self.hash_unreadable {
            ReadErrorPolicy::HashPartial
        } else {
            ReadErrorPolicy::Exclude
        }
    }

    /// Hasher for the configured algorithm and buffer size.
    #[must_use]
    pub fn hasher(&self) -> Hasher {
        Hasher::new(self.hash).with_buffer_size(self.buffer_size)
    }
}
