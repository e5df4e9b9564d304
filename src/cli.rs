//! Command-line interface definitions for xdupes.
//!
//! This module defines all CLI arguments using the clap derive API. Every
//! engine setting is optional here so that values from the config file and
//! environment apply unless a flag overrides them.
//!
//! # Example
//!
//! ```bash
//! # List duplicates directly under two folders
//! xdupes ~/Downloads ~/Desktop
//!
//! # Recurse with four workers, ignore empty files, report wasted space
//! xdupes -r -t 4 --skip-empty --wasted ~/Pictures
//!
//! # Feed the listing to xargs
//! xdupes -r --zero ~/Music | xargs -0 ls -l
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Numeric log level for `--debug`.
pub const DEBUG_LOGLEVEL: u32 = 10;

/// Fast concurrent duplicate file finder.
///
/// Groups files under the given source directories by identical content and
/// prints each group of duplicates. Only files sharing an exact size are read.
#[derive(Debug, Parser)]
#[command(name = "xdupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source directories to search
    #[arg(value_name = "SOURCES")]
    pub sources: Vec<PathBuf>,

    /// How many threads to use (0 = half the available cores)
    ///
    /// Defaults to 1. Values above the core count are clamped.
    #[arg(short, long, value_name = "N", allow_hyphen_values = true)]
    pub threads: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Ignore empty files
    #[arg(long, visible_alias = "noempty")]
    pub skip_empty: bool,

    /// Use binary prefixes (KiB, MiB) for sizes
    #[arg(long, visible_alias = "si")]
    pub binary: bool,

    /// Separate paths with NUL instead of newline
    #[arg(long)]
    pub zero: bool,

    /// Hide the duplicate listing
    #[arg(short, long)]
    pub quiet: bool,

    /// Hide all output on stdout
    #[arg(short, long)]
    pub silent: bool,

    /// Numeric log level (10 debug, 20 info, 30 warning, 40 error, 50 critical)
    #[arg(long, value_name = "LEVEL")]
    pub loglevel: Option<u32>,

    /// Shorthand for --loglevel 10
    #[arg(long)]
    pub debug: bool,

    /// Show progress bars on stderr
    #[arg(long)]
    pub progress: bool,

    /// Print the elapsed time
    #[arg(long)]
    pub timed: bool,

    /// Print the total space taken by duplicate copies
    #[arg(long, visible_alias = "wasted-space")]
    pub wasted: bool,

    /// Content hash algorithm
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub hash: Option<HashAlgorithm>,

    /// Confirm every group byte-for-byte after hashing
    ///
    /// Slower but rules out hash collisions.
    #[arg(long)]
    pub paranoid: bool,

    /// Hash unreadable files as the bytes read so far instead of skipping them
    #[arg(long)]
    pub hash_unreadable: bool,

    /// Path to a TOML config file
    ///
    /// If not specified, a default platform-specific path is used when it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Log level requested on the command line, if any.
    ///
    /// `--debug` wins over `--loglevel`.
    #[must_use]
    pub fn requested_loglevel(&self) -> Option<u32> {
        if self.debug {
            Some(DEBUG_LOGLEVEL)
        } else {
            self.loglevel
        }
    }

    /// Whether the duplicate listing is printed.
    #[must_use]
    pub fn shows_listing(&self) -> bool {
        !self.quiet && !self.silent
    }
}

/// Parse a thread count.
///
/// Only a non-empty run of ASCII digits is accepted, so signs, spaces, and
/// fractions are rejected.
///
/// # Errors
///
/// Returns a message suitable for the log when the value is malformed or
/// does not fit in `usize`.
pub fn parse_thread_count(s: &str) -> Result<usize, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "threads must be a non-negative integer, got {:?}",
            s
        ));
    }
    s.parse::<usize>()
        .map_err(|_| format!("thread count out of range: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thread_count_valid() {
        assert_eq!(parse_thread_count("0").unwrap(), 0);
        assert_eq!(parse_thread_count("1").unwrap(), 1);
        assert_eq!(parse_thread_count("16").unwrap(), 16);
        assert_eq!(parse_thread_count("007").unwrap(), 7);
    }

    #[test]
    fn test_parse_thread_count_errors() {
        assert!(parse_thread_count("").is_err());
        assert!(parse_thread_count("-1").is_err());
        assert!(parse_thread_count("+4").is_err());
        assert!(parse_thread_count("four").is_err());
        assert!(parse_thread_count(" 4").is_err());
        assert!(parse_thread_count("1.5").is_err());
        assert!(parse_thread_count("99999999999999999999999999").is_err());
    }

    #[test]
    fn test_cli_parse_help() {
        let result = Cli::try_parse_from(["xdupes", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_basic() {
        let cli = Cli::try_parse_from(["xdupes", "/some/path"]).unwrap();
        assert_eq!(cli.sources, vec![PathBuf::from("/some/path")]);
        assert!(cli.threads.is_none());
        assert!(!cli.recursive);
        assert!(cli.shows_listing());
        assert_eq!(cli.requested_loglevel(), None);
    }

    #[test]
    fn test_cli_parse_no_sources() {
        let cli = Cli::try_parse_from(["xdupes"]).unwrap();
        assert!(cli.sources.is_empty());
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "xdupes",
            "-t",
            "4",
            "-r",
            "--skip-empty",
            "--binary",
            "--zero",
            "-q",
            "-s",
            "--loglevel",
            "20",
            "--progress",
            "--timed",
            "--wasted",
            "--hash",
            "blake3",
            "--paranoid",
            "--hash-unreadable",
            "--config",
            "/etc/xdupes.toml",
            "--json-errors",
            "/a",
            "/b",
        ])
        .unwrap();

        assert_eq!(cli.threads.as_deref(), Some("4"));
        assert!(cli.recursive);
        assert!(cli.skip_empty);
        assert!(cli.binary);
        assert!(cli.zero);
        assert!(cli.quiet);
        assert!(cli.silent);
        assert_eq!(cli.requested_loglevel(), Some(20));
        assert!(cli.progress);
        assert!(cli.timed);
        assert!(cli.wasted);
        assert_eq!(cli.hash, Some(HashAlgorithm::Blake3));
        assert!(cli.paranoid);
        assert!(cli.hash_unreadable);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/xdupes.toml")));
        assert!(cli.json_errors);
        assert_eq!(cli.sources.len(), 2);
        assert!(!cli.shows_listing());
    }

    #[test]
    fn test_cli_aliases() {
        let cli =
            Cli::try_parse_from(["xdupes", "--noempty", "--si", "--wasted-space", "/a"]).unwrap();
        assert!(cli.skip_empty);
        assert!(cli.binary);
        assert!(cli.wasted);
    }

    #[test]
    fn test_cli_debug_overrides_loglevel() {
        let cli = Cli::try_parse_from(["xdupes", "--loglevel", "40", "--debug", "/a"]).unwrap();
        assert_eq!(cli.requested_loglevel(), Some(DEBUG_LOGLEVEL));
    }

    #[test]
    fn test_cli_malformed_threads_parses_as_string() {
        let cli = Cli::try_parse_from(["xdupes", "-t", "lots", "/a"]).unwrap();
        assert_eq!(cli.threads.as_deref(), Some("lots"));
    }

    #[test]
    fn test_cli_negative_threads_reach_validation() {
        let cli = Cli::try_parse_from(["xdupes", "-t", "-1", "/a"]).unwrap();
        assert_eq!(cli.threads.as_deref(), Some("-1"));
        assert_eq!(cli.sources, vec![PathBuf::from("/a")]);
        assert!(parse_thread_count("-1").is_err());
    }

    #[test]
    fn test_cli_invalid_hash() {
        assert!(Cli::try_parse_from(["xdupes", "--hash", "md5", "/a"]).is_err());
    }

    #[test]
    fn test_cli_version_flag() {
        let result = Cli::try_parse_from(["xdupes", "--version"]);
        assert!(result.is_err());
    }
}
