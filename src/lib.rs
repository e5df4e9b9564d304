//! xdupes - Fast concurrent duplicate file finder
//!
//! Walks one or more source directories, discards every file whose size is
//! unique, hashes the rest on a fixed pool of worker threads, and reports
//! each group of files with identical content.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod format;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::{Config, ConfigError};
use crate::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig, ScanSummary};
use crate::error::ExitCode;
use crate::output::{ignore_broken_pipe, write_groups, write_summary, Separator, SummaryOptions};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::WalkerConfig;

/// Resolve the effective configuration for a command line.
///
/// # Errors
///
/// Returns [`ConfigError`] if a config layer is malformed or `--threads`
/// is not a non-negative integer.
pub fn resolve_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(cli)?;
    Ok(config)
}

/// Build the finder configuration from resolved settings.
#[must_use]
pub fn finder_config(config: &Config) -> FinderConfig {
    FinderConfig::default()
        .with_threads(config.threads)
        .with_walker_config(WalkerConfig::new(config.recursive))
        .with_skip_empty(config.skip_empty)
        .with_hasher(config.hasher())
        .with_read_error_policy(config.read_error_policy())
        .with_paranoid(config.paranoid)
}

/// Run a scan and print its results.
///
/// The logger is expected to be installed by the caller.
///
/// # Errors
///
/// Returns an error if no sources were given, the scan was interrupted or
/// failed, or stdout could not be written.
pub fn run_app(cli: &Cli, config: &Config) -> Result<ExitCode> {
    if cli.sources.is_empty() {
        anyhow::bail!("missing SOURCE(s) arguments");
    }

    let handler = match signal::install_handler() {
        Ok(handler) => handler,
        Err(e) => {
            log::warn!("{}; Ctrl+C will not stop the scan cleanly", e);
            signal::create_handler()
        }
    };

    let mut finder_config = finder_config(config).with_shutdown_flag(handler.get_flag());
    if cli.progress && !cli.silent {
        let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(false));
        finder_config = finder_config.with_progress_callback(progress);
    }
    log::debug!("{:?}", finder_config);

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder.find_duplicates(&cli.sources)?;

    if cli.silent {
        return Ok(ExitCode::Success);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    ignore_broken_pipe(print_results(&mut out, cli, config, &groups, &summary))
        .context("failed to write results")?;

    Ok(ExitCode::Success)
}

fn print_results<W: Write>(
    out: &mut W,
    cli: &Cli,
    config: &Config,
    groups: &[DuplicateGroup],
    summary: &ScanSummary,
) -> io::Result<()> {
    if cli.shows_listing() {
        write_groups(out, groups, Separator::from_zero_flag(cli.zero))?;
    }
    let opts = SummaryOptions {
        wasted: cli.wasted,
        timed: cli.timed,
        binary: config.binary,
    };
    write_summary(out, summary, opts)?;
    out.flush()
}
