//! Writers for the duplicate listing and the trailing summary lines.
//!
//! # Example
//!
//! ```no_run
//! use xdupes::duplicates::{DuplicateFinder, FinderConfig};
//! use xdupes::output::{write_groups, Separator};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (groups, _summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let stdout = std::io::stdout();
//! write_groups(&mut stdout.lock(), &groups, Separator::Newline).unwrap();
//! ```

use std::io::{self, Write};
use std::path::Path;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::format::{format_duration, format_size};

/// Byte written after every path and after every group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// `\n`
    #[default]
    Newline,
    /// `\0`, for `xargs -0`
    Nul,
}

impl Separator {
    /// Pick the separator for the `--zero` flag.
    #[must_use]
    pub fn from_zero_flag(zero: bool) -> Self {
        if zero {
            Self::Nul
        } else {
            Self::Newline
        }
    }

    /// The raw byte.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Newline => b'\n',
            Self::Nul => b'\0',
        }
    }
}

/// Which trailing summary lines to print.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    /// Print the wasted-space line
    pub wasted: bool,
    /// Print the elapsed-time line
    pub timed: bool,
    /// Use binary prefixes for the wasted-space size
    pub binary: bool,
}

/// Write every group: each member path followed by the separator, then one
/// more separator to end the group.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_groups<W: Write>(
    writer: &mut W,
    groups: &[DuplicateGroup],
    separator: Separator,
) -> io::Result<()> {
    let sep = [separator.as_byte()];
    for group in groups {
        for path in &group.paths {
            write_path(writer, path)?;
            writer.write_all(&sep)?;
        }
        writer.write_all(&sep)?;
    }
    writer.flush()
}

/// Write a path exactly as the filesystem stores it.
#[cfg(unix)]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    writer.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    write!(writer, "{}", path.display())
}

/// Write the wasted-space and elapsed-time lines selected by `opts`.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    summary: &ScanSummary,
    opts: SummaryOptions,
) -> io::Result<()> {
    if opts.wasted {
        writeln!(
            writer,
            "Wasted space from duplicate files: {}",
            format_size(summary.wasted_space, opts.binary)
        )?;
    }
    if opts.timed {
        writeln!(
            writer,
            "Elapsed time: {}",
            format_duration(summary.total_duration)
        )?;
    }
    writer.flush()
}

/// Treat a closed downstream pipe as a normal end of output.
///
/// # Errors
///
/// Passes through every error other than [`io::ErrorKind::BrokenPipe`].
pub fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("Output pipe closed");
            Ok(())
        }
        other => other,
    }
}
