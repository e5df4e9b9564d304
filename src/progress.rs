//! Progress reporting using indicatif.
//!
//! This module provides the [`Progress`] struct, which implements
//! [`ProgressCallback`] and draws to stderr: a spinner counting walked files,
//! then a bar tracking completed hash tasks, then a bar for paranoid
//! verification. The finder drives it by polling the pool, so nothing here
//! runs on a worker thread.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Stage of a duplicate scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Directory traversal and size indexing
    Walking,
    /// Content hashing in the worker pool
    Hashing,
    /// Byte-for-byte comparison of digest groups
    Verifying,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Walking => "walking",
            Self::Hashing => "hashing",
            Self::Verifying => "verifying",
        };
        f.write_str(name)
    }
}

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during a scan.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - The phase starting
    /// * `total` - Number of items to process, `0` when unknown
    fn on_phase_start(&self, phase: Phase, total: usize);

    /// Called with the number of items processed so far in the current phase.
    fn on_progress(&self, current: usize);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: Phase);

    /// Called when the scan is interrupted; any drawn state should be removed.
    fn on_interrupt(&self) {}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Progress reporter drawing to stderr.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `hidden` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use xdupes::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// assert!(progress.is_hidden());
    /// ```
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        let target = if hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        Self {
            multi: MultiProgress::with_draw_target(target),
            active: Mutex::new(None),
            hidden,
        }
    }

    /// Whether drawing is disabled.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Spinner for the walking phase.
    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    /// Bar for the hashing and verifying phases.
    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn replace_active(&self, bar: Option<ProgressBar>) -> Option<ProgressBar> {
        std::mem::replace(&mut *lock(&self.active), bar)
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: Phase, total: usize) {
        if self.hidden {
            return;
        }

        let pb = match phase {
            Phase::Walking => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            Phase::Hashing | Phase::Verifying => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_message(if phase == Phase::Hashing {
                    "Hashing"
                } else {
                    "Verifying"
                });
                pb
            }
        };

        if let Some(previous) = self.replace_active(Some(pb)) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize) {
        if let Some(ref pb) = *lock(&self.active) {
            pb.set_position(current as u64);
        }
    }

    fn on_phase_end(&self, _phase: Phase) {
        if let Some(pb) = self.replace_active(None) {
            pb.finish_and_clear();
        }
    }

    fn on_interrupt(&self) {
        if let Some(pb) = self.replace_active(None) {
            pb.abandon();
        }
        let _ = self.multi.clear();
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("hidden", &self.hidden)
            .finish()
    }
}
