//! Two-stage Ctrl+C handling.
//!
//! The first interrupt sets a shared flag. The walker checks it between
//! directory entries and hash workers check it before taking the next task,
//! so the scan winds down cooperatively and `main` exits with code 130.
//!
//! A second interrupt means the cooperative stop is not fast enough: the
//! handler restores the cursor and exits with code 130 immediately.
//!
//! ```rust,no_run
//! use xdupes::signal::install_handler;
//! use xdupes::duplicates::FinderConfig;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::ExitCode;

/// Show the cursor and clear the current line.
const RESTORE_TERMINAL: &str = "\x1b[?25h\r\x1b[2K";

/// What the process should do about an incoming interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First interrupt: let the scan stop on its own.
    Cooperative,
    /// Repeated interrupt: leave now.
    HardStop,
}

/// Owner of the shutdown flag shared with the scan.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with the flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interrupt has been received.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the flag. Returns `true` if it was already set.
    pub fn request_shutdown(&self) -> bool {
        self.flag.swap(true, Ordering::SeqCst)
    }

    /// The flag itself, for [`FinderConfig::with_shutdown_flag`].
    ///
    /// [`FinderConfig::with_shutdown_flag`]: crate::duplicates::FinderConfig::with_shutdown_flag
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag so the handler can serve another scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Record an interrupt and decide how to react to it.
    pub fn on_signal(&self) -> SignalAction {
        if self.request_shutdown() {
            SignalAction::HardStop
        } else {
            SignalAction::Cooperative
        }
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static INSTALLED: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// `ctrlc` accepts a single handler per process, so later calls hand back
/// the installed one with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another component already owns
/// the process signal handler.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = INSTALLED.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let hook = handler.clone();

    ctrlc::set_handler(move || {
        let mut stderr = std::io::stderr();
        match hook.on_signal() {
            SignalAction::HardStop => {
                let _ = writeln!(stderr, "{}Cancelled by user...", RESTORE_TERMINAL);
                let _ = stderr.flush();
                std::process::exit(ExitCode::Interrupted.as_i32());
            }
            SignalAction::Cooperative => {
                let _ = writeln!(stderr, "\nInterrupted, finishing in-flight files...");
                let _ = stderr.flush();
                log::info!("Shutdown signal received");
            }
        }
    })?;

    let _ = INSTALLED.set(handler.clone());
    Ok(handler)
}

/// Create a handler without installing any signal hooks.
///
/// Used when installation fails: the scan still runs, it just cannot be
/// stopped cooperatively.
///
/// ```
/// use xdupes::signal::create_handler;
/// let handler = create_handler();
/// assert!(!handler.is_shutdown_requested());
/// ```
#[must_use]
pub fn create_handler() -> ShutdownHandler {
    ShutdownHandler::new()
}
