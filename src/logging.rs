//! Logger setup for the xdupes binary.
//!
//! Library code only calls the `log` macros. The one `env_logger` instance is
//! built and installed here by `main`, after the configuration is resolved.
//!
//! The threshold comes from `RUST_LOG` when it is set, otherwise from the
//! numeric `loglevel` setting (10 debug, 20 info, 30 warning, 40 error,
//! 50 critical, 60 and above silent). Warnings are shown by default.
//!
//! ```rust,no_run
//! use xdupes::logging::init_logging;
//!
//! init_logging(30);
//! log::warn!("permission denied: /root");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Install the global logger for a numeric level.
///
/// Call once per process. A second call leaves the first logger in place.
pub fn init_logging(level: u32) {
    let rust_log = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    match rust_log {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(level));
        }
    }
    configure_format(&mut builder);

    if builder.try_init().is_err() {
        return;
    }

    match rust_log {
        Some(spec) => log::debug!("Log filter from RUST_LOG={:?}", spec),
        None => log::debug!("Log level {} ({})", level, current_level_name()),
    }
}

/// Map a numeric level onto a `LevelFilter`.
#[must_use]
pub fn determine_level(level: u32) -> LevelFilter {
    match level {
        0..=10 => LevelFilter::Debug,
        11..=20 => LevelFilter::Info,
        21..=30 => LevelFilter::Warn,
        31..=59 => LevelFilter::Error,
        _ => LevelFilter::Off,
    }
}

/// Debug builds add a timestamp and the module path to every line.
fn configure_format(builder: &mut Builder) {
    #[cfg(debug_assertions)]
    {
        builder.format(|buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                timestamp,
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        });
    }

    #[cfg(not(debug_assertions))]
    {
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}

/// Name of the level the installed logger lets through.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
