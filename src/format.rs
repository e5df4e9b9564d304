//! Human-readable sizes and durations for the summary lines.

use std::time::Duration;

use bytesize::ByteSize;

/// Format bytes as a human-readable size.
///
/// Decimal units (kB, MB) by default, binary units (KiB, MiB) when `binary`
/// is set.
///
/// # Examples
///
/// ```
/// use xdupes::format::format_size;
///
/// assert_eq!(format_size(1024, true), "1.0 KiB");
/// assert_eq!(format_size(1000, false), "1.0 kB");
/// ```
#[must_use]
pub fn format_size(bytes: u64, binary: bool) -> String {
    let display = ByteSize::b(bytes).display();
    if binary {
        display.iec().to_string()
    } else {
        display.si().to_string()
    }
}

const TIME_UNITS: [&str; 4] = ["ns", "\u{b5}s", "ms", "s"];

/// Format a duration in the largest fitting unit up to seconds.
///
/// Nanoseconds print whole, microseconds with one decimal, milliseconds and
/// seconds with two.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use xdupes::format::format_duration;
///
/// assert_eq!(format_duration(Duration::from_nanos(999)), "999 ns");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50 s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut value = duration.as_nanos() as f64;
    let mut unit = 0;
    while unit < TIME_UNITS.len() - 1 && value >= 1000.0 {
        value /= 1000.0;
        unit += 1;
    }
    let precision = unit.min(2);
    format!("{value:.precision$} {}", TIME_UNITS[unit])
}
