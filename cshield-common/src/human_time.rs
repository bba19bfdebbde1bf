//! Human-readable time and size formatting
//!
//! Shared by the producer and theatre consoles so both render the same
//! countdowns, window timestamps and file sizes.

use chrono::{DateTime, Utc};

/// Countdowns switch from `MM:SS` to `H:MM:SS` at one hour
const HOUR_SECONDS: i64 = 3600;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Format a remaining-time countdown.
///
/// - Below one hour: `MM:SS` (zero-padded minutes)
/// - One hour or more: `H:MM:SS`
/// - Negative values render as `00:00`; a countdown never goes below zero
///
/// # Examples
///
/// ```
/// use cshield_common::human_time::format_countdown;
///
/// assert_eq!(format_countdown(305), "05:05");
/// assert_eq!(format_countdown(45), "00:45");
/// assert_eq!(format_countdown(3725), "1:02:05");
/// assert_eq!(format_countdown(-3), "00:00");
/// ```
pub fn format_countdown(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < HOUR_SECONDS {
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    } else {
        let hours = seconds / HOUR_SECONDS;
        let mins = (seconds % HOUR_SECONDS) / 60;
        let secs = seconds % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    }
}

/// Format a byte count as `B`, `KB` or `MB` with one decimal place.
///
/// # Examples
///
/// ```
/// use cshield_common::human_time::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Short wall-clock label for playback window boundaries (`HH:MM Mon D`)
pub fn format_clock(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M %b %-d").to_string()
}

/// Short time-of-day label for audit entries (`HH:MM`)
pub fn format_time_of_day(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}
