//! Presentational values derived from timer state.
//!
//! Pure functions only; nothing here touches mutable state.

use crate::types::{Method, Phase};

/// Formats seconds as `M:SS`.
///
/// Seconds are zero-padded; minutes are not rolled over into hours.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Parses `M:SS` back into seconds.
///
/// Returns `None` unless the seconds part has exactly two digits below 60.
pub fn parse_duration(text: &str) -> Option<u64> {
    let (minutes, seconds) = text.trim().split_once(':')?;
    if seconds.len() != 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Percentage of the current phase already elapsed, in `[0, 100]`.
///
/// Exactly `0.0` at full remaining time and exactly `100.0` at zero.
pub fn progress_percent(phase: Phase, remaining_seconds: u64, method: &Method) -> f64 {
    let total = method.phase_seconds(phase);
    let remaining = remaining_seconds.min(total);
    (total - remaining) as f64 / total as f64 * 100.0
}

/// Renders a fixed-width text progress bar such as `[####------]`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).floor() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
