//! Display formatting for timestamps and durations.

/// Formats a media-clock position as `HH:MM:SS`.
///
/// Negative positions clamp to zero; fractional seconds are truncated.
pub fn timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Formats an elapsed runtime as `MM:SS`. Minutes are not capped.
pub fn elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Human phrasing of a duration, e.g. `3m 25s`.
pub fn duration_phrase(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}
