//! Display helpers for clocks and totals.

/// Countdown clock, `MM:SS`. Minutes are not wrapped at an hour.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Stopwatch clock, `HH:MM:SS`.
pub fn format_stopwatch(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Minute total, `Xh Ym`.
pub fn format_hours_minutes(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
