//! Status indicator formatting. Pure presentation, derived entirely from summaries.

use std::time::Duration;

use time::OffsetDateTime;

use crate::dashboard::WidgetSummary;
use crate::poll::Status;

#[must_use]
pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Connected => "Live",
        Status::Syncing => "Syncing",
        Status::Error => "Connection Lost",
        Status::Offline => "Offline",
    }
}

#[must_use]
pub fn status_glyph(status: Status) -> char {
    match status {
        Status::Connected => '●',
        Status::Syncing => '◐',
        Status::Error => '✖',
        Status::Offline => '○',
    }
}

/// `"Ns ago"` under a minute, `"Nm ago"` under an hour, `"Nh ago"` beyond.
/// Whole units only, truncated.
#[must_use]
pub fn format_ago(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Relative time since `last_update`, or `"never"`. Clock skew reads as `0s ago`.
#[must_use]
pub fn ago(last_update: Option<OffsetDateTime>, now: OffsetDateTime) -> String {
    match last_update {
        None => "never".to_owned(),
        Some(at) => format_ago(Duration::try_from(now - at).unwrap_or(Duration::ZERO)),
    }
}

/// One status line per widget, e.g.
/// `leaderboard   ● Live             updated 12s ago   updates 3   records 25`.
#[must_use]
pub fn render_line(summary: &WidgetSummary, now: OffsetDateTime) -> String {
    let mut line = format!(
        "{:<14} {} {:<16} updated {:<8} updates {:<4} records {}",
        summary.name,
        status_glyph(summary.status),
        status_label(summary.status),
        ago(summary.last_update, now),
        summary.update_count,
        summary.record_count,
    );
    if summary.status.is_degraded() {
        if let Some(err) = &summary.last_error {
            line.push_str("  (");
            line.push_str(err);
            line.push(')');
        }
    }
    line
}

#[cfg(test)]
#[path = "indicator_test.rs"]
mod tests;
