//! Four-state connection status and the events that move it.
//!
//! DESIGN
//! ======
//! The resolver is a pure transition function. The store feeds it events and
//! owns the result, so the rules can be tested without timers or I/O.
//!
//! ```text
//!   * --FetchStarted-----> syncing
//!   * --FetchSucceeded---> connected
//!   * --FetchFailed------> error
//!   * --SilenceExceeded--> offline
//!   * --Disconnect-------> offline
//!   * --Reconnect--------> connected
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Connected,
    Syncing,
    Error,
    Offline,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Syncing => "syncing",
            Self::Error => "error",
            Self::Offline => "offline",
        }
    }

    /// True when the last applied attempt failed or the session is disconnected.
    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Error | Self::Offline)
    }

    /// Apply one event. Every event has a single target state, whatever the source.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn next(self, event: StatusEvent) -> Self {
        match event {
            StatusEvent::FetchStarted => Self::Syncing,
            StatusEvent::FetchSucceeded | StatusEvent::Reconnect => Self::Connected,
            StatusEvent::FetchFailed => Self::Error,
            StatusEvent::SilenceExceeded | StatusEvent::Disconnect => Self::Offline,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    FetchStarted,
    FetchSucceeded,
    FetchFailed,
    /// A fetch failed and nothing has succeeded for longer than the offline threshold.
    SilenceExceeded,
    /// External disconnect signal.
    Disconnect,
    /// Manual reconnect.
    Reconnect,
}

/// Classify a failed fetch as plain `FetchFailed` or `SilenceExceeded`.
///
/// Silence is measured from the last success, or from session start if
/// nothing has succeeded yet. Without a threshold, failures are never offline.
#[must_use]
pub fn failure_event(
    last_success_at: Option<Instant>,
    started_at: Instant,
    now: Instant,
    offline_after: Option<Duration>,
) -> StatusEvent {
    let Some(threshold) = offline_after else {
        return StatusEvent::FetchFailed;
    };
    let since = last_success_at.unwrap_or(started_at);
    if now.saturating_duration_since(since) >= threshold {
        StatusEvent::SilenceExceeded
    } else {
        StatusEvent::FetchFailed
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
