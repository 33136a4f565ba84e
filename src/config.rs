//! Poll configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a compiled-in default. Unparseable values fall back to the
//! default rather than failing startup; only values that would make a session
//! meaningless (a zero interval) are rejected.

use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 15_000;
pub const MIN_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("poll interval must be positive")]
    ZeroInterval,
    #[error("fetch timeout must be positive")]
    ZeroTimeout,
    #[error("unknown time range: {0} (expected week, month, quarter or all)")]
    UnknownTimeRange(String),
    #[error("unknown record kind: {0} (expected leaderboard, sync, activity or raw)")]
    UnknownRecordKind(String),
}

// =============================================================================
// POLL CONFIG
// =============================================================================

/// Whether a session fetches on activation or waits one full interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstTick {
    #[default]
    Immediate,
    Deferred,
}

/// Timing knobs for one poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Fixed period between fetches.
    pub interval: Duration,
    /// Deadline for a single fetch; exceeding it counts as a failure.
    pub timeout: Duration,
    /// Failures after this much silence report `offline` instead of `error`.
    pub offline_after: Option<Duration>,
    pub first_tick: FirstTick,
}

impl PollConfig {
    /// Build a config with the given interval and default timeout.
    ///
    /// Intervals below [`MIN_POLL_INTERVAL_MS`] are raised to it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] for a zero interval.
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            interval: clamp_interval(interval)?,
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            offline_after: None,
            first_tick: FirstTick::Immediate,
        })
    }

    /// Build typed poll config from environment variables.
    ///
    /// Optional:
    /// - `LEARNPULSE_POLL_INTERVAL_MS`: default 15000
    /// - `LEARNPULSE_FETCH_TIMEOUT_MS`: default 10000
    /// - `LEARNPULSE_OFFLINE_AFTER_MS`: unset or 0 disables the offline state
    /// - `LEARNPULSE_IMMEDIATE_FIRST`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns an error if the interval or timeout is explicitly set to zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let interval_ms = env_parse("LEARNPULSE_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS);
        let timeout_ms = env_parse("LEARNPULSE_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS);
        let offline_after_ms = env_parse("LEARNPULSE_OFFLINE_AFTER_MS", 0_u64);
        let immediate = env_parse("LEARNPULSE_IMMEDIATE_FIRST", true);

        let first_tick = if immediate { FirstTick::Immediate } else { FirstTick::Deferred };
        let config = Self::new(Duration::from_millis(interval_ms))?
            .with_timeout(Duration::from_millis(timeout_ms))?
            .with_offline_after(Some(Duration::from_millis(offline_after_ms)))
            .with_first_tick(first_tick);
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    #[must_use]
    pub fn with_offline_after(mut self, offline_after: Option<Duration>) -> Self {
        self.offline_after = offline_after.filter(|d| !d.is_zero());
        self
    }

    #[must_use]
    pub fn with_first_tick(mut self, first_tick: FirstTick) -> Self {
        self.first_tick = first_tick;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] for a zero interval.
    pub fn with_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        self.interval = clamp_interval(interval)?;
        Ok(self)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            offline_after: None,
            first_tick: FirstTick::Immediate,
        }
    }
}

fn clamp_interval(interval: Duration) -> Result<Duration, ConfigError> {
    if interval.is_zero() {
        return Err(ConfigError::ZeroInterval);
    }
    Ok(interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS)))
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
