use super::*;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const KEYS: [&str; 4] = [
    "LEARNPULSE_POLL_INTERVAL_MS",
    "LEARNPULSE_FETCH_TIMEOUT_MS",
    "LEARNPULSE_OFFLINE_AFTER_MS",
    "LEARNPULSE_IMMEDIATE_FIRST",
];

/// # Safety
/// Callers hold `ENV_LOCK` so no other test in this module mutates the env concurrently.
unsafe fn clear_poll_env() {
    for key in KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

// =============================================================================
// from_env
// =============================================================================

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_poll_env() };

    let cfg = PollConfig::from_env().unwrap();
    assert_eq!(cfg, PollConfig::default());
    assert_eq!(cfg.interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
    assert_eq!(cfg.timeout, Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS));
    assert!(cfg.offline_after.is_none());
    assert_eq!(cfg.first_tick, FirstTick::Immediate);
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_poll_env();
        std::env::set_var("LEARNPULSE_POLL_INTERVAL_MS", "10000");
        std::env::set_var("LEARNPULSE_FETCH_TIMEOUT_MS", " 2500 ");
        std::env::set_var("LEARNPULSE_OFFLINE_AFTER_MS", "60000");
        std::env::set_var("LEARNPULSE_IMMEDIATE_FIRST", "false");
    }

    let cfg = PollConfig::from_env().unwrap();
    assert_eq!(cfg.interval, Duration::from_secs(10));
    assert_eq!(cfg.timeout, Duration::from_millis(2500));
    assert_eq!(cfg.offline_after, Some(Duration::from_secs(60)));
    assert_eq!(cfg.first_tick, FirstTick::Deferred);

    unsafe { clear_poll_env() };
}

#[test]
fn from_env_garbage_falls_back_to_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_poll_env();
        std::env::set_var("LEARNPULSE_POLL_INTERVAL_MS", "soon");
        std::env::set_var("LEARNPULSE_IMMEDIATE_FIRST", "maybe");
    }

    let cfg = PollConfig::from_env().unwrap();
    assert_eq!(cfg.interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
    assert_eq!(cfg.first_tick, FirstTick::Immediate);

    unsafe { clear_poll_env() };
}

#[test]
fn from_env_zero_interval_errors() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_poll_env();
        std::env::set_var("LEARNPULSE_POLL_INTERVAL_MS", "0");
    }

    assert_eq!(PollConfig::from_env().unwrap_err(), ConfigError::ZeroInterval);

    unsafe { clear_poll_env() };
}

// =============================================================================
// builders
// =============================================================================

#[test]
fn new_clamps_tiny_interval() {
    let cfg = PollConfig::new(Duration::from_millis(5)).unwrap();
    assert_eq!(cfg.interval, Duration::from_millis(MIN_POLL_INTERVAL_MS));
}

#[test]
fn zero_timeout_rejected() {
    let err = PollConfig::default()
        .with_timeout(Duration::ZERO)
        .unwrap_err();
    assert_eq!(err, ConfigError::ZeroTimeout);
}

#[test]
fn zero_offline_after_disables_offline() {
    let cfg = PollConfig::default().with_offline_after(Some(Duration::ZERO));
    assert!(cfg.offline_after.is_none());
}

#[test]
fn env_parse_missing_returns_default() {
    let val: u64 = env_parse("__LEARNPULSE_TEST_MISSING__", 42);
    assert_eq!(val, 42);
}
