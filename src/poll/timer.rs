//! Fixed-period tick driver.
//!
//! DESIGN
//! ======
//! One task per session. Each tick asks the callback for a unit of work and
//! spawns it into a `JoinSet` owned by the task, so a fetch slower than the
//! interval never delays the cadence. Aborting the task drops the `JoinSet`,
//! which aborts every in-flight fetch with it.
//!
//! Missed ticks are skipped, never bursted. There is no backoff or jitter.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::warn;

use crate::config::FirstTick;

/// Owned handle to a running timer. Dropping it cancels the timer.
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a timer that calls `on_tick` every `period`, and additionally each
/// time `refresh` is notified. Must be called from within a tokio runtime.
pub fn spawn_timer<F, Fut>(period: Duration, first_tick: FirstTick, refresh: Arc<Notify>, mut on_tick: F) -> TimerHandle
where
    F: FnMut() -> Option<Fut> + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let start = match first_tick {
        FirstTick::Immediate => Instant::now(),
        FirstTick::Deferred => Instant::now() + period,
    };

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = refresh.notified() => {}
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(error = %e, "tick work panicked");
                        }
                    }
                    continue;
                }
            }

            if let Some(work) = on_tick() {
                in_flight.spawn(work);
            }
        }
    });

    TimerHandle { task }
}

#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;
