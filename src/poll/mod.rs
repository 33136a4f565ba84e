//! Poll sessions: one live-status subscription per dashboard widget.
//!
//! DESIGN
//! ======
//! `PollSession` is an owned handle. Creating it spawns the timer; dropping it
//! (or calling `stop`) aborts the timer and every in-flight fetch, then closes
//! the store so any completion that still slips through is discarded.
//!
//! Sessions share nothing. Each owns its source, filters, store and timer.
//!
//! ERROR HANDLING
//! ==============
//! Fetch failures never leave the session. They are logged and applied to the
//! store as `error`/`offline` transitions; the next tick is the retry.

pub mod status;
mod store;
pub mod timer;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::{Notify, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{FirstTick, PollConfig};
use crate::fetch::{Filters, RecordSource, fetch_records, millis};
use crate::records::Record;
pub use status::{Status, StatusEvent};
use store::ViewStore;
pub use store::{Completion, Snapshot};
pub use timer::TimerHandle;

/// A running poll subscription. Polls until dropped or stopped.
pub struct PollSession<R: Record> {
    id: Uuid,
    name: String,
    config: PollConfig,
    store: Arc<Mutex<ViewStore<R>>>,
    updates: watch::Receiver<Snapshot<R>>,
    refresh: Arc<Notify>,
    timer: Option<TimerHandle>,
}

impl<R: Record> PollSession<R> {
    /// Start polling `source` with `filters`. Must be called from within a tokio runtime.
    ///
    /// The initial status is `syncing` when the first fetch is immediate and
    /// `connected` when it is deferred by one interval.
    pub fn start(name: impl Into<String>, source: Arc<dyn RecordSource>, filters: Filters, config: PollConfig) -> Self {
        let id = Uuid::new_v4();
        let name = name.into();
        let initial = match config.first_tick {
            FirstTick::Immediate => Status::Syncing,
            FirstTick::Deferred => Status::Connected,
        };
        let (store, updates) = ViewStore::new(id, initial, config.offline_after, Instant::now());
        let store = Arc::new(Mutex::new(store));
        let refresh = Arc::new(Notify::new());

        info!(
            session = %id,
            name = %name,
            kind = R::KIND,
            source = %source.describe(),
            interval_ms = millis(config.interval),
            timeout_ms = millis(config.timeout),
            "poll session started"
        );

        let on_tick = {
            let store = Arc::clone(&store);
            move || {
                let seq = lock(&store).begin_fetch()?;
                Some(run_fetch(id, seq, Arc::clone(&store), Arc::clone(&source), filters.clone(), config.timeout))
            }
        };
        let timer = timer::spawn_timer(config.interval, config.first_tick, Arc::clone(&refresh), on_tick);

        Self { id, name, config, store, updates, refresh, timer: Some(timer) }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> PollConfig {
        self.config
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<R> {
        self.updates.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.updates.borrow().status
    }

    /// Receiver that is notified on every status or record change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<R>> {
        self.updates.clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Fetch now, outside the regular cadence.
    pub fn refresh_now(&self) {
        if self.timer.is_some() {
            self.refresh.notify_one();
        }
    }

    /// Manual reconnect. Zeroes `update_count`, forces `connected`, resumes a
    /// disconnected session and discards results of fetches already in flight.
    pub fn reconnect(&self) {
        lock(&self.store).reconnect();
        info!(session = %self.id, name = %self.name, "poll session reconnected");
    }

    /// External disconnect signal. The session reports `offline` and skips
    /// fetches until [`reconnect`](Self::reconnect).
    pub fn disconnect(&self) {
        lock(&self.store).disconnect();
        info!(session = %self.id, name = %self.name, "poll session disconnected");
    }

    /// Cancel the timer and in-flight fetches. Idempotent.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
            lock(&self.store).close();
            info!(session = %self.id, name = %self.name, "poll session stopped");
        }
    }
}

impl<R: Record> Drop for PollSession<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_fetch<R: Record>(
    session: Uuid,
    seq: u64,
    store: Arc<Mutex<ViewStore<R>>>,
    source: Arc<dyn RecordSource>,
    filters: Filters,
    deadline: Duration,
) {
    let result = fetch_records::<R>(source.as_ref(), &filters, deadline).await;
    if let Err(e) = &result {
        warn!(session = %session, seq, error = %e, "poll fetch failed");
    }
    let completion = lock(&store).complete(seq, result, Instant::now(), OffsetDateTime::now_utc());
    debug!(session = %session, seq, ?completion, "poll fetch completed");
}

fn lock<R>(store: &Mutex<ViewStore<R>>) -> MutexGuard<'_, ViewStore<R>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
