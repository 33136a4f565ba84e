//! View state store for one poll session.
//!
//! DESIGN
//! ======
//! The store is the only writer of a session's records and status. Every
//! fetch is tagged with an issue-order sequence number when it starts; a
//! completion is applied only if it is newer than the last applied one, so a
//! slow early fetch can never overwrite a fast later one. Reconnect and
//! disconnect advance the applied mark past everything already issued, which
//! discards in-flight results from before the reset.
//!
//! `update_count` counts data changes: it increments when a successful fetch
//! yields a record set different from the one held. The first success after
//! start or reconnect always counts.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use super::status::{Status, StatusEvent, failure_event};
use crate::fetch::FetchError;
use crate::records::Record;

/// Point-in-time view of a session, as exposed to presentation code.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    pub status: Status,
    pub records: Arc<Vec<R>>,
    /// Wall-clock completion time of the last successful fetch.
    pub last_update: Option<OffsetDateTime>,
    pub update_count: u64,
    pub last_error: Option<String>,
}

impl<R> Snapshot<R> {
    fn empty(status: Status) -> Self {
        Self { status, records: Arc::new(Vec::new()), last_update: None, update_count: 0, last_error: None }
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Success with a record set different from the held one.
    Updated,
    /// Success with the same records already held.
    Unchanged,
    /// Failure applied as an `error` or `offline` transition.
    Failed,
    /// A newer fetch was already applied, or a reset happened after issue.
    Stale,
    /// The session is disconnected or closed.
    Discarded,
}

pub(crate) struct ViewStore<R> {
    session: Uuid,
    status: Status,
    records: Arc<Vec<R>>,
    last_update: Option<OffsetDateTime>,
    last_success_at: Option<Instant>,
    update_count: u64,
    /// Whether a success has been counted since start or the last reconnect.
    counted: bool,
    last_error: Option<String>,
    issued_seq: u64,
    applied_seq: u64,
    started_at: Instant,
    offline_after: Option<Duration>,
    paused: bool,
    closed: bool,
    tx: watch::Sender<Snapshot<R>>,
}

impl<R: Record> ViewStore<R> {
    pub(crate) fn new(
        session: Uuid,
        initial: Status,
        offline_after: Option<Duration>,
        now: Instant,
    ) -> (Self, watch::Receiver<Snapshot<R>>) {
        let (tx, rx) = watch::channel(Snapshot::empty(initial));
        let store = Self {
            session,
            status: initial,
            records: Arc::new(Vec::new()),
            last_update: None,
            last_success_at: None,
            update_count: 0,
            counted: false,
            last_error: None,
            issued_seq: 0,
            applied_seq: 0,
            started_at: now,
            offline_after,
            paused: false,
            closed: false,
            tx,
        };
        (store, rx)
    }

    pub(crate) fn snapshot(&self) -> Snapshot<R> {
        Snapshot {
            status: self.status,
            records: Arc::clone(&self.records),
            last_update: self.last_update,
            update_count: self.update_count,
            last_error: self.last_error.clone(),
        }
    }

    /// Issue a sequence number for a new fetch and enter `syncing`.
    /// Returns `None` while disconnected or after close.
    pub(crate) fn begin_fetch(&mut self) -> Option<u64> {
        if self.closed || self.paused {
            return None;
        }
        self.issued_seq += 1;
        self.transition(StatusEvent::FetchStarted);
        self.publish();
        Some(self.issued_seq)
    }

    pub(crate) fn complete(
        &mut self,
        seq: u64,
        result: Result<Vec<R>, FetchError>,
        now: Instant,
        wall: OffsetDateTime,
    ) -> Completion {
        if self.closed || self.paused {
            return Completion::Discarded;
        }
        if seq <= self.applied_seq {
            debug!(session = %self.session, seq, applied = self.applied_seq, "dropping stale fetch result");
            return Completion::Stale;
        }
        self.applied_seq = seq;

        let completion = match result {
            Ok(records) => {
                let changed = !self.counted || *self.records != records;
                if changed {
                    self.records = Arc::new(records);
                    self.update_count += 1;
                }
                self.counted = true;
                self.last_update = Some(wall);
                self.last_success_at = Some(now);
                self.last_error = None;
                self.transition(StatusEvent::FetchSucceeded);
                if changed { Completion::Updated } else { Completion::Unchanged }
            }
            Err(e) => {
                let event = failure_event(self.last_success_at, self.started_at, now, self.offline_after);
                self.last_error = Some(e.to_string());
                self.transition(event);
                Completion::Failed
            }
        };
        self.publish();
        completion
    }

    /// Manual reconnect: zero the counter, force `connected`, resume polling.
    pub(crate) fn reconnect(&mut self) {
        if self.closed {
            return;
        }
        self.paused = false;
        self.applied_seq = self.issued_seq;
        self.update_count = 0;
        self.counted = false;
        self.last_error = None;
        self.transition(StatusEvent::Reconnect);
        self.publish();
    }

    /// External disconnect: go `offline` and stop issuing fetches until reconnect.
    pub(crate) fn disconnect(&mut self) {
        if self.closed {
            return;
        }
        self.paused = true;
        self.applied_seq = self.issued_seq;
        self.transition(StatusEvent::Disconnect);
        self.publish();
    }

    /// Mark the owning session gone. Late completions are discarded from here on.
    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    fn transition(&mut self, event: StatusEvent) {
        let next = self.status.next(event);
        if next != self.status {
            debug!(session = %self.session, from = %self.status, to = %next, ?event, "status transition");
        }
        self.status = next;
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
