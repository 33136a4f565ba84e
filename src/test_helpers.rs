//! Scripted record sources for session and fetch tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use crate::fetch::{FetchError, Filters, RecordSource};

/// One scripted response: wait `delay`, then return `result`.
pub struct Step {
    pub delay: Duration,
    pub result: Result<Value, FetchError>,
}

impl Step {
    pub fn ok(body: Value) -> Self {
        Self { delay: Duration::ZERO, result: Ok(body) }
    }

    pub fn fail() -> Self {
        Self { delay: Duration::ZERO, result: Err(FetchError::Status { status: 503 }) }
    }

    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replays steps in order. Once the script runs out it keeps failing.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    last_filters: Mutex<Option<Filters>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps: Mutex::new(steps.into()), calls: AtomicUsize::new(0), last_filters: Mutex::new(None) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_filters(&self) -> Option<Filters> {
        self.last_filters.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch(&self, filters: &Filters) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filters.lock().unwrap() = Some(filters.clone());
        let step = self.steps.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Err(FetchError::Transport("script exhausted".into()));
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

/// A leaderboard body with a single row.
pub fn leaderboard(id: i64, points: i64) -> Value {
    json!([{ "id": id, "points": points }])
}
