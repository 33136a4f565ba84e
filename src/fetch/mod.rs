//! Fetch/transform step: pull one body from a read endpoint and project it
//! into normalized records.
//!
//! DESIGN
//! ======
//! `RecordSource` is the seam between a poll session and the backend. It
//! returns the raw JSON body; envelope unwrapping and per-item normalization
//! happen here so every source (HTTP or mock) is held to the same shape rules.
//!
//! ERROR HANDLING
//! ==============
//! Every failure, including a malformed body or a single bad item, becomes a
//! `FetchError`. Callers turn it into a status transition; nothing here panics
//! or yields partial record sets.

pub mod filters;
pub mod http;

use std::time::Duration;

use serde_json::Value;

use crate::records::Record;
pub use filters::{Filters, TimeRange};
pub use http::HttpSource;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {status}")]
    Status { status: u16 },

    /// The fetch did not finish before its deadline.
    #[error("fetch timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The body or one of its items did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

// =============================================================================
// SOURCE TRAIT
// =============================================================================

/// A read endpoint. Enables mocking in tests.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the current response body.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure or a non-2xx response.
    async fn fetch(&self, filters: &Filters) -> Result<Value, FetchError>;

    /// Human-readable endpoint description for logs.
    fn describe(&self) -> String {
        "record source".to_owned()
    }
}

// =============================================================================
// TRANSFORM
// =============================================================================

/// Fetch from `source` under `deadline`, then unwrap and normalize the body.
///
/// # Errors
///
/// Returns [`FetchError::Timeout`] when the deadline passes, the source's own
/// error, or [`FetchError::Malformed`] when the body does not normalize.
pub async fn fetch_records<R: Record>(
    source: &dyn RecordSource,
    filters: &Filters,
    deadline: Duration,
) -> Result<Vec<R>, FetchError> {
    let body = tokio::time::timeout(deadline, source.fetch(filters))
        .await
        .map_err(|_| FetchError::Timeout { after_ms: millis(deadline) })??;
    normalize(unwrap_envelope(body)?)
}

/// Accept a bare list or a list nested under `data`.
pub(crate) fn unwrap_envelope(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(FetchError::Malformed(format!("`data` is {}, expected a list", type_name(&other)))),
            None => Err(FetchError::Malformed("object body without a `data` list".to_owned())),
        },
        other => Err(FetchError::Malformed(format!("body is {}, expected a list", type_name(&other)))),
    }
}

pub(crate) fn normalize<R: Record>(items: Vec<Value>) -> Result<Vec<R>, FetchError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| R::from_value(item).map_err(|e| FetchError::Malformed(format!("item {index}: {e}"))))
        .collect()
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
