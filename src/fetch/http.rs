//! HTTP read endpoint backed by `reqwest`.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::{FetchError, Filters, RecordSource};

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// GETs one URL, forwarding filters as query parameters.
pub struct HttpSource {
    http: reqwest::Client,
    url: String,
    request_timeout: Duration,
}

impl HttpSource {
    /// Build a source for `url`. `request_timeout` bounds the whole request at
    /// the transport level, independently of the session deadline.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client fails to build.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self { http, url: url.into(), request_timeout })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self, filters: &Filters) -> Result<Value, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .query(&filters.query_pairs())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url = %self.url, status = status.as_u16(), "read endpoint returned failure status");
            return Err(FetchError::Status { status: status.as_u16() });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| if e.is_timeout() { self.transport_error(&e) } else { FetchError::Malformed(e.to_string()) })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

impl HttpSource {
    fn transport_error(&self, e: &reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout { after_ms: super::millis(self.request_timeout) }
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
