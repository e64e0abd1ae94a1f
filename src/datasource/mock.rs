//! Mock data source for testing without network calls.

use super::{DataSource, DataSourceError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockResponse {
    Json(serde_json::Value),
    Status(u16),
}

/// Mock data source that serves predefined documents by URL.
///
/// Unknown URLs answer with HTTP 404. Every call is counted so tests can
/// assert how often the upstream was actually hit.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    responses: HashMap<String, MockResponse>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockDataSource {
    /// Create a new mock data source with no documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_json(mut self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.responses.insert(url.into(), MockResponse::Json(body));
        self
    }

    /// Answer `url` with a non-success HTTP status.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), MockResponse::Status(status));
        self
    }

    /// Number of requests made for `url` so far.
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total number of requests made so far.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DataSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(url.to_string()).or_insert(0) += 1;
        }

        match self.responses.get(url) {
            Some(MockResponse::Json(body)) => Ok(body.clone()),
            Some(MockResponse::Status(429)) => Err(DataSourceError::RateLimited),
            Some(MockResponse::Status(status)) => Err(DataSourceError::HttpError {
                status: *status,
                message: "Mock status".to_string(),
            }),
            None => Err(DataSourceError::HttpError {
                status: 404,
                message: "Not Found".to_string(),
            }),
        }
    }
}
