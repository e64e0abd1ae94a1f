//! Data source abstraction for raw JSON lookups against external ledger and price APIs.

use async_trait::async_trait;
use std::fmt;

pub mod http;
pub mod mock;

pub use http::HttpDataSource;
pub use mock::MockDataSource;

/// Raw lookup capability behind the response cache.
///
/// Implementations perform exactly one upstream request per call; caching,
/// interpretation of the response, and error classification happen above.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Fetch the JSON document at `url`.
    ///
    /// # Returns
    /// The parsed body on a success status, otherwise an error describing the failure.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// Non-success HTTP status (e.g., 404 unknown hash, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
}

impl DataSourceError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DataSourceError::HttpError { status, .. } => Some(*status),
            DataSourceError::RateLimited => Some(429),
            _ => None,
        }
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for DataSourceError {}
