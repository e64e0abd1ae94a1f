use crate::cache::CacheError;
use crate::datasource::DataSourceError;
use crate::sink::SinkError;
use thiserror::Error;

/// Failures raised while looking up ledger data or emitting trace records.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Fetch failed for {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: DataSourceError,
    },
    #[error("Transaction not found: {hash} (HTTP {status})")]
    NotFound { hash: String, status: u16 },
    #[error("No transactions found for wallet {0}")]
    NoTransactions(String),
    #[error("Exchange rate unavailable for {date} in {currency}")]
    RateUnavailable { date: String, currency: String },
    #[error("Malformed response from {url}: {message}")]
    Parse { url: String, message: String },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl TraceError {
    /// Upstream failure for `url`, as surfaced through the response cache.
    pub fn fetch_failed(url: &str, source: DataSourceError) -> Self {
        TraceError::FetchFailed {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_subject() {
        let err = TraceError::NoTransactions("W1".to_string());
        assert_eq!(err.to_string(), "No transactions found for wallet W1");

        let err = TraceError::NotFound {
            hash: "T1".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "Transaction not found: T1 (HTTP 404)");

        let err = TraceError::fetch_failed("http://x", DataSourceError::RateLimited);
        assert_eq!(err.to_string(), "Fetch failed for http://x: Rate limited");
    }
}
