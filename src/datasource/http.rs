//! HTTP data source backed by reqwest.

use super::{DataSource, DataSourceError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Plain GET client for the public ledger and price APIs.
///
/// One request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: Client,
}

impl HttpDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpDataSource {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DataSourceError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(DataSourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))
    }
}
