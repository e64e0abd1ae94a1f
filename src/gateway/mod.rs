//! External data gateway: typed ledger and price lookups, each routed through
//! the response cache.

pub mod endpoints;

pub use endpoints::Endpoints;

use crate::cache::ResponseCache;
use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{Address, AddressHistory, Decimal, Transaction, TxHash};
use crate::error::TraceError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Lookups the trace engine depends on.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Full input/output detail of a transaction.
    ///
    /// Fails with `NotFound` if the source answers with a non-success status.
    async fn fetch_transaction(&self, hash: &TxHash) -> Result<Transaction, TraceError>;

    /// Transaction history of an address, most recent first.
    ///
    /// Fails with `NoTransactions` if the history is empty.
    async fn fetch_address_history(&self, address: &Address)
        -> Result<AddressHistory, TraceError>;

    /// Reference-currency price of one native coin on `date` (UTC).
    ///
    /// Fails with `RateUnavailable` if the source has no price for that day.
    async fn fetch_exchange_rate(&self, date: NaiveDate) -> Result<Decimal, TraceError>;
}

/// Gateway over a raw [`DataSource`] with every response memoized in a
/// [`ResponseCache`].
#[derive(Debug, Clone)]
pub struct CachedGateway {
    source: Arc<dyn DataSource>,
    cache: ResponseCache,
    endpoints: Endpoints,
    /// Key under `market_data.current_price`, lowercase.
    reference_currency: String,
}

impl CachedGateway {
    pub fn new(
        source: Arc<dyn DataSource>,
        cache: ResponseCache,
        endpoints: Endpoints,
        reference_currency: &str,
    ) -> Self {
        Self {
            source,
            cache,
            endpoints,
            reference_currency: reference_currency.to_lowercase(),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_cached(&self, url: &str) -> Result<serde_json::Value, TraceError> {
        let source = self.source.clone();
        self.cache
            .get_or_fetch(url, || async move {
                source
                    .get_json(url)
                    .await
                    .map_err(|e| TraceError::fetch_failed(url, e))
            })
            .await
    }
}

fn decode<T: DeserializeOwned>(url: &str, value: serde_json::Value) -> Result<T, TraceError> {
    serde_json::from_value(value).map_err(|e| TraceError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl Gateway for CachedGateway {
    async fn fetch_transaction(&self, hash: &TxHash) -> Result<Transaction, TraceError> {
        let url = self.endpoints.transaction_url(hash);
        let value = match self.get_cached(&url).await {
            Err(TraceError::FetchFailed {
                source: DataSourceError::HttpError { status, .. },
                ..
            }) => {
                return Err(TraceError::NotFound {
                    hash: hash.to_string(),
                    status,
                })
            }
            other => other?,
        };
        decode(&url, value)
    }

    async fn fetch_address_history(
        &self,
        address: &Address,
    ) -> Result<AddressHistory, TraceError> {
        let url = self.endpoints.address_url(address);
        let history: AddressHistory = decode(&url, self.get_cached(&url).await?)?;
        if history.txs.is_empty() {
            return Err(TraceError::NoTransactions(address.to_string()));
        }
        Ok(history)
    }

    async fn fetch_exchange_rate(&self, date: NaiveDate) -> Result<Decimal, TraceError> {
        let url = self.endpoints.exchange_rate_url(date);
        let value = self.get_cached(&url).await?;

        let unavailable = || TraceError::RateUnavailable {
            date: date.format("%d-%m-%Y").to_string(),
            currency: self.reference_currency.clone(),
        };

        let price = value
            .pointer(&format!(
                "/market_data/current_price/{}",
                self.reference_currency
            ))
            .and_then(|v| v.as_number())
            .ok_or_else(unavailable)?;

        Decimal::from_json_number(price).map_err(|e| TraceError::Parse {
            url,
            message: format!("Invalid price: {}", e),
        })
    }
}
