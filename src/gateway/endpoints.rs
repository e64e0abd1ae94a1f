//! Request URLs for the ledger and price APIs. A URL doubles as its cache key.

use crate::domain::{Address, TxHash};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub blockchain_api_url: String,
    pub price_api_url: String,
    pub price_coin_id: String,
}

impl Endpoints {
    pub fn new(
        blockchain_api_url: impl Into<String>,
        price_api_url: impl Into<String>,
        price_coin_id: impl Into<String>,
    ) -> Self {
        Self {
            blockchain_api_url: blockchain_api_url.into().trim_end_matches('/').to_string(),
            price_api_url: price_api_url.into().trim_end_matches('/').to_string(),
            price_coin_id: price_coin_id.into(),
        }
    }

    pub fn transaction_url(&self, hash: &TxHash) -> String {
        format!("{}/rawtx/{}", self.blockchain_api_url, hash)
    }

    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/rawaddr/{}", self.blockchain_api_url, address)
    }

    /// Historical price lookup. The API requires `DD-MM-YYYY`.
    pub fn exchange_rate_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/coins/{}/history?date={}&localization=false",
            self.price_api_url,
            self.price_coin_id,
            date.format("%d-%m-%Y")
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(
            "https://blockchain.info",
            "https://api.coingecko.com/api/v3",
            "bitcoin",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.transaction_url(&TxHash::new("abc")),
            "https://blockchain.info/rawtx/abc"
        );
        assert_eq!(
            endpoints.address_url(&Address::new("1Boat")),
            "https://blockchain.info/rawaddr/1Boat"
        );
    }

    #[test]
    fn test_exchange_rate_url_uses_day_month_year() {
        let endpoints = Endpoints::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            endpoints.exchange_rate_url(date),
            "https://api.coingecko.com/api/v3/coins/bitcoin/history?date=07-03-2024&localization=false"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let endpoints = Endpoints::new("http://mock/", "http://prices/", "litecoin");
        assert_eq!(endpoints.transaction_url(&TxHash::new("t")), "http://mock/rawtx/t");
        assert!(endpoints
            .exchange_rate_url(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap())
            .starts_with("http://prices/coins/litecoin/history?date=31-01-2020"));
    }
}
