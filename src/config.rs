use crate::domain::{Address, WalletSet};
use crate::engine::TraceOptions;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub starting_wallets: Vec<Address>,
    pub terminating_wallets: WalletSet,
    pub cache_backend: CacheBackend,
    pub cache_path: String,
    pub output_path: String,
    pub blockchain_api_url: String,
    pub price_api_url: String,
    pub price_coin_id: String,
    pub reference_currency: String,
    pub native_symbol: String,
    pub termination_mode: TerminationMode,
    pub follow_wallet: FollowWallet,
    pub rate_date: RateDate,
    pub max_depth: usize,
    pub max_transactions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// Single pretty-printed JSON document, rewritten on every new key.
    Json,
    /// SQLite table, one row per key.
    Sqlite,
}

/// What happens when a pair's source wallet is a terminating wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationMode {
    /// Stop processing every remaining pair of the current transaction.
    StopTransaction,
    /// Only skip following this pair; remaining pairs are still traced.
    SkipBranch,
}

/// Which wallet's history supplies the next transaction to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowWallet {
    Destination,
    Source,
}

/// Which date the reference-currency rate is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDate {
    /// The date the trace runs (an approximation).
    WallClock,
    /// The transaction's own time, falling back to the trace date when absent.
    TransactionTime,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let starting_wallets = parse_wallet_list(&env_map, "TRACE_STARTING_WALLETS")?;
        let terminating_wallets: WalletSet =
            parse_wallet_list(&env_map, "TRACE_TERMINATING_WALLETS")?
                .into_iter()
                .collect();

        let cache_backend = match get_or(&env_map, "CACHE_BACKEND", "json") {
            "json" => CacheBackend::Json,
            "sqlite" => CacheBackend::Sqlite,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CACHE_BACKEND".to_string(),
                    format!("must be json or sqlite, got {}", other),
                ))
            }
        };

        let termination_mode = match get_or(&env_map, "TERMINATION_MODE", "stop-transaction") {
            "stop-transaction" => TerminationMode::StopTransaction,
            "skip-branch" => TerminationMode::SkipBranch,
            other => {
                return Err(ConfigError::InvalidValue(
                    "TERMINATION_MODE".to_string(),
                    format!("must be stop-transaction or skip-branch, got {}", other),
                ))
            }
        };

        let follow_wallet = match get_or(&env_map, "FOLLOW_WALLET", "destination") {
            "destination" => FollowWallet::Destination,
            "source" => FollowWallet::Source,
            other => {
                return Err(ConfigError::InvalidValue(
                    "FOLLOW_WALLET".to_string(),
                    format!("must be destination or source, got {}", other),
                ))
            }
        };

        let rate_date = match get_or(&env_map, "RATE_DATE", "wall-clock") {
            "wall-clock" => RateDate::WallClock,
            "transaction" => RateDate::TransactionTime,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RATE_DATE".to_string(),
                    format!("must be wall-clock or transaction, got {}", other),
                ))
            }
        };

        let max_depth = parse_limit(&env_map, "MAX_DEPTH", "64")?;
        let max_transactions = parse_limit(&env_map, "MAX_TRANSACTIONS", "10000")?;

        Ok(Config {
            starting_wallets,
            terminating_wallets,
            cache_backend,
            cache_path: get_or(&env_map, "CACHE_PATH", "cache.json").to_string(),
            output_path: get_or(&env_map, "OUTPUT_PATH", "transaction_trace.csv").to_string(),
            blockchain_api_url: get_or(&env_map, "BLOCKCHAIN_API_URL", "https://blockchain.info")
                .to_string(),
            price_api_url: get_or(
                &env_map,
                "PRICE_API_URL",
                "https://api.coingecko.com/api/v3",
            )
            .to_string(),
            price_coin_id: get_or(&env_map, "PRICE_COIN_ID", "bitcoin").to_string(),
            reference_currency: get_or(&env_map, "REFERENCE_CURRENCY", "aud").to_lowercase(),
            native_symbol: get_or(&env_map, "NATIVE_SYMBOL", "BTC").to_string(),
            termination_mode,
            follow_wallet,
            rate_date,
            max_depth,
            max_transactions,
        })
    }

    pub fn trace_options(&self) -> TraceOptions {
        TraceOptions {
            termination_mode: self.termination_mode,
            follow_wallet: self.follow_wallet,
            rate_date: self.rate_date,
            max_depth: self.max_depth,
            max_transactions: self.max_transactions,
        }
    }
}

fn get_or<'a>(env_map: &'a HashMap<String, String>, key: &str, default: &'a str) -> &'a str {
    env_map.get(key).map(|s| s.as_str()).unwrap_or(default)
}

fn parse_limit(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<usize, ConfigError> {
    match get_or(env_map, key, default).parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be a positive integer".to_string(),
        )),
    }
}

/// Read `<key>` as a comma-separated list, or `<key>_FILE` as one address per line.
fn parse_wallet_list(
    env_map: &HashMap<String, String>,
    key: &str,
) -> Result<Vec<Address>, ConfigError> {
    let file_key = format!("{}_FILE", key);

    if let Some(list) = env_map.get(key) {
        Ok(list
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Address::new)
            .collect())
    } else if let Some(file_path) = env_map.get(&file_key) {
        let content = std::fs::read_to_string(file_path).map_err(|_| {
            ConfigError::InvalidValue(file_key.clone(), "file not found or unreadable".to_string())
        })?;
        Ok(content
            .lines()
            .map(|line| line.trim())
            .filter(|s| !s.is_empty() && !s.starts_with('#'))
            .map(Address::new)
            .collect())
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(HashMap::new()).unwrap();
        assert!(config.starting_wallets.is_empty());
        assert!(config.terminating_wallets.is_empty());
        assert_eq!(config.cache_backend, CacheBackend::Json);
        assert_eq!(config.cache_path, "cache.json");
        assert_eq!(config.output_path, "transaction_trace.csv");
        assert_eq!(config.reference_currency, "aud");
        assert_eq!(config.termination_mode, TerminationMode::StopTransaction);
        assert_eq!(config.follow_wallet, FollowWallet::Destination);
        assert_eq!(config.rate_date, RateDate::WallClock);
        assert_eq!(config.trace_options(), TraceOptions::default());
    }

    #[test]
    fn test_wallet_lists_from_env() {
        let config = Config::from_env_map(env(&[
            ("TRACE_STARTING_WALLETS", "W1, W2,,"),
            ("TRACE_TERMINATING_WALLETS", "EXCH"),
        ]))
        .unwrap();
        assert_eq!(
            config.starting_wallets,
            vec![Address::new("W1"), Address::new("W2")]
        );
        assert!(config.terminating_wallets.contains(&Address::new("EXCH")));
    }

    #[test]
    fn test_wallet_list_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("terminating.txt");
        std::fs::write(&path, "# exchanges\nBINANCE\n\n  COINBASE  \n").unwrap();

        let config = Config::from_env_map(env(&[(
            "TRACE_TERMINATING_WALLETS_FILE",
            path.to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(config.terminating_wallets.len(), 2);
        assert!(config.terminating_wallets.contains(&Address::new("COINBASE")));
    }

    #[test]
    fn test_unreadable_wallet_file() {
        let result = Config::from_env_map(env(&[(
            "TRACE_STARTING_WALLETS_FILE",
            "/nonexistent/wallets.txt",
        )]));
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TRACE_STARTING_WALLETS_FILE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_alternate_modes() {
        let config = Config::from_env_map(env(&[
            ("CACHE_BACKEND", "sqlite"),
            ("TERMINATION_MODE", "skip-branch"),
            ("FOLLOW_WALLET", "source"),
            ("RATE_DATE", "transaction"),
            ("REFERENCE_CURRENCY", "USD"),
        ]))
        .unwrap();
        assert_eq!(config.cache_backend, CacheBackend::Sqlite);
        assert_eq!(config.termination_mode, TerminationMode::SkipBranch);
        assert_eq!(config.follow_wallet, FollowWallet::Source);
        assert_eq!(config.rate_date, RateDate::TransactionTime);
        assert_eq!(config.reference_currency, "usd");
    }

    #[test]
    fn test_invalid_termination_mode() {
        let result = Config::from_env_map(env(&[("TERMINATION_MODE", "never")]));
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TERMINATION_MODE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_cache_backend() {
        let result = Config::from_env_map(env(&[("CACHE_BACKEND", "redis")]));
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "CACHE_BACKEND"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_limits() {
        for value in ["0", "-1", "lots"] {
            let result = Config::from_env_map(env(&[("MAX_DEPTH", value)]));
            match result {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "MAX_DEPTH"),
                _ => panic!("Expected InvalidValue error for {}", value),
            }
        }
    }
}
