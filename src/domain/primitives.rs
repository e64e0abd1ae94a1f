//! Domain primitives: Address, TxHash, WalletSet.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wallet address as reported by the ledger source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    /// Create an Address from a string.
    pub fn new(addr: impl Into<String>) -> Self {
        Address(addr.into())
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction hash (hex string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    /// Create a TxHash from a string.
    pub fn new(hash: impl Into<String>) -> Self {
        TxHash(hash.into())
    }

    /// Get the hash as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of wallets where backward tracing stops (exchanges, known custodians).
///
/// Fixed for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSet(BTreeSet<Address>);

impl WalletSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Address> for WalletSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        WalletSet(iter.into_iter().collect())
    }
}
