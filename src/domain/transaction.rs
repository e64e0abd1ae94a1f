//! Ledger transaction views as returned by the transaction and address lookups.

use super::{Address, TxHash};
use serde::Deserialize;

/// Output spent by an input, carrying the funding wallet and value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrevOut {
    #[serde(rename = "addr")]
    pub address: Option<Address>,
    /// Smallest-unit value.
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxInput {
    /// Absent on coinbase inputs.
    pub prev_out: Option<PrevOut>,
}

impl TxInput {
    /// Funding wallet and smallest-unit value, if this input spends a known output.
    pub fn source(&self) -> Option<(&Address, i64)> {
        let prev = self.prev_out.as_ref()?;
        prev.address.as_ref().map(|addr| (addr, prev.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxOutput {
    /// Absent for non-standard outputs (e.g. OP_RETURN).
    #[serde(rename = "addr")]
    pub address: Option<Address>,
    /// Smallest-unit value.
    pub value: i64,
}

/// Full transaction detail: ordered inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    pub hash: TxHash,
    /// Block time in seconds since the Unix epoch, when the source reports it.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub inputs: Vec<TxInput>,
    #[serde(rename = "out", default)]
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Sum of all output values in smallest units.
    pub fn total_output_value(&self) -> i64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

/// Transaction entry in an address history listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxSummary {
    pub hash: TxHash,
    #[serde(default)]
    pub time: Option<i64>,
}

/// Transaction history of a single address, in the order the source lists it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressHistory {
    #[serde(default)]
    pub txs: Vec<TxSummary>,
}

impl AddressHistory {
    /// First listed transaction, which is where tracing continues.
    pub fn first(&self) -> Option<&TxSummary> {
        self.txs.first()
    }
}
