//! One traced source-to-destination transfer.

use super::{Address, Decimal, TxHash};
use serde::Serialize;

/// A single row of the trace ledger, emitted once per visited (input, output) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub starting_wallet: Address,
    pub source_wallet: Address,
    /// Empty when the output carries no address.
    pub dest_wallet: Option<Address>,
    /// Destination amount in major units.
    pub dest_amount: Decimal,
    /// Fee attributed to the input, in major units. May be negative.
    pub fee: Decimal,
    pub dest_amount_reference: Decimal,
    pub fee_reference: Decimal,
    pub tx_hash: TxHash,
}

impl TraceRecord {
    /// Fields in ledger column order.
    pub fn to_row(&self) -> [String; 8] {
        [
            self.starting_wallet.to_string(),
            self.source_wallet.to_string(),
            self.dest_wallet
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_default(),
            self.dest_amount.to_canonical_string(),
            self.fee.to_canonical_string(),
            self.dest_amount_reference.to_canonical_string(),
            self.fee_reference.to_canonical_string(),
            self.tx_hash.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_column_order() {
        let record = TraceRecord {
            starting_wallet: Address::new("W1"),
            source_wallet: Address::new("S1"),
            dest_wallet: None,
            dest_amount: Decimal::from_smallest_unit(490_000_000),
            fee: Decimal::from_smallest_unit(-10_000_000),
            dest_amount_reference: Decimal::from_str_canonical("490000").unwrap(),
            fee_reference: Decimal::from_str_canonical("-10000").unwrap(),
            tx_hash: TxHash::new("T1"),
        };

        assert_eq!(
            record.to_row(),
            ["W1", "S1", "", "4.9", "-0.1", "490000", "-10000", "T1"].map(String::from)
        );
    }
}
