//! Domain types for fund tracing.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper, including smallest-unit conversion
//! - Domain primitives: Address, TxHash, WalletSet
//! - Transaction and address-history views of the ledger source
//! - TraceRecord, the unit of output

pub mod decimal;
pub mod primitives;
pub mod trace_record;
pub mod transaction;

pub use decimal::{Decimal, UNITS_PER_COIN};
pub use primitives::{Address, TxHash, WalletSet};
pub use trace_record::TraceRecord;
pub use transaction::{AddressHistory, PrevOut, Transaction, TxInput, TxOutput, TxSummary};
