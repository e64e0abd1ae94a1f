//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Provides canonical parsing from strings, formatting without exponent notation,
//! and exact conversion between smallest-unit integers and major units.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of smallest units in one major unit (satoshi per BTC).
pub const UNITS_PER_COIN: i64 = 100_000_000;

/// Decimal scale matching [`UNITS_PER_COIN`].
const COIN_SCALE: u32 = 8;

/// Lossless decimal numeric type for amounts and exchange rates.
///
/// Backed by rust_decimal to avoid floating-point drift.
/// Serializes to JSON number (not string) by default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Convert a JSON number into a Decimal without going through f64 arithmetic.
    ///
    /// Accepts exponent notation (`1.5e-7`), which upstream price APIs emit for
    /// very small values.
    pub fn from_json_number(n: &serde_json::Number) -> Result<Self, rust_decimal::Error> {
        let text = n.to_string();
        RustDecimal::from_str(&text)
            .or_else(|_| RustDecimal::from_scientific(&text))
            .map(Decimal)
    }

    /// Convert a smallest-unit integer amount into major units.
    ///
    /// Exact: the result is `units / 100_000_000` with scale 8.
    pub fn from_smallest_unit(units: i64) -> Self {
        Decimal(RustDecimal::new(units, COIN_SCALE))
    }

    /// Convert a major-unit amount back into smallest units, truncating any
    /// precision below one unit.
    pub fn to_smallest_unit(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        (self.0 * RustDecimal::from(UNITS_PER_COIN)).trunc().to_i64()
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        // normalize() drops trailing zeros; Display never emits an exponent
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_unit_conversion() {
        assert_eq!(
            Decimal::from_smallest_unit(490_000_000).to_canonical_string(),
            "4.9"
        );
        assert_eq!(
            Decimal::from_smallest_unit(10_000_000).to_canonical_string(),
            "0.1"
        );
        assert_eq!(Decimal::from_smallest_unit(1).to_canonical_string(), "0.00000001");
        assert_eq!(
            Decimal::from_smallest_unit(-25_000).to_canonical_string(),
            "-0.00025"
        );
    }

    #[test]
    fn test_smallest_unit_roundtrip_is_exact() {
        for units in [0, 1, 7, 99_999_999, 100_000_000, 2_100_000_000_000_000, -546] {
            let major = Decimal::from_smallest_unit(units);
            assert_eq!(major.to_smallest_unit(), Some(units), "units={}", units);
        }
    }

    #[test]
    fn test_to_smallest_unit_truncates_sub_unit_precision() {
        let d = Decimal::from_str_canonical("0.000000019").unwrap();
        assert_eq!(d.to_smallest_unit(), Some(1));
    }

    #[test]
    fn test_from_json_number() {
        let n: serde_json::Number = serde_json::from_str("98765.43").unwrap();
        assert_eq!(
            Decimal::from_json_number(&n).unwrap().to_canonical_string(),
            "98765.43"
        );

        let n: serde_json::Number = serde_json::from_str("150000").unwrap();
        assert_eq!(
            Decimal::from_json_number(&n).unwrap().to_canonical_string(),
            "150000"
        );

        let n: serde_json::Number = serde_json::from_str("1.5e-7").unwrap();
        assert_eq!(
            Decimal::from_json_number(&n).unwrap().to_canonical_string(),
            "0.00000015"
        );
    }

    #[test]
    fn test_decimal_canonical_no_exponent() {
        let decimal = Decimal::from_str_canonical("123.4500").expect("parse failed");
        let formatted = decimal.to_canonical_string();
        assert!(!formatted.contains('e'));
        assert_eq!(formatted, "123.45");
    }

    #[test]
    fn test_decimal_arithmetic() {
        let a = Decimal::from_str_canonical("4.9").unwrap();
        let rate = Decimal::from_str_canonical("100000").unwrap();

        assert_eq!((a * rate).to_canonical_string(), "490000");
    }

    #[test]
    fn test_decimal_json_serialization() {
        let decimal = Decimal::from_str_canonical("123.456").unwrap();
        let json = serde_json::to_value(decimal).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }
}
