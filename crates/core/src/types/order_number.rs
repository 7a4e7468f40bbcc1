//! Human-readable, year-scoped order numbers.
//!
//! Format: `ORD-{year}-{sequence:05}`. The sequence restarts at 1 at the
//! first issuance of a new year and the full number is globally unique and
//! immutable once assigned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a stored order number does not match the format.
#[derive(Debug, Error)]
#[error("invalid order number: {0}")]
pub struct OrderNumberError(pub String);

/// A globally unique, year-scoped order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Format an order number from a year and a sequence value.
    #[must_use]
    pub fn format(year: i32, sequence: i64) -> Self {
        Self(format!("ORD-{year}-{sequence:05}"))
    }

    /// Parse a stored order number, validating `ORD-{year}-{seq:05}`.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError` if the value does not match the format.
    pub fn parse(raw: &str) -> Result<Self, OrderNumberError> {
        let err = || OrderNumberError(raw.to_owned());

        let rest = raw.strip_prefix("ORD-").ok_or_else(err)?;
        let (year, seq) = rest.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if seq.len() != 5 || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        Ok(Self(raw.to_owned()))
    }

    /// Get the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        assert_eq!(OrderNumber::format(2026, 1).as_str(), "ORD-2026-00001");
        assert_eq!(OrderNumber::format(2026, 12345).as_str(), "ORD-2026-12345");
    }

    #[test]
    fn test_parse_accepts_formatted_numbers() {
        let number = OrderNumber::format(2026, 42);
        assert_eq!(OrderNumber::parse(number.as_str()).unwrap(), number);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in [
            "ORD-2026-1",
            "ORD-26-00001",
            "ORDER-2026-00001",
            "ORD-2026-0000a",
            "ORD-202600001",
            "",
        ] {
            assert!(OrderNumber::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
