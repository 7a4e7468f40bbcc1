//! Monetary rounding helpers.
//!
//! All monetary values are `rust_decimal::Decimal` rounded half-up to two
//! fractional digits at every step that is persisted - subtotals, delivery
//! costs, discounts, totals, and each order line total. Rounding is never
//! deferred to the final sum.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount half-up to two decimal places.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total for a quantity of units at a unit price.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    round2(unit_price * Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(dec!(2.345)), dec!(2.35));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
        assert_eq!(round2(dec!(2.005)), dec!(2.01));
        assert_eq!(round2(dec!(175.000)), dec!(175.00));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec!(500.00), 2), dec!(1000.00));
        assert_eq!(line_total(dec!(33.335), 3), dec!(100.01));
    }
}
