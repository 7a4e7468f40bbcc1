//! Pricing policy: delivery costs and order-level discounts.
//!
//! Pure functions over `Decimal`. Both the checkout preview and order
//! creation call [`quote`], so the price a customer is shown is exactly the
//! price that gets persisted.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use cloudberry_core::{DeliveryMethod, round2};

/// Courier delivery is free from this subtotal upwards.
pub const FREE_COURIER_THRESHOLD: Decimal = dec!(2000);

/// Flat courier fee below the free-delivery threshold.
pub const COURIER_COST: Decimal = dec!(300);

/// Flat postal fee, regardless of subtotal.
pub const POST_COST: Decimal = dec!(400);

/// Orders from this subtotal upwards earn the discount.
pub const DISCOUNT_THRESHOLD: Decimal = dec!(3000);

/// Discount rate applied above the threshold.
pub const DISCOUNT_RATE: Decimal = dec!(0.05);

/// A priced checkout: the exact figures an order will be persisted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub subtotal: Decimal,
    pub delivery_cost: Decimal,
    pub discount: Decimal,
    /// `round2(subtotal + delivery_cost - discount)`.
    pub total: Decimal,
}

/// Delivery cost for a subtotal and delivery method.
#[must_use]
pub fn delivery_cost(subtotal: Decimal, method: DeliveryMethod) -> Decimal {
    let cost = match method {
        DeliveryMethod::Pickup => Decimal::ZERO,
        DeliveryMethod::Courier => {
            if subtotal >= FREE_COURIER_THRESHOLD {
                Decimal::ZERO
            } else {
                COURIER_COST
            }
        }
        DeliveryMethod::Post => POST_COST,
    };
    round2(cost)
}

/// Order-level discount for a subtotal: 5% above the threshold, else zero.
#[must_use]
pub fn discount(subtotal: Decimal) -> Decimal {
    if subtotal >= DISCOUNT_THRESHOLD {
        round2(subtotal * DISCOUNT_RATE)
    } else {
        Decimal::ZERO
    }
}

/// Price a checkout: delivery cost, discount, and the resulting total.
#[must_use]
pub fn quote(subtotal: Decimal, method: DeliveryMethod) -> OrderQuote {
    let subtotal = round2(subtotal);
    let delivery_cost = delivery_cost(subtotal, method);
    let discount = discount(subtotal);
    OrderQuote {
        subtotal,
        delivery_cost,
        discount,
        total: round2(subtotal + delivery_cost - discount),
    }
}
