//! Cart line records and availability reporting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cloudberry_core::{CartLineId, OwnerKey, ProductId, line_total};

/// One (owner, product) pairing with a quantity and a price snapshot.
///
/// `unit_price` is fixed at the moment the line is created and does not
/// follow later catalog price changes; only `sync_prices` moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line's database ID.
    pub id: CartLineId,
    /// The cart this line belongs to.
    pub owner: OwnerKey,
    /// Product being purchased.
    pub product_id: ProductId,
    /// Units requested. Always positive.
    pub quantity: i64,
    /// Price snapshot taken when the line was created.
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    /// Line total: `round2(unit_price * quantity)`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// A cart line joined with current product data, for display and
/// availability checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemView {
    /// The cart line itself.
    pub line: CartLine,
    /// Current product name.
    pub product_name: String,
    /// Current catalog price (may differ from the line's snapshot).
    pub product_price: Decimal,
    /// Current stock.
    pub product_stock: i64,
    /// Current availability flag.
    pub product_available: bool,
}

impl CartItemView {
    /// Whether this line could be fulfilled right now.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.product_available && self.product_stock >= self.line.quantity
    }
}

/// One line that cannot be fulfilled, with the detail a checkout UI needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableItem {
    pub product_id: ProductId,
    pub product_name: String,
    /// Units the cart asks for.
    pub requested: i64,
    /// Units actually available (0 when the product is disabled).
    pub available: i64,
}

/// Result of a cart-wide availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAvailability {
    /// True iff every line can be fulfilled.
    pub available: bool,
    /// The offending lines, empty when `available` is true.
    pub unavailable_items: Vec<UnavailableItem>,
}
