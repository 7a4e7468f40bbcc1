//! Order and order line records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cloudberry_core::{
    DeliveryMethod, OrderId, OrderLineId, OrderNumber, OrderStatus, OwnerKey, PaymentMethod,
    PaymentStatus, ProductId,
};

/// An immutable, auditable order created from a cart snapshot.
///
/// Orders are never physically deleted; cancellation is a terminal status.
/// `total == round2(subtotal + delivery_cost - discount)` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order's database ID.
    pub id: OrderId,
    /// The cart owner the order was created for.
    pub owner: Option<OwnerKey>,
    /// Globally unique `ORD-{year}-{seq:05}` identifier.
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    /// Sum of line totals.
    pub subtotal: Decimal,
    pub delivery_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Customer-supplied note.
    pub notes: Option<String>,
    /// Internal notes, e.g. cancellation reasons.
    pub admin_notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// The order's lines, created atomically with it.
    pub lines: Vec<OrderLine>,
}

/// The historical record of one product within an order.
///
/// Snapshots name and price at creation time and never changes afterwards,
/// independent of later catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name at the moment of checkout.
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at the moment of checkout.
    pub unit_price: Decimal,
    /// `round2(unit_price * quantity)`.
    pub line_total: Decimal,
}

/// Customer data supplied at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}
