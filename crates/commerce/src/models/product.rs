//! Catalog product records.
//!
//! The catalog itself (browsing, filtering, media) lives outside this crate;
//! the engines only read products and move their stock counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cloudberry_core::ProductId;

/// A sellable product as the engines see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product's database ID.
    pub id: ProductId,
    /// Display name, snapshotted into order lines at checkout.
    pub name: String,
    /// Current catalog price.
    pub price: Decimal,
    /// Units currently available to order. Never negative.
    pub stock: i64,
    /// Whether the product can be ordered at all.
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a product into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    pub available: bool,
}
