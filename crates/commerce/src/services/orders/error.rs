//! Order engine error types.

use thiserror::Error;

use cloudberry_core::OrderStatus;

use crate::db::RepositoryError;
use crate::models::UnavailableItem;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout attempted with no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more cart lines cannot currently be fulfilled; no partial
    /// order is created. Carries per-line detail for the checkout UI.
    #[error("{} item(s) unavailable", .0.len())]
    ItemsUnavailable(Vec<UnavailableItem>),

    /// Order absent.
    #[error("not found")]
    NotFound,

    /// Order is past the point of cancellation.
    #[error("order in status {status} cannot be cancelled")]
    NotCancellable {
        /// The order's current status.
        status: OrderStatus,
    },

    /// Illegal status change, e.g. paying a cancelled order.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
