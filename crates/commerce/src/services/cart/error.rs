//! Cart engine error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product or cart line absent - or owned by someone else, which is
    /// deliberately reported the same way.
    #[error("not found")]
    NotFound,

    /// Product exists but is not orderable.
    #[error("product unavailable: {name}")]
    Unavailable {
        /// Product name.
        name: String,
    },

    /// Not enough stock to satisfy the requested quantity.
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product name.
        name: String,
        /// Units the operation asked for (including any existing line).
        requested: i64,
        /// Units actually in stock.
        available: i64,
    },

    /// Quantity must be positive.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
