//! Cloudberry Commerce - cart and order engines.
//!
//! The transactional core of the storefront: a mutable shopping cart per
//! owner (authenticated user or anonymous guest) and the checkout that
//! turns it into an immutable, auditable order while enforcing inventory,
//! pricing, and ownership rules.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`db`] - Connection pool, migrations, and repositories
//! - [`models`] - Persisted domain records
//! - [`pricing`] - Pure delivery-cost and discount policy
//! - [`services`] - [`CartService`] and [`OrderService`]
//!
//! # Example
//!
//! ```rust,no_run
//! use cloudberry_commerce::services::{CartService, OrderService};
//! use cloudberry_core::{OwnerKey, ProductId, SessionId};
//!
//! # async fn example(pool: sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let owner = OwnerKey::guest(SessionId::generate());
//! let cart = CartService::new(&pool);
//!
//! cart.add_item(&owner, ProductId::new(1), 2).await?;
//! let total = cart.get_total(&owner).await?;
//! println!("cart total: {total}");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod pricing;
pub mod services;

pub use config::{CommerceConfig, ConfigError};
pub use db::{RepositoryError, create_pool, run_migrations};
pub use models::{
    CartAvailability, CartItemView, CartLine, NewOrder, NewProduct, Order, OrderLine, Product,
    UnavailableItem,
};
pub use pricing::OrderQuote;
pub use services::{CartError, CartService, OrderError, OrderService};
