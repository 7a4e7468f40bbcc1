//! Cart engine.
//!
//! Owns cart lines for authenticated users and anonymous guests alike: line
//! CRUD, totals, availability checks, price resynchronization, and the
//! guest-to-user merge that runs at login.

mod error;

pub use error::CartError;

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use cloudberry_core::{CartLineId, OwnerKey, ProductId, SessionId, UserId, round2};

use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::models::{CartAvailability, CartItemView, CartLine, Product, UnavailableItem};

/// Cart engine.
///
/// All operations take an explicit [`OwnerKey`]; there is no ambient
/// session state, and one owner's lines are never visible to another's
/// calls.
pub struct CartService<'a> {
    products: ProductRepository<'a>,
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            carts: CartRepository::new(pool),
        }
    }

    // =========================================================================
    // Line CRUD
    // =========================================================================

    /// Add `quantity` units of a product to the owner's cart.
    ///
    /// If a line for this product already exists its quantity grows;
    /// otherwise a new line snapshots the current catalog price.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product doesn't exist,
    /// `CartError::Unavailable` if it is disabled, and
    /// `CartError::InsufficientStock` if stock cannot cover the existing
    /// line plus `quantity`.
    pub async fn add_item(
        &self,
        owner: &OwnerKey,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::NotFound)?;

        if !product.available {
            return Err(CartError::Unavailable {
                name: product.name.clone(),
            });
        }

        let existing_quantity = self
            .carts
            .find_by_product(owner, product_id)
            .await?
            .map_or(0, |line| line.quantity);

        let requested = existing_quantity + quantity;
        check_stock(&product, requested)?;

        let line = self
            .carts
            .upsert_add(owner, product_id, quantity, product.price)
            .await?;

        tracing::debug!(%owner, %product_id, quantity = line.quantity, "cart line added");
        Ok(line)
    }

    /// Set the quantity of an owned line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the line is absent or not owned by
    /// the caller, and `CartError::InsufficientStock` if stock cannot cover
    /// the new quantity.
    pub async fn update_item(
        &self,
        owner: &OwnerKey,
        line_id: CartLineId,
        quantity: i64,
    ) -> Result<CartLine, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let line = self
            .carts
            .get_line(owner, line_id)
            .await?
            .ok_or(CartError::NotFound)?;

        let product = self
            .products
            .get(line.product_id)
            .await?
            .ok_or(CartError::NotFound)?;

        check_stock(&product, quantity)?;

        Ok(self.carts.update_quantity(owner, line_id, quantity).await?)
    }

    /// Remove an owned line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the line is absent or not owned by
    /// the caller.
    pub async fn remove_item(&self, owner: &OwnerKey, line_id: CartLineId) -> Result<(), CartError> {
        if self.carts.delete(owner, line_id).await? {
            Ok(())
        } else {
            Err(CartError::NotFound)
        }
    }

    /// Delete every line in the owner's cart. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the delete fails.
    pub async fn clear_cart(&self, owner: &OwnerKey) -> Result<u64, CartError> {
        Ok(self.carts.clear(owner).await?)
    }

    // =========================================================================
    // Cart views and totals
    // =========================================================================

    /// The owner's lines joined with current product data, for display.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn get_cart_items(&self, owner: &OwnerKey) -> Result<Vec<CartItemView>, CartError> {
        Ok(self.carts.list_with_products(owner).await?)
    }

    /// Cart total: `round2(Σ round2(unit_price * quantity))` over the
    /// price snapshots, not current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn get_total(&self, owner: &OwnerKey) -> Result<Decimal, CartError> {
        let lines = self.carts.list(owner).await?;
        Ok(round2(lines.iter().map(CartLine::total).sum()))
    }

    /// Total units in the cart (sum of quantities).
    ///
    /// Not to be confused with [`get_items_quantity`](Self::get_items_quantity),
    /// which counts distinct lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn get_items_count(&self, owner: &OwnerKey) -> Result<i64, CartError> {
        let lines = self.carts.list(owner).await?;
        Ok(lines.iter().map(|line| line.quantity).sum())
    }

    /// Number of distinct lines (positions) in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn get_items_quantity(&self, owner: &OwnerKey) -> Result<usize, CartError> {
        let lines = self.carts.list(owner).await?;
        Ok(lines.len())
    }

    /// Whether the owner's cart has no lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn is_empty(&self, owner: &OwnerKey) -> Result<bool, CartError> {
        Ok(self.get_items_quantity(owner).await? == 0)
    }

    // =========================================================================
    // Synchronization and availability
    // =========================================================================

    /// Re-snapshot stale line prices from the catalog. Returns the number
    /// of lines updated.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the update fails.
    pub async fn sync_prices(&self, owner: &OwnerKey) -> Result<u64, CartError> {
        let updated = self.carts.sync_prices(owner).await?;
        if updated > 0 {
            tracing::info!(%owner, updated, "cart prices resynchronized");
        }
        Ok(updated)
    }

    /// Check whether every line in the cart can currently be fulfilled.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn check_availability(&self, owner: &OwnerKey) -> Result<CartAvailability, CartError> {
        let items = self.carts.list_with_products(owner).await?;
        Ok(evaluate_availability(&items))
    }

    /// Merge a guest session's cart into a user's cart (at login).
    ///
    /// Quantities for shared products are added together; remaining guest
    /// lines move to the user. The guest cart is empty afterwards. Atomic:
    /// a failure leaves both carts untouched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the merge fails.
    pub async fn merge_guest_cart(
        &self,
        session_id: &SessionId,
        user_id: UserId,
    ) -> Result<(), CartError> {
        let guest = OwnerKey::guest(session_id.clone());
        let user = OwnerKey::user(user_id);

        self.carts.merge_guest(&guest, &user).await?;
        tracing::info!(%guest, %user, "guest cart merged");
        Ok(())
    }
}

/// Classify each line of a cart against current product data.
pub(crate) fn evaluate_availability(items: &[CartItemView]) -> CartAvailability {
    let unavailable_items: Vec<UnavailableItem> = items
        .iter()
        .filter(|item| !item.is_available())
        .map(|item| UnavailableItem {
            product_id: item.line.product_id,
            product_name: item.product_name.clone(),
            requested: item.line.quantity,
            available: if item.product_available {
                item.product_stock
            } else {
                0
            },
        })
        .collect();

    CartAvailability {
        available: unavailable_items.is_empty(),
        unavailable_items,
    }
}

fn check_stock(product: &Product, requested: i64) -> Result<(), CartError> {
    if product.stock < requested {
        return Err(CartError::InsufficientStock {
            name: product.name.clone(),
            requested,
            available: product.stock,
        });
    }
    Ok(())
}
