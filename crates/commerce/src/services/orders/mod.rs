//! Order engine.
//!
//! Converts a cart into an immutable order, prices it, allocates its order
//! number, and drives the status lifecycle. Order creation and cancellation
//! are each a single database transaction: stock moves, order rows, counter
//! increments and cart deletion either all happen or none do.

mod error;

pub use error::OrderError;

use chrono::{Datelike, Utc};
use sqlx::SqlitePool;

use cloudberry_core::{DeliveryMethod, OrderId, OrderNumber, OrderStatus, OwnerKey, round2};

use crate::db::cart::CartRepository;
use crate::db::orders::{self, OrderLineSnapshot, OrderRepository};
use crate::db::{RepositoryError, cart as cart_db, products as product_db};
use crate::models::{CartLine, NewOrder, Order, UnavailableItem};
use crate::pricing::{self, OrderQuote};
use crate::services::cart::evaluate_availability;

/// Order engine.
pub struct OrderService<'a> {
    pool: &'a SqlitePool,
    orders: OrderRepository<'a>,
    carts: CartRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
            carts: CartRepository::new(pool),
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Create an order from the owner's cart.
    ///
    /// One transaction covers the cart snapshot, pricing, order numbering,
    /// order and line inserts, the per-line conditional stock decrements,
    /// and clearing the cart. Any failure rolls the whole thing back,
    /// leaving cart, stock and counters exactly as before the call.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if the cart has no lines, and
    /// `OrderError::ItemsUnavailable` (with per-line detail, no partial
    /// order) if any line cannot be fulfilled.
    pub async fn create_order(
        &self,
        owner: &OwnerKey,
        data: &NewOrder,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // Snapshot the cart inside the transaction.
        let items = cart_db::list_with_products(&mut tx, owner).await?;
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let availability = evaluate_availability(&items);
        if !availability.available {
            return Err(OrderError::ItemsUnavailable(availability.unavailable_items));
        }

        let subtotal = round2(items.iter().map(|item| item.line.total()).sum());
        let quote = pricing::quote(subtotal, data.delivery_method);

        let now = Utc::now();
        let year = now.year();
        let sequence = orders::next_sequence(&mut tx, year)
            .await
            .map_err(RepositoryError::from)?;
        let number = OrderNumber::format(year, sequence);

        let order_id = orders::insert_order(&mut tx, owner, &number, data, &quote, now).await?;

        for item in &items {
            orders::insert_line(
                &mut tx,
                order_id,
                &OrderLineSnapshot {
                    product_id: item.line.product_id,
                    product_name: &item.product_name,
                    quantity: item.line.quantity,
                    unit_price: item.line.unit_price,
                    line_total: item.line.total(),
                },
            )
            .await
            .map_err(RepositoryError::from)?;

            // Final safety net: the availability check above ran in this
            // same transaction, but the decrement re-verifies atomically.
            let taken = product_db::take_stock(&mut tx, item.line.product_id, item.line.quantity)
                .await
                .map_err(RepositoryError::from)?;
            if !taken {
                return Err(OrderError::ItemsUnavailable(vec![UnavailableItem {
                    product_id: item.line.product_id,
                    product_name: item.product_name.clone(),
                    requested: item.line.quantity,
                    available: if item.product_available {
                        item.product_stock
                    } else {
                        0
                    },
                }]));
            }
        }

        cart_db::clear(&mut tx, owner).await.map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            %owner,
            %order_id,
            order_number = %number,
            total = %quote.total,
            "order created"
        );

        self.get_order(order_id).await
    }

    /// Price the owner's current cart without persisting anything.
    ///
    /// Shares the pricing code path with [`create_order`](Self::create_order),
    /// so the preview always matches what checkout will charge. An empty
    /// cart prices to zeros.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the cart cannot be read.
    pub async fn calculate_order_total(
        &self,
        owner: &OwnerKey,
        delivery_method: DeliveryMethod,
    ) -> Result<OrderQuote, OrderError> {
        let lines = self.carts.list(owner).await?;
        let subtotal = round2(lines.iter().map(CartLine::total).sum());
        Ok(pricing::quote(subtotal, delivery_method))
    }

    // =========================================================================
    // Lifecycle transitions
    // =========================================================================

    /// Cancel an order, restoring its line quantities to product stock.
    ///
    /// The stock restoration and the status change are one transaction.
    /// `reason` is appended to the order's admin notes.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist and
    /// `OrderError::NotCancellable` unless it is pending, processing, or
    /// paid.
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        reason: Option<&str>,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order = orders::fetch_order(&mut tx, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.status.is_cancellable() {
            return Err(OrderError::NotCancellable {
                status: order.status,
            });
        }

        for line in &order.lines {
            product_db::restore_stock(&mut tx, line.product_id, line.quantity)
                .await
                .map_err(RepositoryError::from)?;
        }

        let admin_notes = append_note(order.admin_notes.as_deref(), reason);
        orders::mark_cancelled(&mut tx, order_id, admin_notes.as_deref(), Utc::now())
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%order_id, order_number = %order.order_number, "order cancelled");
        self.get_order(order_id).await
    }

    /// Mark an order as paid.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist and
    /// `OrderError::InvalidTransition` if its status does not allow the
    /// move to `paid` - cancelled, shipped, delivered, and already-paid
    /// orders are all rejected.
    pub async fn mark_as_paid(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderStatus::Paid).await
    }

    /// Mark a paid order as shipped.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` or `OrderError::InvalidTransition`.
    pub async fn mark_as_shipped(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderStatus::Shipped).await
    }

    /// Mark a shipped order as delivered.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` or `OrderError::InvalidTransition`.
    pub async fn mark_as_delivered(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderStatus::Delivered).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders.get(order_id).await?.ok_or(OrderError::NotFound)
    }

    /// All orders created for an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn get_orders(&self, owner: &OwnerKey) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_owner(owner).await?)
    }

    /// Validate a status transition against the transition table, then
    /// apply the matching stamp inside a transaction.
    async fn transition(&self, order_id: OrderId, to: OrderStatus) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order = orders::fetch_order(&mut tx, order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to,
            });
        }

        let now = Utc::now();
        match to {
            OrderStatus::Paid => orders::mark_paid(&mut tx, order_id, now).await,
            OrderStatus::Shipped => orders::mark_shipped(&mut tx, order_id, now).await,
            OrderStatus::Delivered => orders::mark_delivered(&mut tx, order_id, now).await,
            // Cancellation goes through cancel_order; the initial statuses
            // are never targets of a stamp.
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Cancelled => {
                return Err(OrderError::InvalidTransition {
                    from: order.status,
                    to,
                });
            }
        }
        .map_err(RepositoryError::from)?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%order_id, status = %to, "order status updated");
        self.get_order(order_id).await
    }
}

/// Append a cancellation reason to any existing admin notes.
fn append_note(existing: Option<&str>, reason: Option<&str>) -> Option<String> {
    match (existing, reason) {
        (Some(notes), Some(reason)) => Some(format!("{notes}\n{reason}")),
        (None, Some(reason)) => Some(reason.to_owned()),
        (Some(notes), None) => Some(notes.to_owned()),
        (None, None) => None,
    }
}
