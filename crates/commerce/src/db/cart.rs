//! Cart line repository.
//!
//! Every query is scoped by the owner key: one owner's rows are invisible
//! to operations issued for another owner. The multi-line operations
//! (price sync, guest merge) run inside their own transactions.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use cloudberry_core::{CartLineId, OwnerKey, ProductId};

use super::{RepositoryError, money_to_db, parse_money, parse_owner};
use crate::models::{CartItemView, CartLine};

/// Price drift below this threshold is ignored by `sync_prices`.
const PRICE_SYNC_EPSILON: Decimal = dec!(0.01);

/// Repository for cart line database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a line by ID, scoped to its owner.
    ///
    /// A line belonging to a different owner is reported exactly like a
    /// nonexistent one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(
        &self,
        owner: &OwnerKey,
        line_id: CartLineId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, owner_key, product_id, quantity, unit_price, created_at, updated_at
            FROM cart_item
            WHERE id = ?1 AND owner_key = ?2
            ",
        )
        .bind(line_id.as_i64())
        .bind(owner.as_db_key())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_cart_line).transpose()
    }

    /// Find the owner's line for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_product(
        &self,
        owner: &OwnerKey,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, owner_key, product_id, quantity, unit_price, created_at, updated_at
            FROM cart_item
            WHERE owner_key = ?1 AND product_id = ?2
            ",
        )
        .bind(owner.as_db_key())
        .bind(product_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_cart_line).transpose()
    }

    /// All of the owner's lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: &OwnerKey) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_key, product_id, quantity, unit_price, created_at, updated_at
            FROM cart_item
            WHERE owner_key = ?1
            ORDER BY id ASC
            ",
        )
        .bind(owner.as_db_key())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_cart_line).collect()
    }

    /// All of the owner's lines joined with current product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_products(
        &self,
        owner: &OwnerKey,
    ) -> Result<Vec<CartItemView>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        list_with_products(&mut conn, owner).await
    }

    /// Add quantity to the owner's line for a product, creating the line
    /// (with the given price snapshot) if none exists yet. One atomic
    /// upsert, so concurrent adds cannot produce duplicate lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert_add(
        &self,
        owner: &OwnerKey,
        product_id: ProductId,
        quantity: i64,
        unit_price: Decimal,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO cart_item (owner_key, product_id, quantity, unit_price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (owner_key, product_id) DO UPDATE
                SET quantity = cart_item.quantity + excluded.quantity,
                    updated_at = excluded.updated_at
            RETURNING id, owner_key, product_id, quantity, unit_price, created_at, updated_at
            ",
        )
        .bind(owner.as_db_key())
        .bind(product_id.as_i64())
        .bind(quantity)
        .bind(money_to_db(unit_price))
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        map_cart_line(&row)
    }

    /// Set the quantity of an owned line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is absent or owned by
    /// someone else.
    pub async fn update_quantity(
        &self,
        owner: &OwnerKey,
        line_id: CartLineId,
        quantity: i64,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query(
            r"
            UPDATE cart_item
            SET quantity = ?1, updated_at = ?2
            WHERE id = ?3 AND owner_key = ?4
            RETURNING id, owner_key, product_id, quantity, unit_price, created_at, updated_at
            ",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(line_id.as_i64())
        .bind(owner.as_db_key())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(map_cart_line)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete an owned line. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete(
        &self,
        owner: &OwnerKey,
        line_id: CartLineId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_item WHERE id = ?1 AND owner_key = ?2
            ",
        )
        .bind(line_id.as_i64())
        .bind(owner.as_db_key())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all of the owner's lines. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear(&self, owner: &OwnerKey) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(clear(&mut conn, owner).await?)
    }

    /// Re-snapshot every line whose price drifted more than 0.01 from the
    /// current catalog price. Returns the number of lines updated. Runs in
    /// one transaction so a cart is never observed half-synced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn sync_prices(&self, owner: &OwnerKey) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r"
            SELECT c.id, c.unit_price, p.price
            FROM cart_item c
            JOIN product p ON p.id = c.product_id
            WHERE c.owner_key = ?1
            ",
        )
        .bind(owner.as_db_key())
        .fetch_all(&mut *tx)
        .await?;

        let mut updated = 0u64;
        let now = Utc::now();
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let snapshot: String = row.try_get("unit_price")?;
            let current: String = row.try_get("price")?;
            let snapshot = parse_money("cart_item.unit_price", &snapshot)?;
            let current = parse_money("product.price", &current)?;

            if (snapshot - current).abs() > PRICE_SYNC_EPSILON {
                sqlx::query(
                    r"
                    UPDATE cart_item SET unit_price = ?1, updated_at = ?2 WHERE id = ?3
                    ",
                )
                .bind(money_to_db(current))
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                updated += 1;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Merge a guest cart into a user cart.
    ///
    /// Lines for products the user already has add their quantities into
    /// the user's line; the rest are re-keyed to the user. One transaction:
    /// a crash mid-merge can neither duplicate nor drop quantities.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn merge_guest(
        &self,
        guest: &OwnerKey,
        user: &OwnerKey,
    ) -> Result<(), RepositoryError> {
        let guest_key = guest.as_db_key();
        let user_key = user.as_db_key();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Fold quantities into the user's existing lines.
        sqlx::query(
            r"
            UPDATE cart_item
            SET quantity = quantity + (
                    SELECT g.quantity FROM cart_item g
                    WHERE g.owner_key = ?1 AND g.product_id = cart_item.product_id
                ),
                updated_at = ?3
            WHERE owner_key = ?2
              AND product_id IN (
                    SELECT product_id FROM cart_item WHERE owner_key = ?1
                )
            ",
        )
        .bind(&guest_key)
        .bind(&user_key)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Drop the guest lines that were folded in.
        sqlx::query(
            r"
            DELETE FROM cart_item
            WHERE owner_key = ?1
              AND product_id IN (
                    SELECT product_id FROM cart_item WHERE owner_key = ?2
                )
            ",
        )
        .bind(&guest_key)
        .bind(&user_key)
        .execute(&mut *tx)
        .await?;

        // Re-key the rest.
        sqlx::query(
            r"
            UPDATE cart_item SET owner_key = ?2, updated_at = ?3 WHERE owner_key = ?1
            ",
        )
        .bind(&guest_key)
        .bind(&user_key)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Transaction-composable form of the product join, used by order creation
/// to snapshot the cart inside its own transaction.
pub(crate) async fn list_with_products(
    conn: &mut SqliteConnection,
    owner: &OwnerKey,
) -> Result<Vec<CartItemView>, RepositoryError> {
    let rows = sqlx::query(
        r"
        SELECT c.id, c.owner_key, c.product_id, c.quantity, c.unit_price,
               c.created_at, c.updated_at,
               p.name AS product_name, p.price AS product_price,
               p.stock AS product_stock, p.available AS product_available
        FROM cart_item c
        JOIN product p ON p.id = c.product_id
        WHERE c.owner_key = ?1
        ORDER BY c.id ASC
        ",
    )
    .bind(owner.as_db_key())
    .fetch_all(conn)
    .await?;

    rows.iter()
        .map(|row| {
            let price: String = row.try_get("product_price")?;
            Ok(CartItemView {
                line: map_cart_line(row)?,
                product_name: row.try_get("product_name")?,
                product_price: parse_money("product.price", &price)?,
                product_stock: row.try_get("product_stock")?,
                product_available: row.try_get("product_available")?,
            })
        })
        .collect()
}

/// Transaction-composable cart clear, used by order creation.
pub(crate) async fn clear(conn: &mut SqliteConnection, owner: &OwnerKey) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r"
        DELETE FROM cart_item WHERE owner_key = ?1
        ",
    )
    .bind(owner.as_db_key())
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Map a cart line row.
fn map_cart_line(row: &SqliteRow) -> Result<CartLine, RepositoryError> {
    let owner_key: String = row.try_get("owner_key")?;
    let unit_price: String = row.try_get("unit_price")?;
    Ok(CartLine {
        id: CartLineId::new(row.try_get("id")?),
        owner: parse_owner(&owner_key)?,
        product_id: ProductId::new(row.try_get("product_id")?),
        quantity: row.try_get("quantity")?,
        unit_price: parse_money("cart_item.unit_price", &unit_price)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
