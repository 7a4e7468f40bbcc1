//! Catalog Store repository.
//!
//! Products are owned by the catalog side of the system; the engines read
//! them and move their stock counters. Stock moves inside order
//! transactions use the conditional forms below, never check-then-act.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use cloudberry_core::ProductId;

use super::{RepositoryError, money_to_db, parse_money};
use crate::models::{NewProduct, Product};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, name, price, stock, available, created_at, updated_at
            FROM product
            WHERE id = ?1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_product).transpose()
    }

    /// Insert a product into the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query(
            r"
            INSERT INTO product (name, price, stock, available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id, name, price, stock, available, created_at, updated_at
            ",
        )
        .bind(&product.name)
        .bind(money_to_db(product.price))
        .bind(product.stock)
        .bind(product.available)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        map_product(&row)
    }

    /// Update a product's catalog price.
    ///
    /// Existing cart lines keep their snapshots; only `sync_prices` follows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_price(&self, id: ProductId, price: Decimal) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product SET price = ?1, updated_at = ?2 WHERE id = ?3
            ",
        )
        .bind(money_to_db(price))
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set a product's stock counter outright (catalog-side adjustment).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_stock(&self, id: ProductId, stock: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product SET stock = ?1, updated_at = ?2 WHERE id = ?3
            ",
        )
        .bind(stock)
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Flip a product's availability flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_available(
        &self,
        id: ProductId,
        available: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product SET available = ?1, updated_at = ?2 WHERE id = ?3
            ",
        )
        .bind(available)
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Atomically take `quantity` units of stock, inside a transaction.
///
/// Returns `false` when the product is unavailable or has fewer than
/// `quantity` units left - the caller must treat that as insufficient stock
/// and roll the transaction back. This is the conditional-decrement
/// discipline that makes concurrent checkouts safe: the check and the write
/// are one statement.
pub(crate) async fn take_stock(
    conn: &mut SqliteConnection,
    id: ProductId,
    quantity: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r"
        UPDATE product
        SET stock = stock - ?1, updated_at = ?2
        WHERE id = ?3 AND available = 1 AND stock >= ?1
        ",
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(id.as_i64())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Return `quantity` units of stock, inside a transaction (cancellation).
pub(crate) async fn restore_stock(
    conn: &mut SqliteConnection,
    id: ProductId,
    quantity: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3
        ",
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(id.as_i64())
    .execute(conn)
    .await?;

    Ok(())
}

/// Map a full product row.
pub(crate) fn map_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let price: String = row.try_get("price")?;
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        price: parse_money("product.price", &price)?,
        stock: row.try_get("stock")?,
        available: row.try_get("available")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
