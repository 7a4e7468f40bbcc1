//! Order repository and the order numbering authority.
//!
//! Orders and their lines are written atomically by the order engine's
//! transactions; this module owns the row shapes, the per-year numbering
//! counter, and the status-stamp updates the lifecycle transitions use.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use cloudberry_core::{OrderId, OrderLineId, OrderNumber, OwnerKey, ProductId};

use super::{RepositoryError, money_to_db, parse_coded, parse_money, parse_owner};
use crate::models::{NewOrder, Order, OrderLine};
use crate::pricing::OrderQuote;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, id).await
    }

    /// All orders created for an owner, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: &OwnerKey) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(
            r"
            SELECT * FROM orders WHERE owner_key = ?1 ORDER BY id DESC
            ",
        )
        .bind(owner.as_db_key())
        .fetch_all(&mut *conn)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut order = map_order(row)?;
            order.lines = fetch_lines(&mut conn, order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }
}

/// Issue the next order sequence value for a year.
///
/// A single atomic increment-and-read: the counter row is created at 1 on
/// the first issuance of a year and incremented in place afterwards. Runs
/// inside the order-creation transaction, so an aborted creation rolls the
/// increment back and the sequence stays gapless.
pub(crate) async fn next_sequence(
    conn: &mut SqliteConnection,
    year: i32,
) -> Result<i64, sqlx::Error> {
    let sequence: i64 = sqlx::query_scalar(
        r"
        INSERT INTO order_counter (year, last_value)
        VALUES (?1, 1)
        ON CONFLICT (year) DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        ",
    )
    .bind(year)
    .fetch_one(conn)
    .await?;

    Ok(sequence)
}

/// Insert the order row, returning its ID.
pub(crate) async fn insert_order(
    conn: &mut SqliteConnection,
    owner: &OwnerKey,
    number: &OrderNumber,
    data: &NewOrder,
    quote: &OrderQuote,
    created_at: DateTime<Utc>,
) -> Result<OrderId, RepositoryError> {
    let id: i64 = sqlx::query_scalar(
        r"
        INSERT INTO orders (
            owner_key, order_number,
            customer_name, customer_email, customer_phone, delivery_address,
            delivery_method, payment_method,
            subtotal, delivery_cost, discount, total,
            status, payment_status, notes, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                'pending', 'pending', ?13, ?14)
        RETURNING id
        ",
    )
    .bind(owner.as_db_key())
    .bind(number.as_str())
    .bind(&data.customer_name)
    .bind(&data.customer_email)
    .bind(&data.customer_phone)
    .bind(&data.delivery_address)
    .bind(data.delivery_method.as_str())
    .bind(data.payment_method.as_str())
    .bind(money_to_db(quote.subtotal))
    .bind(money_to_db(quote.delivery_cost))
    .bind(money_to_db(quote.discount))
    .bind(money_to_db(quote.total))
    .bind(data.notes.as_deref())
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict("order number already exists".to_owned());
        }
        RepositoryError::Database(e)
    })?;

    Ok(OrderId::new(id))
}

/// Insert one order line snapshot.
pub(crate) async fn insert_line(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    line: &OrderLineSnapshot<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO order_item (order_id, product_id, product_name, quantity, unit_price, line_total)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ",
    )
    .bind(order_id.as_i64())
    .bind(line.product_id.as_i64())
    .bind(line.product_name)
    .bind(line.quantity)
    .bind(money_to_db(line.unit_price))
    .bind(money_to_db(line.line_total))
    .execute(conn)
    .await?;

    Ok(())
}

/// Snapshot data for one order line at creation time.
pub(crate) struct OrderLineSnapshot<'a> {
    pub product_id: ProductId,
    pub product_name: &'a str,
    pub quantity: i64,
    pub unit_price: rust_decimal::Decimal,
    pub line_total: rust_decimal::Decimal,
}

/// Fetch an order with its lines.
pub(crate) async fn fetch_order(
    conn: &mut SqliteConnection,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query(
        r"
        SELECT * FROM orders WHERE id = ?1
        ",
    )
    .bind(id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut order = map_order(&row)?;
    order.lines = fetch_lines(conn, order.id).await?;
    Ok(Some(order))
}

/// Fetch the lines of an order.
pub(crate) async fn fetch_lines(
    conn: &mut SqliteConnection,
    order_id: OrderId,
) -> Result<Vec<OrderLine>, RepositoryError> {
    let rows = sqlx::query(
        r"
        SELECT id, order_id, product_id, product_name, quantity, unit_price, line_total
        FROM order_item
        WHERE order_id = ?1
        ORDER BY id ASC
        ",
    )
    .bind(order_id.as_i64())
    .fetch_all(conn)
    .await?;

    rows.iter().map(map_line).collect()
}

/// Stamp an order cancelled, recording the restock moment.
pub(crate) async fn mark_cancelled(
    conn: &mut SqliteConnection,
    id: OrderId,
    admin_notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE orders
        SET status = 'cancelled', cancelled_at = ?1, admin_notes = ?2
        WHERE id = ?3
        ",
    )
    .bind(now)
    .bind(admin_notes)
    .bind(id.as_i64())
    .execute(conn)
    .await?;

    Ok(())
}

/// Stamp an order paid.
pub(crate) async fn mark_paid(
    conn: &mut SqliteConnection,
    id: OrderId,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE orders
        SET status = 'paid', payment_status = 'paid', paid_at = ?1
        WHERE id = ?2
        ",
    )
    .bind(now)
    .bind(id.as_i64())
    .execute(conn)
    .await?;

    Ok(())
}

/// Stamp an order shipped.
pub(crate) async fn mark_shipped(
    conn: &mut SqliteConnection,
    id: OrderId,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE orders SET status = 'shipped', shipped_at = ?1 WHERE id = ?2
        ",
    )
    .bind(now)
    .bind(id.as_i64())
    .execute(conn)
    .await?;

    Ok(())
}

/// Stamp an order delivered.
pub(crate) async fn mark_delivered(
    conn: &mut SqliteConnection,
    id: OrderId,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE orders SET status = 'delivered', delivered_at = ?1 WHERE id = ?2
        ",
    )
    .bind(now)
    .bind(id.as_i64())
    .execute(conn)
    .await?;

    Ok(())
}

/// Map an order row (lines filled in separately).
fn map_order(row: &SqliteRow) -> Result<Order, RepositoryError> {
    let owner_key: Option<String> = row.try_get("owner_key")?;
    let order_number: String = row.try_get("order_number")?;
    let delivery_method: String = row.try_get("delivery_method")?;
    let payment_method: String = row.try_get("payment_method")?;
    let subtotal: String = row.try_get("subtotal")?;
    let delivery_cost: String = row.try_get("delivery_cost")?;
    let discount: String = row.try_get("discount")?;
    let total: String = row.try_get("total")?;
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;

    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        owner: owner_key.as_deref().map(parse_owner).transpose()?,
        order_number: OrderNumber::parse(&order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?,
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        customer_phone: row.try_get("customer_phone")?,
        delivery_address: row.try_get("delivery_address")?,
        delivery_method: parse_coded(&delivery_method)?,
        payment_method: parse_coded(&payment_method)?,
        subtotal: parse_money("orders.subtotal", &subtotal)?,
        delivery_cost: parse_money("orders.delivery_cost", &delivery_cost)?,
        discount: parse_money("orders.discount", &discount)?,
        total: parse_money("orders.total", &total)?,
        status: parse_coded(&status)?,
        payment_status: parse_coded(&payment_status)?,
        notes: row.try_get("notes")?,
        admin_notes: row.try_get("admin_notes")?,
        paid_at: row.try_get("paid_at")?,
        shipped_at: row.try_get("shipped_at")?,
        delivered_at: row.try_get("delivered_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
        created_at: row.try_get("created_at")?,
        lines: Vec::new(),
    })
}

/// Map an order line row.
fn map_line(row: &SqliteRow) -> Result<OrderLine, RepositoryError> {
    let unit_price: String = row.try_get("unit_price")?;
    let line_total: String = row.try_get("line_total")?;
    Ok(OrderLine {
        id: OrderLineId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: parse_money("order_item.unit_price", &unit_price)?,
        line_total: parse_money("order_item.line_total", &line_total)?,
    })
}
