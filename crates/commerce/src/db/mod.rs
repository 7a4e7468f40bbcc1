//! Database layer for the commerce engines.
//!
//! ## Tables
//!
//! - `product` - Catalog Store surface: price, stock, availability
//! - `cart_item` - one row per (owner, product) cart line
//! - `orders` / `order_item` - immutable order history
//! - `order_counter` - per-year order numbering sequence
//!
//! Monetary values are `rust_decimal::Decimal` stored as text with exactly
//! two fractional digits; enum columns store the snake_case codings from
//! `cloudberry-core`. Multi-step mutations always run inside a single
//! transaction so no intermediate state is externally visible.

pub mod cart;
pub mod orders;
pub mod products;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use cloudberry_core::{OwnerKey, round2};

/// Embedded schema migrations, applied with [`run_migrations`].
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate order number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; WAL journaling keeps readers
/// from blocking the single writer.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply the embedded schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Encode a monetary amount for storage: rounded half-up and rescaled to
/// exactly two fractional digits.
#[must_use]
pub(crate) fn money_to_db(amount: Decimal) -> String {
    let mut amount = round2(amount);
    amount.rescale(2);
    amount.to_string()
}

/// Decode a stored monetary amount.
pub(crate) fn parse_money(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid decimal in {column}: {raw:?} ({e})"))
    })
}

/// Decode a stored owner key.
pub(crate) fn parse_owner(raw: &str) -> Result<OwnerKey, RepositoryError> {
    OwnerKey::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid owner key: {e}")))
}

/// Decode a stored enum coding (status, delivery method, payment method).
pub(crate) fn parse_coded<T>(raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))
}
