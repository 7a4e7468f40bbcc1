//! Shared helpers for the Cloudberry Commerce integration tests.
//!
//! Every test runs against its own in-memory `SQLite` database with the
//! embedded migrations applied, so the suite is hermetic and needs no
//! external services. The pool is capped at one connection: an in-memory
//! database lives and dies with its connection.

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::SqlitePool;

use cloudberry_commerce::db::products::ProductRepository;
use cloudberry_commerce::{NewOrder, NewProduct, Product, create_pool, run_migrations};
use cloudberry_core::{DeliveryMethod, PaymentMethod};

/// Create a fresh in-memory database with the schema applied.
///
/// # Panics
///
/// Panics if the pool cannot be created or migrations fail.
pub async fn setup_pool() -> SqlitePool {
    let pool = create_pool(&SecretString::from("sqlite::memory:"), 1)
        .await
        .expect("failed to create test pool");
    run_migrations(&pool).await.expect("failed to run migrations");
    pool
}

/// Seed an orderable product.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn seed_product(pool: &SqlitePool, name: &str, price: Decimal, stock: i64) -> Product {
    ProductRepository::new(pool)
        .create(&NewProduct {
            name: name.to_owned(),
            price,
            stock,
            available: true,
        })
        .await
        .expect("failed to seed product")
}

/// Checkout details for a test customer.
#[must_use]
pub fn checkout_details(delivery_method: DeliveryMethod) -> NewOrder {
    NewOrder {
        customer_name: "Test Customer".to_owned(),
        customer_email: "customer@example.com".to_owned(),
        customer_phone: "+36 30 123 4567".to_owned(),
        delivery_address: "1 Example Street, Budapest".to_owned(),
        delivery_method,
        payment_method: PaymentMethod::Card,
        notes: None,
    }
}
