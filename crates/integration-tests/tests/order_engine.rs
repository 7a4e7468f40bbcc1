//! Integration tests for checkout, order lifecycle, and pricing.

use rust_decimal_macros::dec;

use cloudberry_commerce::db::products::ProductRepository;
use cloudberry_commerce::services::{CartService, OrderService};
use cloudberry_commerce::{CartError, OrderError};
use cloudberry_core::{DeliveryMethod, OrderId, OrderStatus, OwnerKey, PaymentStatus, UserId};
use cloudberry_integration_tests::{checkout_details, seed_product, setup_pool};

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_create_order_snapshots_cart_and_empties_it() {
    let pool = setup_pool().await;
    let coffee = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let mug = seed_product(&pool, "Mug", dec!(800), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, coffee.id, 2).await.unwrap();
    cart.add_item(&owner, mug.id, 1).await.unwrap();

    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Courier))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.owner, Some(owner.clone()));
    assert_eq!(order.lines.len(), 2);

    // subtotal 3200, courier free from 2000, 5% discount from 3000
    assert_eq!(order.subtotal, dec!(3200.00));
    assert_eq!(order.delivery_cost, dec!(0.00));
    assert_eq!(order.discount, dec!(160.00));
    assert_eq!(order.total, dec!(3040.00));

    // The cart is emptied by the same transaction.
    assert!(cart.is_empty(&owner).await.unwrap());
}

#[tokio::test]
async fn test_create_order_decrements_stock() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 4).await.unwrap();
    orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    let refreshed = ProductRepository::new(&pool)
        .get(product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.stock, 6);
}

#[tokio::test]
async fn test_create_order_lines_snapshot_name_and_price() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);
    let products = ProductRepository::new(&pool);

    cart.add_item(&owner, product.id, 2).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    // Catalog edits after checkout do not reach the order.
    products.set_price(product.id, dec!(9999)).await.unwrap();

    let fetched = orders.get_order(order.id).await.unwrap();
    assert_eq!(fetched.lines[0].product_name, "Coffee Beans");
    assert_eq!(fetched.lines[0].unit_price, dec!(1200.00));
    assert_eq!(fetched.lines[0].line_total, dec!(2400.00));
}

#[tokio::test]
async fn test_create_order_rejects_empty_cart() {
    let pool = setup_pool().await;
    let owner = OwnerKey::user(UserId::new(1));
    let orders = OrderService::new(&pool);

    let err = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyCart));
}

#[tokio::test]
async fn test_create_order_with_unavailable_items_changes_nothing() {
    let pool = setup_pool().await;
    let coffee = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let mug = seed_product(&pool, "Mug", dec!(800), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);
    let products = ProductRepository::new(&pool);

    cart.add_item(&owner, coffee.id, 4).await.unwrap();
    cart.add_item(&owner, mug.id, 1).await.unwrap();

    // Stock drops below the cart's quantity before checkout.
    products.set_stock(coffee.id, 2).await.unwrap();

    let err = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Courier))
        .await
        .unwrap_err();
    match err {
        OrderError::ItemsUnavailable(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].product_id, coffee.id);
            assert_eq!(items[0].requested, 4);
            assert_eq!(items[0].available, 2);
        }
        other => panic!("expected ItemsUnavailable, got {other:?}"),
    }

    // No partial order: cart intact, no stock taken, no orders created.
    assert_eq!(cart.get_items_quantity(&owner).await.unwrap(), 2);
    let mug_now = products.get(mug.id).await.unwrap().unwrap();
    assert_eq!(mug_now.stock, 10);
    assert!(orders.get_orders(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insufficient_stock_name_comes_from_catalog() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 1).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);

    let err = cart.add_item(&owner, product.id, 2).await.unwrap_err();
    match err {
        CartError::InsufficientStock { name, .. } => assert_eq!(name, "Coffee Beans"),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

// =============================================================================
// Pricing Preview
// =============================================================================

#[tokio::test]
async fn test_quote_matches_created_order_exactly() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1166.67), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 3).await.unwrap();

    let quote = orders
        .calculate_order_total(&owner, DeliveryMethod::Courier)
        .await
        .unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Courier))
        .await
        .unwrap();

    assert_eq!(order.subtotal, quote.subtotal);
    assert_eq!(order.delivery_cost, quote.delivery_cost);
    assert_eq!(order.discount, quote.discount);
    assert_eq!(order.total, quote.total);
}

#[tokio::test]
async fn test_quote_for_empty_cart_is_all_zeros() {
    let pool = setup_pool().await;
    let owner = OwnerKey::user(UserId::new(1));
    let orders = OrderService::new(&pool);

    let quote = orders
        .calculate_order_total(&owner, DeliveryMethod::Courier)
        .await
        .unwrap();
    assert_eq!(quote.subtotal, dec!(0));
    assert_eq!(quote.delivery_cost, dec!(0));
    assert_eq!(quote.discount, dec!(0));
    assert_eq!(quote.total, dec!(0));
}

#[tokio::test]
async fn test_small_courier_order_pays_delivery() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Mug", dec!(800), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 1).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Courier))
        .await
        .unwrap();

    assert_eq!(order.subtotal, dec!(800.00));
    assert_eq!(order.delivery_cost, dec!(300.00));
    assert_eq!(order.discount, dec!(0.00));
    assert_eq!(order.total, dec!(1100.00));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_order_restores_stock_and_records_reason() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);
    let products = ProductRepository::new(&pool);

    cart.add_item(&owner, product.id, 4).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();
    assert_eq!(products.get(product.id).await.unwrap().unwrap().stock, 6);

    let cancelled = orders
        .cancel_order(order.id, Some("customer changed their mind"))
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert!(
        cancelled
            .admin_notes
            .as_deref()
            .unwrap()
            .contains("customer changed their mind")
    );
    assert_eq!(products.get(product.id).await.unwrap().unwrap().stock, 10);
}

#[tokio::test]
async fn test_cancel_is_rejected_for_shipped_and_terminal_orders() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 1).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    orders.mark_as_paid(order.id).await.unwrap();
    orders.mark_as_shipped(order.id).await.unwrap();

    let err = orders.cancel_order(order.id, None).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotCancellable {
            status: OrderStatus::Shipped
        }
    ));

    orders.mark_as_delivered(order.id).await.unwrap();
    let err = orders.cancel_order(order.id, None).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotCancellable {
            status: OrderStatus::Delivered
        }
    ));
}

#[tokio::test]
async fn test_cancel_twice_is_rejected_without_double_restock() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);
    let products = ProductRepository::new(&pool);

    cart.add_item(&owner, product.id, 4).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    orders.cancel_order(order.id, None).await.unwrap();
    let err = orders.cancel_order(order.id, None).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotCancellable {
            status: OrderStatus::Cancelled
        }
    ));
    assert_eq!(products.get(product.id).await.unwrap().unwrap().stock, 10);
}

// =============================================================================
// Status Transitions
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle_pending_to_delivered() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 1).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Courier))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let paid = orders.mark_as_paid(order.id).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert!(paid.paid_at.is_some());

    let shipped = orders.mark_as_shipped(order.id).await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert!(shipped.shipped_at.is_some());

    let delivered = orders.mark_as_delivered(order.id).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivered_at.is_some());
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 1).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    // Can't ship or deliver before payment.
    let err = orders.mark_as_shipped(order.id).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped
        }
    ));
    let err = orders.mark_as_delivered(order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    // Paying twice is rejected.
    orders.mark_as_paid(order.id).await.unwrap();
    let err = orders.mark_as_paid(order.id).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Paid,
            to: OrderStatus::Paid
        }
    ));
}

#[tokio::test]
async fn test_cancelled_order_cannot_be_paid() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 10).await;
    let owner = OwnerKey::user(UserId::new(1));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&owner, product.id, 1).await.unwrap();
    let order = orders
        .create_order(&owner, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();
    orders.cancel_order(order.id, None).await.unwrap();

    let err = orders.mark_as_paid(order.id).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Paid
        }
    ));
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_get_order_unknown_id_is_not_found() {
    let pool = setup_pool().await;
    let orders = OrderService::new(&pool);

    let err = orders.get_order(OrderId::new(4242)).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound));
}

#[tokio::test]
async fn test_get_orders_is_owner_scoped_and_newest_first() {
    let pool = setup_pool().await;
    let product = seed_product(&pool, "Coffee Beans", dec!(1200), 50).await;
    let alice = OwnerKey::user(UserId::new(1));
    let bob = OwnerKey::user(UserId::new(2));
    let cart = CartService::new(&pool);
    let orders = OrderService::new(&pool);

    cart.add_item(&alice, product.id, 1).await.unwrap();
    let first = orders
        .create_order(&alice, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    cart.add_item(&alice, product.id, 2).await.unwrap();
    let second = orders
        .create_order(&alice, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    cart.add_item(&bob, product.id, 1).await.unwrap();
    orders
        .create_order(&bob, &checkout_details(DeliveryMethod::Pickup))
        .await
        .unwrap();

    let alices = orders.get_orders(&alice).await.unwrap();
    assert_eq!(alices.len(), 2);
    assert_eq!(alices[0].id, second.id);
    assert_eq!(alices[1].id, first.id);
    assert!(alices.iter().all(|order| order.owner == Some(alice.clone())));
}
