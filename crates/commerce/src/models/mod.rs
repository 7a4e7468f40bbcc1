//! Domain records persisted by the commerce engines.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{CartAvailability, CartItemView, CartLine, UnavailableItem};
pub use order::{NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product};
