//! Core types for Cloudberry Commerce.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod order_number;
pub mod owner;
pub mod status;

pub use id::*;
pub use money::{line_total, round2};
pub use order_number::{OrderNumber, OrderNumberError};
pub use owner::{OwnerKey, OwnerKeyError, SessionId};
pub use status::*;
