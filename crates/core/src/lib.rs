//! Cloudberry Core - Shared types library.
//!
//! This crate provides common types used across all Cloudberry Commerce
//! components:
//! - `commerce` - Cart and order engines over the shared database
//! - `integration-tests` - End-to-end test suite
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, owner keys, money rounding, statuses, and
//!   order numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
