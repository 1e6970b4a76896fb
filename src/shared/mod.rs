//! Shared Module
//!
//! Types shared by the HTTP layer, the workflows and the tests: the
//! marketplace documents as they are persisted, boundary validation errors
//! and timestamp helpers. Nothing in here depends on the server stack, so the
//! types can be reused by clients compiled without the `ssr` feature.

/// Marketplace documents (users, items, swaps, orders, deliveries, ...)
pub mod marketplace;

/// Shared error types
pub mod error;

/// Timestamp formatting used by every persisted document
pub mod time;

pub use error::SharedError;
pub use marketplace::*;
