//! Backend Error Module
//!
//! This module defines the error type returned by every HTTP handler and
//! middleware. Each error carries a machine-readable code and converts into
//! the JSON error envelope clients rely on.
//!
//! # Architecture
//!
//! The error module is organized into focused submodules:
//!
//! - **`types`** - `ApiError` definition, constructors, status and code mapping
//! - **`conversion`** - `IntoResponse` and conversions from lower-layer errors
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! # Error Envelope
//!
//! ```json
//! {
//!   "error": "Price must be at least ₹1000",
//!   "code": "INVALID_PRICE",
//!   "timestamp": "2024-05-01T12:00:00.000000Z"
//! }
//! ```
//!
//! Internal errors additionally carry a `details` field outside production.
//!
//! # Example
//!
//! ```rust,no_run
//! use swapin::backend::error::ApiError;
//!
//! fn check_owner(owner_id: &str, uid: &str) -> Result<(), ApiError> {
//!     if owner_id != uid {
//!         return Err(ApiError::forbidden("FORBIDDEN", "You can only modify your own items"));
//!     }
//!     Ok(())
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use conversion::{is_production, set_production, StoreResultExt};
pub use types::ApiError;

/// Result type used by handlers
pub type ApiResult<T> = Result<T, ApiError>;
