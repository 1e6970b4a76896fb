//! Middleware Module
//!
//! HTTP middleware applied to the `/api` routes.
//!
//! # Architecture
//!
//! - **`auth`** - Bearer token verification, attaches the caller identity
//! - **`rate_limit`** - Per-caller sliding window limit, runs after `auth`
//! - **`method`** - Rewrites axum's bare 405 into the JSON error envelope
//!
//! # Order
//!
//! ```text
//! request -> method gate (405) -> auth (401) -> rate limit (429) -> handler
//! ```

pub mod auth;
pub mod method;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
pub use method::method_not_allowed_envelope;
pub use rate_limit::rate_limit_middleware;
