//! Backend Module
//!
//! This module contains all server-side code for the Swapin marketplace: an
//! Axum HTTP API through which users list items, propose and accept swaps,
//! buy items outright, follow deliveries and receive notifications.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Configuration, application state, app assembly
//! - **`routes`** - `/api/<operation>` table and router-wide layers
//! - **`store`** - Document store trait, in-memory and PostgreSQL stores
//! - **`auth`** - Bearer credential verification
//! - **`middleware`** - Auth, rate limit and method-envelope middleware
//! - **`ratelimit`** - Sliding window limiters
//! - **`error`** - `ApiError` and the JSON error envelope
//! - **`extract`** - Request extractors and paging helpers
//! - **`catalog`** - Items, search, views, likes, recommendations, wishlist
//! - **`swaps`** - Swap proposals and their acceptance
//! - **`orders`** - Buy-now orders, payments, refunds and the cart
//! - **`deliveries`** - Delivery tracking, cost quotes, saved locations
//! - **`notifications`** - Notification inbox and push delivery
//! - **`profile`** - Profiles, settings, reviews and statistics
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── extract.rs      - Payload/Params extractors, Paging
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── store/          - Document persistence
//! ├── auth/           - Identity verification
//! ├── middleware/     - Request middleware
//! ├── ratelimit/      - Rate limiters
//! ├── error/          - Error types
//! ├── catalog/        - Item catalog
//! ├── swaps/          - Swap workflow
//! ├── orders/         - Order and payment workflow
//! ├── deliveries/     - Deliveries
//! ├── notifications/  - Notification dispatcher
//! └── profile/        - Profiles and statistics
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding trait objects for the document
//! store, identity verifier, rate limiter and push sender. The stores are
//! internally synchronized; handlers hold no locks of their own.
//!
//! # Consistency
//!
//! Every operation that changes more than one document commits a single
//! `WriteBatch`. Batches carry guards (e.g. "swap is still pending") that
//! are checked at commit time, so concurrent requests cannot both win and a
//! failed request leaves nothing behind.

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Document persistence
#[cfg(feature = "ssr")]
pub mod store;

/// Backend error types
#[cfg(feature = "ssr")]
pub mod error;

/// Request extractors
#[cfg(feature = "ssr")]
pub mod extract;

/// Identity verification
#[cfg(feature = "ssr")]
pub mod auth;

/// Middleware for request processing
#[cfg(feature = "ssr")]
pub mod middleware;

/// Sliding window rate limiting
#[cfg(feature = "ssr")]
pub mod ratelimit;

/// Notification inbox and push delivery
#[cfg(feature = "ssr")]
pub mod notifications;

/// Item catalog
#[cfg(feature = "ssr")]
pub mod catalog;

/// Swap workflow
#[cfg(feature = "ssr")]
pub mod swaps;

/// Orders, payments and cart
#[cfg(feature = "ssr")]
pub mod orders;

/// Deliveries and saved locations
#[cfg(feature = "ssr")]
pub mod deliveries;

/// Profiles, reviews and statistics
#[cfg(feature = "ssr")]
pub mod profile;

/// Re-export commonly used types
#[cfg(feature = "ssr")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "ssr")]
pub use server::{create_app, AppState, ServerConfig};
#[cfg(feature = "ssr")]
pub use store::{DocumentStore, MemoryStore};
