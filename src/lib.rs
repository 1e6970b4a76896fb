//! Swapin - Marketplace Backend Library
//!
//! Swapin is a peer-to-peer marketplace where users list second-hand items,
//! swap them with each other or buy them outright, and arrange the delivery
//! of what changed hands.
//!
//! # Module Structure
//!
//! The library is organized into two modules:
//!
//! - **`shared`** - Documents as they are persisted, boundary validation
//!   errors and timestamp helpers. No server dependencies.
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP API under `/api/<operation>`
//!   - Document store (in-memory or PostgreSQL)
//!   - Bearer auth, rate limiting, push notifications
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend and its server stack
//!
//! # Usage
//!
//! ```rust,no_run
//! use swapin::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for boundary validation failures
//! - `backend::store::StoreError` for persistence failures
//! - `backend::error::ApiError` for everything returned over HTTP

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
