//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs         - Module exports and documentation
//! ├── router.rs      - Router assembly, health check and global layers
//! └── api_routes.rs  - `/api/<operation>` table
//! ```
//!
//! # Route Types
//!
//! - `GET /health` - Liveness probe, no authentication
//! - `/api/<operation>` - Marketplace operations, bearer auth and rate limit
//!
//! Unknown paths get a 404 envelope with code `NOT_FOUND`.

pub mod api_routes;
pub mod router;

pub use router::create_router;
