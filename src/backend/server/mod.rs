//! Server Module
//!
//! Server-side setup for the Axum HTTP server: configuration, application
//! state and app assembly.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure
//! - **`config`** - Configuration loading and validation
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState definition
//! ├── config.rs       - ServerConfig, ConfigError, database loading
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `ServerConfig::from_env()`
//! 2. **Storage**: PostgreSQL when `DATABASE_URL` is reachable, otherwise the
//!    in-memory store
//! 3. **Collaborators**: identity verifier, rate limiter, push sender
//! 4. **Background Tasks**: periodic rate-limit window cleanup
//! 5. **Router Creation**: routes, auth, rate limiting, tracing and CORS
//!
//! # Example
//!
//! ```rust,no_run
//! use swapin::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{build_state, create_app};
pub use state::AppState;
