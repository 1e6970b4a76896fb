//! Authentication Module
//!
//! Resolves the caller of every API request from a bearer credential. The
//! backend never issues or stores credentials itself; it only verifies them
//! through an [`IdentityVerifier`] and hands the resulting [`Identity`] to
//! the handlers.
//!
//! # Architecture
//!
//! - **`sessions`** - JWT verification (`JwtIdentityVerifier`) and token issuing
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs       - Identity, IdentityVerifier trait, AuthError
//! └── sessions.rs  - JWT claims and verifier
//! ```
//!
//! # Authentication Flow
//!
//! 1. The auth middleware reads `Authorization: Bearer <token>`
//! 2. The verifier decodes the token into an `Identity`
//! 3. The identity is attached to the request extensions
//! 4. Handlers receive it through the `AuthUser` extractor
//!
//! Every request is verified again; there are no server-side sessions.

/// JWT token verification
pub mod sessions;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sessions::{create_token, Claims, JwtIdentityVerifier};

/// Decoded caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            name: None,
            picture: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Verifies bearer credentials against the identity service
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
