//! Rate Limiting Module
//!
//! Per-caller sliding window limits. Each caller key (uid, or client IP for
//! requests without an identity) may make at most `max_requests` requests in
//! any `window`.
//!
//! # Module Structure
//!
//! ```text
//! ratelimit/
//! ├── mod.rs       - RateLimiter trait, RateLimitConfig, RateDecision
//! ├── memory.rs    - In-process limiter (single instance)
//! └── postgres.rs  - Limiter shared by every instance through PostgreSQL
//! ```
//!
//! # Window Semantics
//!
//! On every call, hits at or before `now - window` are discarded. If the
//! remaining count has reached the ceiling the request is limited and not
//! recorded; otherwise `now` is recorded and the request proceeds.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

pub use memory::MemoryRateLimiter;
pub use postgres::PgRateLimiter;

/// Default requests per minute
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::seconds(60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

/// Outcome of a single acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a request for `key` at `now` unless the ceiling is reached
    async fn try_acquire(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, RateLimitError>;

    /// Drop hits that fell out of the window; returns how many were removed
    async fn cleanup(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError>;
}
