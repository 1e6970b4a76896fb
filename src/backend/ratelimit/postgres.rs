/**
 * PostgreSQL Sliding Window Limiter
 *
 * Hits are rows in `rate_limit_hits`. Each acquisition runs in a transaction
 * holding a transaction-scoped advisory lock on the key, so concurrent
 * requests for the same caller, from any instance, are counted one at a
 * time.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RateDecision, RateLimitConfig, RateLimitError, RateLimiter};

#[derive(Debug, Clone)]
pub struct PgRateLimiter {
    pool: PgPool,
    config: RateLimitConfig,
}

impl PgRateLimiter {
    pub fn new(pool: PgPool, config: RateLimitConfig) -> Self {
        Self { pool, config }
    }
}

#[async_trait]
impl RateLimiter for PgRateLimiter {
    async fn try_acquire(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, RateLimitError> {
        let cutoff = now - self.config.window;
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM rate_limit_hits WHERE key = $1 AND hit_at <= $2")
            .bind(key)
            .bind(cutoff)
            .execute(&mut *tx)
            .await?;

        let used: i64 = sqlx::query_scalar("SELECT count(*) FROM rate_limit_hits WHERE key = $1")
            .bind(key)
            .fetch_one(&mut *tx)
            .await?;

        let max = i64::from(self.config.max_requests);
        if used >= max {
            tx.commit().await?;
            return Ok(RateDecision::Limited);
        }

        sqlx::query("INSERT INTO rate_limit_hits (key, hit_at) VALUES ($1, $2)")
            .bind(key)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(RateDecision::Allowed {
            remaining: (max - used - 1) as u32,
        })
    }

    async fn cleanup(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError> {
        let result = sqlx::query("DELETE FROM rate_limit_hits WHERE hit_at <= $1")
            .bind(now - self.config.window)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}
