/**
 * In-Memory Sliding Window Limiter
 *
 * One `VecDeque` of hit timestamps per key in a `DashMap`. State is local to
 * the process: it resets on restart and is not shared between instances.
 */

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::{RateDecision, RateLimitConfig, RateLimitError, RateLimiter};

pub struct MemoryRateLimiter {
    hits: DashMap<String, VecDeque<DateTime<Utc>>>,
    config: RateLimitConfig,
}

impl MemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            hits: DashMap::new(),
            config,
        }
    }

    /// Get number of tracked keys
    pub fn key_count(&self) -> usize {
        self.hits.len()
    }

    fn acquire(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        let cutoff = now - self.config.window;
        let mut window = self.hits.entry(key.to_string()).or_default();

        while window.front().is_some_and(|hit| *hit <= cutoff) {
            window.pop_front();
        }

        let used = window.len() as u32;
        if used >= self.config.max_requests {
            return RateDecision::Limited;
        }
        window.push_back(now);
        RateDecision::Allowed {
            remaining: self.config.max_requests - used - 1,
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn try_acquire(&self, key: &str, now: DateTime<Utc>) -> Result<RateDecision, RateLimitError> {
        Ok(self.acquire(key, now))
    }

    async fn cleanup(&self, now: DateTime<Utc>) -> Result<usize, RateLimitError> {
        let cutoff = now - self.config.window;
        let mut removed = 0;
        self.hits.retain(|key, window| {
            let before = window.len();
            window.retain(|hit| *hit > cutoff);
            removed += before - window.len();
            if window.is_empty() {
                debug!(key = %key, "Removing idle rate limit window");
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn limiter(max: u32) -> MemoryRateLimiter {
        MemoryRateLimiter::new(RateLimitConfig::per_minute(max))
    }

    #[test]
    fn test_sixty_first_request_is_limited() {
        let limiter = limiter(60);
        let start = Utc::now();
        for i in 0..60 {
            let decision = limiter.acquire("u1", start + Duration::milliseconds(i * 10));
            assert!(decision.is_allowed(), "request {} should pass", i + 1);
        }
        assert_eq!(
            limiter.acquire("u1", start + Duration::seconds(1)),
            RateDecision::Limited
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1);
        let now = Utc::now();
        assert!(limiter.acquire("a", now).is_allowed());
        assert!(limiter.acquire("b", now).is_allowed());
        assert_eq!(limiter.acquire("a", now), RateDecision::Limited);
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2);
        let start = Utc::now();
        assert!(limiter.acquire("u1", start).is_allowed());
        assert!(limiter.acquire("u1", start + Duration::seconds(30)).is_allowed());
        assert_eq!(limiter.acquire("u1", start + Duration::seconds(59)), RateDecision::Limited);
        // The first hit is exactly 60s old and no longer counts
        assert!(limiter.acquire("u1", start + Duration::seconds(60)).is_allowed());
    }

    #[test]
    fn test_limited_requests_are_not_recorded() {
        let limiter = limiter(1);
        let start = Utc::now();
        assert!(limiter.acquire("u1", start).is_allowed());
        for s in 1..30 {
            assert_eq!(limiter.acquire("u1", start + Duration::seconds(s)), RateDecision::Limited);
        }
        assert!(limiter.acquire("u1", start + Duration::seconds(61)).is_allowed());
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_keys() {
        let limiter = limiter(5);
        let start = Utc::now();
        limiter.try_acquire("old", start).await.unwrap();
        limiter.try_acquire("fresh", start + Duration::seconds(50)).await.unwrap();

        let removed = limiter.cleanup(start + Duration::seconds(70)).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(limiter.key_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_never_more_than_max_in_any_window(
            max in 1u32..20,
            gaps in proptest::collection::vec(0i64..5_000, 1..200),
        ) {
            let limiter = limiter(max);
            let start = Utc::now();
            let mut t = start;
            let mut accepted: Vec<DateTime<Utc>> = Vec::new();
            for gap in gaps {
                t += Duration::milliseconds(gap);
                if limiter.acquire("k", t).is_allowed() {
                    accepted.push(t);
                }
            }
            for (i, hit) in accepted.iter().enumerate() {
                let in_window = accepted[i..]
                    .iter()
                    .filter(|other| **other - *hit < Duration::seconds(60))
                    .count();
                prop_assert!(in_window as u32 <= max);
            }
        }
    }
}
