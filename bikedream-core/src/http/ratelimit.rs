//! Per-user sliding-window rate limiting for mutating endpoints.

use std::time::{Duration, Instant};

use scc::HashMap as SccHashMap;

use crate::error::{ApiError, ApiResult};

pub struct RateLimiter {
    window: Duration,
    max_hits: u32,
    hits: SccHashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    /// `max_hits` of zero disables the limiter.
    pub fn new(max_hits: u32, window: Duration) -> Self {
        Self { window, max_hits, hits: SccHashMap::new() }
    }

    /// Per-minute convenience constructor.
    pub fn per_minute(max_hits: u32) -> Self {
        Self::new(max_hits, Duration::from_secs(60))
    }

    /// Record a hit for `key` and fail with `RateLimited` once the window
    /// budget is exhausted. Pruning and recording run under the entry
    /// lock, so concurrent hits never overshoot the budget.
    pub async fn check(&self, key: &str) -> ApiResult<()> {
        if self.max_hits == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let window = self.window;
        let max_hits = self.max_hits as usize;

        let mut entry = self.hits.entry_async(key.to_string()).await.or_insert_with(Vec::new);
        let timestamps = entry.get_mut();
        timestamps.retain(|t| now.duration_since(*t) < window);
        if timestamps.len() >= max_hits {
            return Err(ApiError::RateLimited);
        }
        timestamps.push(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_budget_enforced_per_key() {
        let limiter = RateLimiter::per_minute(3);
        for _ in 0..3 {
            limiter.check("u-1").await.unwrap();
        }
        assert_eq!(limiter.check("u-1").await.unwrap_err(), ApiError::RateLimited);
        // Other callers are unaffected.
        limiter.check("u-2").await.unwrap();
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_millis(30));
        limiter.check("u-1").await.unwrap();
        assert!(limiter.check("u-1").await.is_err());

        tokio::time::sleep(Duration::from_millis(40)).await;
        limiter.check("u-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_budget_disables() {
        let limiter = RateLimiter::per_minute(0);
        for _ in 0..1000 {
            limiter.check("u-1").await.unwrap();
        }
    }
}
