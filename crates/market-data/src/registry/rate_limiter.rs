//! Token bucket rate limiter, one bucket per provider.
//!
//! Buckets are sized from each provider's [`RateLimit`]: the refill rate is
//! `requests_per_minute` and the capacity is `burst`. On top of the bucket,
//! consecutive grants are spaced at least `min_delay` apart.
//! Providers that were never configured are not limited.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::provider::RateLimit;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    /// Tokens per second
    rate: f64,
    last_refill: Instant,
    min_delay: Duration,
    last_grant: Option<Instant>,
}

impl TokenBucket {
    fn from_limit(limit: &RateLimit) -> Self {
        let capacity = limit.burst.max(1) as f64;
        Self {
            tokens: capacity,
            capacity,
            rate: f64::from(limit.requests_per_minute.max(1)) / 60.0,
            last_refill: Instant::now(),
            min_delay: limit.min_delay,
            last_grant: None,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token, or report how long until one is available.
    fn take(&mut self) -> Result<(), Duration> {
        self.refill();
        if let Some(last) = self.last_grant {
            let since = self.last_refill.duration_since(last);
            if since < self.min_delay {
                return Err(self.min_delay - since);
            }
        }
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            self.last_grant = Some(self.last_refill);
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / self.rate))
        }
    }
}

pub struct RateLimiter {
    buckets: Mutex<HashMap<&'static str, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the buckets map, recovering from poison.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<&'static str, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Install (or replace) the bucket for a provider. Starts full.
    pub fn configure(&self, provider: &'static str, limit: &RateLimit) {
        self.lock_buckets()
            .insert(provider, TokenBucket::from_limit(limit));
    }

    /// Wait until a token for `provider` is available, then take it.
    pub async fn acquire(&self, provider: &'static str) {
        loop {
            let wait = match self.lock_buckets().get_mut(provider) {
                None => return,
                Some(bucket) => match bucket.take() {
                    Ok(()) => return,
                    Err(wait) => wait,
                },
            };
            debug!("Rate limiter: waiting {:?} for '{}'", wait, provider);
            tokio::time::sleep(wait).await;
        }
    }

    /// Take a token without waiting. Returns false if the bucket is empty.
    #[cfg(test)]
    fn try_acquire(&self, provider: &'static str) -> bool {
        self.lock_buckets()
            .get_mut(provider)
            .map_or(true, |bucket| bucket.take().is_ok())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(per_minute: u32, burst: usize) -> RateLimit {
        RateLimit {
            requests_per_minute: per_minute,
            burst,
            min_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_unconfigured_provider_is_unlimited() {
        let limiter = RateLimiter::new();
        for _ in 0..100 {
            assert!(limiter.try_acquire("YAHOO"));
        }
    }

    #[test]
    fn test_burst_then_empty() {
        let limiter = RateLimiter::new();
        limiter.configure("FINNHUB", &limit(60, 3));

        assert!(limiter.try_acquire("FINNHUB"));
        assert!(limiter.try_acquire("FINNHUB"));
        assert!(limiter.try_acquire("FINNHUB"));
        assert!(!limiter.try_acquire("FINNHUB"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let limiter = RateLimiter::new();
        limiter.configure("FINNHUB", &limit(60, 1));

        let start = Instant::now();
        limiter.acquire("FINNHUB").await;
        limiter.acquire("FINNHUB").await;

        // 60/min refills one token per second
        assert!(start.elapsed() >= Duration::from_millis(990));
    }

    #[test]
    fn test_reconfigure_refills() {
        let limiter = RateLimiter::new();
        limiter.configure("FINNHUB", &limit(60, 1));
        assert!(limiter.try_acquire("FINNHUB"));
        assert!(!limiter.try_acquire("FINNHUB"));

        limiter.configure("FINNHUB", &limit(60, 1));
        assert!(limiter.try_acquire("FINNHUB"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_delay_spaces_grants() {
        let limiter = RateLimiter::new();
        limiter.configure(
            "FINNHUB",
            &RateLimit {
                requests_per_minute: 60,
                burst: 5,
                min_delay: Duration::from_secs(1),
            },
        );

        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire("FINNHUB").await;
        }

        // Tokens were available for all five; only the spacing held them back
        assert!(start.elapsed() >= Duration::from_secs(4));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_delay_blocks_try_acquire() {
        let limiter = RateLimiter::new();
        limiter.configure(
            "YAHOO",
            &RateLimit {
                requests_per_minute: 6000,
                burst: 10,
                min_delay: Duration::from_millis(50),
            },
        );

        assert!(limiter.try_acquire("YAHOO"));
        assert!(!limiter.try_acquire("YAHOO"));

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(limiter.try_acquire("YAHOO"));
    }
}
