//! Rate Limiting Infrastructure
//!
//! Keyed fixed-window attempt counters. A window opens on the first hit
//! for a key and lasts for the decay passed to that hit; once it elapses
//! the key reads as zero attempts and the next hit opens a new window.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Attempts allowed inside one window
    pub max_attempts: u32,
    /// Window length, counted from the first attempt
    pub decay: Duration,
}

impl RateLimitConfig {
    pub const fn new(max_attempts: u32, decay_secs: u64) -> Self {
        Self {
            max_attempts,
            decay: Duration::from_secs(decay_secs),
        }
    }
}

/// Rate limiter backend failure
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RateLimitError {
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Box::new(err))
    }
}

/// Keyed attempt counter with a decay window.
///
/// Every operation on a single key is linearizable; callers never need
/// their own locking around `hit`.
#[trait_variant::make(RateLimiter: Send)]
pub trait LocalRateLimiter {
    /// Whether `key` has used up `max_attempts` in its current window.
    /// Read-only.
    async fn too_many_attempts(&self, key: &str, max_attempts: u32)
    -> Result<bool, RateLimitError>;

    /// Record one attempt and return the count in the current window.
    async fn hit(&self, key: &str, decay: Duration) -> Result<u32, RateLimitError>;

    /// Attempts recorded in the current window (0 once it has elapsed).
    async fn attempts(&self, key: &str) -> Result<u32, RateLimitError>;

    /// Drop the counter entirely.
    async fn clear(&self, key: &str) -> Result<(), RateLimitError>;

    /// Time until the current window closes (zero when there is none).
    async fn available_in(&self, key: &str) -> Result<Duration, RateLimitError>;
}

// ============================================================================
// In-memory limiter
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Counter {
    attempts: u32,
    expires_at_ms: i64,
}

impl Counter {
    fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }
}

/// In-process limiter for single-instance deployments.
///
/// Clones share the same counters. Expired entries are harmless but are
/// only reclaimed by [`MemoryRateLimiter::cleanup_expired`].
#[derive(Clone)]
pub struct MemoryRateLimiter<C = SystemClock> {
    counters: Arc<DashMap<String, Counter>>,
    clock: C,
}

impl MemoryRateLimiter<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryRateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryRateLimiter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Remove counters whose window has elapsed. Returns how many went.
    pub fn cleanup_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.counters.len();
        self.counters.retain(|_, counter| !counter.is_expired(now_ms));
        before.saturating_sub(self.counters.len())
    }

    /// Number of tracked keys, expired ones included
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    fn live_counter(&self, key: &str) -> Option<Counter> {
        let now_ms = self.clock.now_ms();
        self.counters
            .get(key)
            .map(|entry| *entry.value())
            .filter(|counter| !counter.is_expired(now_ms))
    }
}

impl<C: Clock> RateLimiter for MemoryRateLimiter<C> {
    async fn too_many_attempts(
        &self,
        key: &str,
        max_attempts: u32,
    ) -> Result<bool, RateLimitError> {
        let attempts = self.live_counter(key).map_or(0, |c| c.attempts);
        Ok(attempts >= max_attempts)
    }

    async fn hit(&self, key: &str, decay: Duration) -> Result<u32, RateLimitError> {
        let now_ms = self.clock.now_ms();

        // The entry guard holds the shard lock for the whole update.
        let mut counter = self.counters.entry(key.to_owned()).or_insert(Counter {
            attempts: 0,
            expires_at_ms: now_ms,
        });

        if counter.is_expired(now_ms) {
            counter.attempts = 0;
            counter.expires_at_ms = now_ms + decay.as_millis() as i64;
        }
        counter.attempts = counter.attempts.saturating_add(1);

        Ok(counter.attempts)
    }

    async fn attempts(&self, key: &str) -> Result<u32, RateLimitError> {
        Ok(self.live_counter(key).map_or(0, |c| c.attempts))
    }

    async fn clear(&self, key: &str) -> Result<(), RateLimitError> {
        self.counters.remove(key);
        Ok(())
    }

    async fn available_in(&self, key: &str) -> Result<Duration, RateLimitError> {
        let now_ms = self.clock.now_ms();
        let remaining_ms = self
            .live_counter(key)
            .map_or(0, |c| (c.expires_at_ms - now_ms).max(0));
        Ok(Duration::from_millis(remaining_ms as u64))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{MemoryRateLimiter, RateLimitConfig, RateLimiter};
    use crate::clock::ManualClock;

    const WINDOW: Duration = Duration::from_secs(60);

    fn limiter() -> (MemoryRateLimiter<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (MemoryRateLimiter::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_config() {
        let config = RateLimitConfig::new(5, 3600);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.decay, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_hit_counts_up_to_limit() {
        let (limiter, _) = limiter();

        for expected in 1..=5 {
            assert!(!limiter.too_many_attempts("login:a@b.co", 5).await.unwrap());
            assert_eq!(limiter.hit("login:a@b.co", WINDOW).await.unwrap(), expected);
        }
        assert!(limiter.too_many_attempts("login:a@b.co", 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_too_many_attempts_does_not_hit() {
        let (limiter, _) = limiter();
        limiter.hit("k", WINDOW).await.unwrap();

        for _ in 0..10 {
            limiter.too_many_attempts("k", 5).await.unwrap();
        }
        assert_eq!(limiter.attempts("k").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (limiter, _) = limiter();
        for _ in 0..5 {
            limiter.hit("registration:ip:10.0.0.1", WINDOW).await.unwrap();
        }

        assert!(limiter.too_many_attempts("registration:ip:10.0.0.1", 5).await.unwrap());
        assert!(!limiter.too_many_attempts("registration:ip:10.0.0.2", 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_window_is_fixed_from_first_hit() {
        let (limiter, clock) = limiter();

        limiter.hit("k", WINDOW).await.unwrap();
        clock.advance(Duration::from_secs(45));
        limiter.hit("k", WINDOW).await.unwrap();

        // Second hit must not extend the window
        assert_eq!(
            limiter.available_in("k").await.unwrap(),
            Duration::from_secs(15)
        );

        clock.advance(Duration::from_secs(15));
        assert_eq!(limiter.attempts("k").await.unwrap(), 0);
        assert_eq!(limiter.available_in("k").await.unwrap(), Duration::ZERO);

        // Next hit opens a fresh window
        assert_eq!(limiter.hit("k", WINDOW).await.unwrap(), 1);
        assert_eq!(limiter.available_in("k").await.unwrap(), WINDOW);
    }

    #[tokio::test]
    async fn test_clear_resets() {
        let (limiter, _) = limiter();
        for _ in 0..5 {
            limiter.hit("k", WINDOW).await.unwrap();
        }

        limiter.clear("k").await.unwrap();
        assert!(!limiter.too_many_attempts("k", 5).await.unwrap());
        assert_eq!(limiter.hit("k", WINDOW).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let (limiter, clock) = limiter();
        limiter.hit("short", Duration::from_secs(1)).await.unwrap();
        limiter.hit("long", Duration::from_secs(3600)).await.unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(limiter.cleanup_expired(), 1);
        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.attempts("long").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_hits_are_all_counted() {
        let limiter = MemoryRateLimiter::new();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.hit("shared", WINDOW).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(limiter.attempts("shared").await.unwrap(), 32);
    }
}
