//! Time source abstraction
//!
//! Rate limit windows are computed from a [`Clock`] so tests can move
//! time forward without sleeping.

/// Millisecond wall-clock source
pub trait Clock: Send + Sync {
    /// Current Unix time in milliseconds
    fn now_ms(&self) -> i64;
}

/// Real time via `chrono::Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    use super::Clock;

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        now_ms: Arc<AtomicI64>,
    }

    impl ManualClock {
        pub fn new(start_ms: i64) -> Self {
            Self {
                now_ms: Arc::new(AtomicI64::new(start_ms)),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now_ms
                .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
        }

        pub fn set(&self, now_ms: i64) {
            self.now_ms.store(now_ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }
}
