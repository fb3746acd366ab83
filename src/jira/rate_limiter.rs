//! Fixed-interval dispatcher gating how often new requests may start.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Maximum number of fetches started per second against the remote service.
pub const FETCHES_PER_SECOND: u32 = 3;

/// Async rate limiter enforcing a minimum interval between initiations.
///
/// Only the start of an operation is gated: once `hit` returns the caller
/// proceeds independently, so any number of operations may be in flight.
/// Waiters are served in arrival order (tokio's mutex is fair).
#[derive(Clone, Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_start: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter that enforces `interval` between starts.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a limiter allowing at most `starts` initiations per second.
    pub fn per_second(starts: u32) -> Self {
        Self::new(Duration::from_secs(1) / starts.max(1))
    }

    /// Waits for the next free slot, then records it as taken.
    pub async fn hit(&self) {
        let mut guard = self.last_start.lock().await;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        *guard = Some(Instant::now());
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(FETCHES_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_second_interval() {
        let limiter = RateLimiter::per_second(3);
        assert_eq!(limiter.interval(), Duration::from_nanos(333_333_333));
        assert_eq!(RateLimiter::default().interval(), limiter.interval());
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        assert_eq!(RateLimiter::per_second(0).interval(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_first_hit_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        limiter.hit().await;
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_second_hit_waits_for_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(40));

        limiter.hit().await;
        let start = Instant::now();
        limiter.hit().await;

        assert!(start.elapsed() >= Duration::from_millis(35));
    }

    #[tokio::test]
    async fn test_clones_share_the_schedule() {
        let limiter = RateLimiter::new(Duration::from_millis(40));
        let other = limiter.clone();

        limiter.hit().await;
        let start = Instant::now();
        other.hit().await;

        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
