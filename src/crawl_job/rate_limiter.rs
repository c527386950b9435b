//! Strict min-interval rate limiter for one crawl job.
//!
//! Grounded in `original_source/utils/crawler_job.py::_rate_limit` exactly:
//! `request_interval = 1.0 / hit_rate`; each call measures time elapsed
//! since the last *attempted* request and sleeps the remainder if that
//! elapsed time is under the interval. No burst allowance — unlike the
//! teacher's `crawl_engine::rate_limiter::DomainRateLimiter` token bucket,
//! spec.md §4.4 is explicit that "the interval between any two attempted
//! fetches is at least `1/hit_rate` seconds," which a bucket with capacity
//! > 1 would violate for the first few requests after startup.
//!
//! **Deviation from the teacher**: the teacher packs its bucket state into
//! a lock-free `AtomicU128` (nightly-only `#[feature(integer_atomics)]`).
//! Not available on stable, so this uses a `parking_lot::Mutex<Option<
//! Instant>>` instead — same interval math, stable-compiling.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Enforces at least `1 / hit_rate` seconds between any two attempted
/// fetches for one job.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    interval: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(hit_rate: f64) -> Self {
        Self {
            last_request: Mutex::new(None),
            interval: Duration::from_secs_f64(1.0 / hit_rate),
        }
    }

    /// Blocks (async-sleeps) until at least one interval has elapsed since
    /// the previous call, then records this attempt's timestamp. The first
    /// call never waits, matching `last_request_time = 0` at construction
    /// in the original.
    pub async fn acquire(&self) {
        let wait = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let wait = last
                .map(|previous| self.interval.saturating_sub(now.duration_since(previous)))
                .unwrap_or(Duration::ZERO);
            *last = Some(now);
            wait
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
            *self.last_request.lock() = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_acquire_never_waits() {
        let limiter = RateLimiter::new(0.1);
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn consecutive_acquires_are_spaced_by_the_interval() {
        let limiter = RateLimiter::new(20.0); // 50ms interval
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[tokio::test]
    async fn does_not_allow_a_burst_above_the_rate() {
        let limiter = RateLimiter::new(100.0); // 10ms interval
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        // Strict interval enforcement: 5 acquires span at least 4 intervals.
        assert!(start.elapsed() >= Duration::from_millis(36));
    }
}
