//! Client-side rate limiting for catalog requests.
//!
//! Jikan enforces both a per-second and a per-minute budget; requests are
//! held back locally until both allow another call.

use shared::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const MINUTE: Duration = Duration::from_secs(60);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests
    min_interval: Duration,
    /// Maximum requests per minute
    max_per_minute: usize,
    /// Request timestamps in the last minute, oldest first
    recent_requests: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            min_interval,
            max_per_minute: max_per_minute.max(1) as usize,
            recent_requests: VecDeque::with_capacity(max_per_minute as usize),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.requests_per_minute)
    }

    /// Forget requests that left the one-minute window before `now`
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent_requests.front() {
            if now.duration_since(oldest) >= MINUTE {
                self.recent_requests.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long a request issued at `now` has to wait, if at all
    fn delay_at(&mut self, now: Instant) -> Option<Duration> {
        self.prune(now);

        let per_minute = if self.recent_requests.len() >= self.max_per_minute {
            self.recent_requests
                .front()
                .map(|&oldest| MINUTE.saturating_sub(now.duration_since(oldest)))
        } else {
            None
        };

        let per_second = self
            .recent_requests
            .back()
            .map(|&last| self.min_interval.saturating_sub(now.duration_since(last)))
            .filter(|wait| !wait.is_zero());

        per_minute.into_iter().chain(per_second).max()
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn acquire(&mut self) {
        while let Some(wait) = self.delay_at(Instant::now()) {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit: waiting");
            sleep(wait).await;
        }

        self.recent_requests.push_back(Instant::now());
    }

    /// Number of requests issued in the last minute
    pub fn current_minute_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.recent_requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_per_second() {
        let mut limiter = RateLimiter::new(2.0, 50);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }

        // Three requests at 2/s need two full intervals
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_per_minute() {
        let mut limiter = RateLimiter::new(100.0, 3);

        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire().await;
        }

        // The fourth request waits for the first one to leave the window
        assert!(start.elapsed() >= MINUTE);
        assert_eq!(limiter.current_minute_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let mut limiter = RateLimiter::new(3.0, 60);

        let start = Instant::now();
        limiter.acquire().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.current_minute_count(), 1);
    }

    #[test]
    fn test_current_minute_count() {
        let mut limiter = RateLimiter::new(2.0, 50);
        assert_eq!(limiter.current_minute_count(), 0);
    }
}
