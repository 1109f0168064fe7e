use crate::error::{PlanError, Result};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default requests admitted per window.
pub const DEFAULT_REQUESTS_PER_MINUTE: usize = 15;

/// Admits at most `max_requests` calls in any rolling `window`.
///
/// The limiter never waits. A rejected call gets
/// [`PlanError::RateLimited`] with the time until the oldest admitted call
/// leaves the window.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            admitted: VecDeque::with_capacity(max_requests),
        }
    }

    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn try_acquire(&mut self) -> Result<()> {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&mut self, now: Instant) -> Result<()> {
        while let Some(oldest) = self.admitted.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }

        if self.admitted.len() < self.max_requests {
            self.admitted.push_back(now);
            return Ok(());
        }

        let retry_after = self
            .admitted
            .front()
            .map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
            .unwrap_or(self.window);
        Err(PlanError::RateLimited { retry_after })
    }

    /// Calls still available in the current window.
    pub fn remaining_at(&self, now: Instant) -> usize {
        let live = self
            .admitted
            .iter()
            .filter(|t| now.saturating_duration_since(**t) < self.window)
            .count();
        self.max_requests.saturating_sub(live)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_beyond_limit() {
        let mut limiter = RateLimiter::per_minute(2);
        let start = Instant::now();

        assert!(limiter.try_acquire_at(start).is_ok());
        assert!(limiter.try_acquire_at(start + Duration::from_secs(10)).is_ok());

        let err = limiter
            .try_acquire_at(start + Duration::from_secs(20))
            .unwrap_err();
        match err {
            PlanError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_window_rolls() {
        let mut limiter = RateLimiter::per_minute(2);
        let start = Instant::now();

        limiter.try_acquire_at(start).unwrap();
        limiter
            .try_acquire_at(start + Duration::from_secs(30))
            .unwrap();
        assert!(
            limiter
                .try_acquire_at(start + Duration::from_secs(59))
                .is_err()
        );

        // The first call has left the window, the second has not.
        assert_eq!(limiter.remaining_at(start + Duration::from_secs(60)), 1);
        assert!(
            limiter
                .try_acquire_at(start + Duration::from_secs(60))
                .is_ok()
        );
        assert!(
            limiter
                .try_acquire_at(start + Duration::from_secs(61))
                .is_err()
        );
    }

    #[test]
    fn test_rejected_calls_do_not_count() {
        let mut limiter = RateLimiter::per_minute(1);
        let start = Instant::now();

        limiter.try_acquire_at(start).unwrap();
        for secs in 1..10 {
            assert!(
                limiter
                    .try_acquire_at(start + Duration::from_secs(secs))
                    .is_err()
            );
        }
        assert!(
            limiter
                .try_acquire_at(start + Duration::from_secs(60))
                .is_ok()
        );
    }

    #[test]
    fn test_default_limit() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.remaining_at(Instant::now()), DEFAULT_REQUESTS_PER_MINUTE);
    }
}
