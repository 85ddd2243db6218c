use std::collections::HashMap;
use tokio::time::{Duration, Instant};

/// Per-caller cooldown. Entries are never evicted, so the map grows with the
/// number of distinct callers seen over the process lifetime.
pub struct RateLimiter {
    cooldown: Duration,
    entries: HashMap<i64, Instant>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            entries: HashMap::new(),
        }
    }

    /// Admits when the caller is new or strictly more than the cooldown has
    /// passed since its last admitted call. Rejections leave the entry alone.
    pub fn is_allowed(&mut self, caller_id: i64, now: Instant) -> bool {
        if self.retry_after(caller_id, now).is_some() {
            return false;
        }
        self.entries.insert(caller_id, now);
        true
    }

    /// Time left before `caller_id` is admitted again, `None` if it would be
    /// admitted at `now`. Never records anything.
    pub fn retry_after(&self, caller_id: i64, now: Instant) -> Option<Duration> {
        let last = self.entries.get(&caller_id)?;
        let elapsed = now.saturating_duration_since(*last);

        if elapsed > self.cooldown {
            None
        } else {
            Some((self.cooldown - elapsed).max(Duration::from_millis(1)))
        }
    }

    pub fn tracked_callers(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_first_request_allowed() {
        tokio::time::pause();
        let mut limiter = RateLimiter::new(COOLDOWN);
        assert!(limiter.retry_after(123, Instant::now()).is_none());
        assert!(limiter.is_allowed(123, Instant::now()));
    }

    #[tokio::test]
    async fn test_second_request_within_cooldown_denied() {
        tokio::time::pause();
        let mut limiter = RateLimiter::new(COOLDOWN);
        limiter.is_allowed(123, Instant::now());
        assert!(!limiter.is_allowed(123, Instant::now()));
        assert!(limiter.retry_after(123, Instant::now()).is_some());
    }

    #[tokio::test]
    async fn test_request_after_cooldown_allowed() {
        tokio::time::pause();
        let mut limiter = RateLimiter::new(COOLDOWN);
        limiter.is_allowed(123, Instant::now());
        tokio::time::advance(Duration::from_millis(5001)).await;
        assert!(limiter.is_allowed(123, Instant::now()));
    }

    #[test]
    fn test_exactly_cooldown_still_denied() {
        let mut limiter = RateLimiter::new(COOLDOWN);
        let t1 = Instant::now();
        assert!(limiter.is_allowed(7, t1));
        assert!(!limiter.is_allowed(7, t1 + Duration::from_secs(1)));
        assert!(!limiter.is_allowed(7, t1 + COOLDOWN));
        assert!(limiter.is_allowed(7, t1 + COOLDOWN + Duration::from_millis(1)));
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let mut limiter = RateLimiter::new(COOLDOWN);
        let t1 = Instant::now();
        assert!(limiter.is_allowed(7, t1));
        assert!(!limiter.is_allowed(7, t1 + Duration::from_secs(4)));
        // Measured from t1, not from the rejected attempt
        assert!(limiter.is_allowed(7, t1 + Duration::from_secs(6)));
    }

    #[test]
    fn test_retry_after_does_not_record() {
        let mut limiter = RateLimiter::new(COOLDOWN);
        let t1 = Instant::now();
        assert!(limiter.retry_after(7, t1).is_none());
        assert_eq!(limiter.tracked_callers(), 0);
        assert!(limiter.is_allowed(7, t1));
    }

    #[tokio::test]
    async fn test_different_callers_independent() {
        tokio::time::pause();
        let mut limiter = RateLimiter::new(COOLDOWN);
        limiter.is_allowed(123, Instant::now());
        assert!(limiter.is_allowed(456, Instant::now()));
        assert_eq!(limiter.tracked_callers(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_decreases() {
        tokio::time::pause();
        let mut limiter = RateLimiter::new(COOLDOWN);
        limiter.is_allowed(123, Instant::now());

        tokio::time::advance(Duration::from_millis(2000)).await;
        let retry = limiter.retry_after(123, Instant::now()).unwrap();
        assert!(retry <= Duration::from_millis(3000));
        assert!(retry > Duration::from_millis(2000));
    }
}
