use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Counts failures per key inside a fixed window and blocks once the limit is hit.
pub struct FailureLimiter {
    /// key -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl FailureLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// Per-email login brute force limiter. 5 failures per 15 minutes.
    pub fn login() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// Per-client guard on reset codes. 10 wrong codes per 15 minutes.
    pub fn reset_confirm() -> Self {
        Self::new(10, Duration::from_secs(15 * 60))
    }

    /// Does not count the attempt; call `record_failure()` when it fails.
    /// Returns the seconds until the window resets when blocked.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&key.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = entry.value();

        if now.duration_since(*start) > self.window {
            return Ok(());
        }

        if *count >= self.max_failures {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, key: &str) {
        let now = Instant::now();

        let mut entry = self.entries.entry(key.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    pub fn clear(&self, key: &str) {
        self.entries.remove(&key.to_lowercase());
    }

    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < self.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_blocks_after_five_failures() {
        let limiter = FailureLimiter::login();
        for _ in 0..5 {
            assert!(limiter.check("a@example.com").is_ok());
            limiter.record_failure("a@example.com");
        }
        let retry = limiter.check("A@Example.com").unwrap_err();
        assert!(retry > 0 && retry <= 15 * 60);
        assert!(limiter.check("b@example.com").is_ok());
    }

    #[test]
    fn reset_confirm_allows_ten_wrong_codes() {
        let limiter = FailureLimiter::reset_confirm();
        for _ in 0..9 {
            limiter.record_failure("127.0.0.1");
        }
        assert!(limiter.check("127.0.0.1").is_ok());
        limiter.record_failure("127.0.0.1");
        assert!(limiter.check("127.0.0.1").is_err());
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn clear_resets_the_counter() {
        let limiter = FailureLimiter::login();
        for _ in 0..5 {
            limiter.record_failure("a@example.com");
        }
        limiter.clear("a@example.com");
        assert!(limiter.check("a@example.com").is_ok());
    }

    #[test]
    fn window_expiry_reopens_the_key() {
        let limiter = FailureLimiter::new(1, Duration::ZERO);
        limiter.record_failure("k");
        std::thread::sleep(Duration::from_millis(5));
        assert!(limiter.check("k").is_ok());
        limiter.cleanup();
        assert!(limiter.entries.is_empty());
    }
}
