use chrono::Duration;
use gatehouse_core::clock::SharedClock;
use gatehouse_core::config::CaptchaConfig;

use crate::auth::cache::ExpiringCache;

/// ## Summary
/// Counts failed sign-in attempts per client and decides when a captcha is required.
///
/// A threshold of `0` always requires one. Counters expire `window` after the
/// first failure.
#[derive(Debug)]
pub struct BruteForceGuard {
    failures: ExpiringCache<String, u32>,
    threshold: u32,
    window: Duration,
}

impl BruteForceGuard {
    #[must_use]
    pub fn new(threshold: u32, window: Duration, clock: SharedClock) -> Self {
        Self {
            failures: ExpiringCache::new(clock),
            threshold,
            window,
        }
    }

    #[must_use]
    pub fn from_config(config: &CaptchaConfig, clock: SharedClock) -> Self {
        Self::new(
            config.open_captcha,
            Duration::seconds(config.open_captcha_timeout),
            clock,
        )
    }

    #[must_use]
    pub fn failures(&self, key: &str) -> u32 {
        self.failures.get(key).unwrap_or(0)
    }

    #[must_use]
    pub fn should_require_secondary(&self, key: &str) -> bool {
        self.threshold == 0 || self.failures(key) >= self.threshold
    }

    /// Records one failed attempt and returns the running count.
    pub fn record_failure(&self, key: &str) -> u32 {
        let count = self.failures.increment(key.to_owned(), self.window);
        tracing::debug!(client = key, count, "Recorded failed sign-in attempt");
        count
    }

    /// Drops counters whose window has closed and returns how many went.
    pub fn purge_expired(&self) -> usize {
        self.failures.purge_expired()
    }

    /// Number of clients with a stored counter, including lapsed ones.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.failures.len()
    }
}
