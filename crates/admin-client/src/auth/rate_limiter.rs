//! Credential attempt rate limiting
//!
//! Keyed by login email. A key may burst up to `max_attempts` and regains
//! one attempt every `window / max_attempts`. Token re-authentication is
//! not limited.

use admin_common::AuthConfig;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;

/// Attempts allowed per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: usize,
    pub window: Duration,
}

impl RateLimitPolicy {
    fn quota(self) -> Quota {
        let burst = u32::try_from(self.max_attempts)
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN);
        let period = (self.window / burst.get()).max(Duration::from_nanos(1));

        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(60),
        }
    }
}

impl From<&AuthConfig> for RateLimitPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            max_attempts: config.rate_limit_attempts,
            window: Duration::from_millis(config.rate_limit_window_ms),
        }
    }
}

/// Keyed limiter over `governor`
pub struct RateLimiter {
    policy: RateLimitPolicy,
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl RateLimiter {
    #[must_use]
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            limiter: governor::RateLimiter::keyed(policy.quota()),
            clock: DefaultClock::default(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Record an attempt for `key`
    ///
    /// Returns how long to wait when the key is over its limit; the rejected
    /// attempt is not counted.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        let result = self
            .limiter
            .check_key(&key.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()));

        // Keys whose quota has fully replenished carry no state
        self.limiter.retain_recent();

        result
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .field("keys", &self.limiter.len())
            .finish()
    }
}
