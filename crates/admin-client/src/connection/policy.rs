//! Reconnect policy

use admin_common::ClientConfig;
use std::time::Duration;

/// Fixed-delay reconnect with an attempt ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum automatic attempts between successful connections
    pub max_attempts: u32,
    /// Delay before each attempt
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(3000),
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Never reconnect automatically
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Whether another attempt may be scheduled after `attempts` so far
    #[must_use]
    pub const fn allows(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

impl From<&ClientConfig> for ReconnectPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self::new(
            config.reconnect_max_attempts,
            Duration::from_millis(config.reconnect_delay_ms),
        )
    }
}
