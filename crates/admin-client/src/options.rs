//! Client construction options

use crate::auth::RateLimitPolicy;
use crate::connection::ReconnectPolicy;
use admin_common::AppConfig;

/// Options for building an [`AdminClient`](crate::AdminClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Gateway endpoint (`ws://` or `wss://`)
    pub url: String,
    pub reconnect: ReconnectPolicy,
    /// Limit on credential-based `authenticate` calls
    pub auth_rate_limit: RateLimitPolicy,
}

impl ClientOptions {
    /// Options with default reconnect and rate-limit policies
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ReconnectPolicy::default(),
            auth_rate_limit: RateLimitPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    #[must_use]
    pub fn with_auth_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.auth_rate_limit = policy;
        self
    }
}

impl From<&AppConfig> for ClientOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            url: config.client.url.clone(),
            reconnect: ReconnectPolicy::from(&config.client),
            auth_rate_limit: RateLimitPolicy::from(&config.auth),
        }
    }
}
