//! Authentication state, token storage and credential rate limiting

mod rate_limiter;
mod token_store;
mod tracker;

pub use rate_limiter::{RateLimitPolicy, RateLimiter};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use tracker::{AuthTracker, TOKEN_KEY};
