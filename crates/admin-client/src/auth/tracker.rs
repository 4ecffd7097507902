//! Authentication state tracking
//!
//! Watches inbound traffic for `auth_success` and authentication errors and
//! keeps the session token in a [`TokenStore`].

use super::token_store::TokenStore;
use crate::protocol::{message_types, InboundMessage, ServerError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Storage key for the session token
pub const TOKEN_KEY: &str = "admin_token";

/// Tracks whether the current connection is authenticated
pub struct AuthTracker {
    authenticated: AtomicBool,
    store: Arc<dyn TokenStore>,
}

impl AuthTracker {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            authenticated: AtomicBool::new(false),
            store,
        }
    }

    /// Inspect an inbound message before handlers see it
    pub fn observe(&self, message: &InboundMessage) {
        match message.kind() {
            message_types::AUTH_SUCCESS => {
                self.authenticated.store(true, Ordering::SeqCst);

                match extract_token(message.payload()) {
                    Some(token) => {
                        if let Err(e) = self.store.store(TOKEN_KEY, token) {
                            tracing::warn!(error = %e, "Failed to persist session token");
                        }
                    }
                    None => tracing::debug!("auth_success without a token"),
                }

                tracing::info!("Authenticated");
            }
            message_types::ERROR => {
                let error = ServerError::from_payload(message.payload());
                if error.is_authentication() {
                    self.authenticated.store(false, Ordering::SeqCst);
                    tracing::warn!(message = %error.message, "Authentication rejected");
                }
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Forget authentication; called whenever the connection closes
    pub fn reset(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    /// The persisted token, if any
    #[must_use]
    pub fn cached_token(&self) -> Option<String> {
        match self.store.load(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// Delete the persisted token and mark unauthenticated
    pub fn clear_token(&self) {
        self.reset();
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove session token");
        }
    }
}

impl std::fmt::Debug for AuthTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTracker")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Token from `auth_success`: top-level `token`, else `user.token`
fn extract_token(payload: &Value) -> Option<&str> {
    payload
        .get("token")
        .and_then(Value::as_str)
        .or_else(|| payload.pointer("/user/token").and_then(Value::as_str))
        .filter(|token| !token.is_empty())
}
