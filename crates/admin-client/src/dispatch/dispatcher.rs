//! Inbound dispatcher
//!
//! Parses each inbound frame, lets the auth tracker look at it, then runs
//! the handlers registered for its type followed by the wildcard handlers.

use super::registry::{Handler, HandlerRegistry};
use crate::auth::AuthTracker;
use crate::protocol::{message_types, InboundMessage};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Routes inbound frames to registered handlers
#[derive(Debug)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    auth: Arc<AuthTracker>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(auth: Arc<AuthTracker>) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            auth,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatch one text frame
    ///
    /// Malformed frames are logged and dropped. A panicking handler is
    /// logged and does not stop the remaining handlers. Returns the number
    /// of handlers invoked.
    pub fn dispatch(&self, text: &str) -> usize {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, len = text.len(), "Dropping malformed inbound frame");
                return 0;
            }
        };

        self.auth.observe(&message);

        let mut invoked = 0;

        if message.kind() != message_types::WILDCARD {
            for handler in self.registry.handlers_for(message.kind()) {
                invoke(&handler, message.kind(), message.payload().clone());
                invoked += 1;
            }
        }

        for handler in self.registry.handlers_for(message_types::WILDCARD) {
            invoke(&handler, message.kind(), message.raw().clone());
            invoked += 1;
        }

        if invoked == 0 {
            tracing::trace!(kind = %message.kind(), "No handler for inbound message");
        }

        invoked
    }
}

fn invoke(handler: &Handler, kind: &str, value: Value) {
    if catch_unwind(AssertUnwindSafe(|| handler(value))).is_err() {
        tracing::error!(kind = %kind, "Message handler panicked");
    }
}
