//! Handler registry
//!
//! Maps message type strings to handlers. A type may have several handlers;
//! each registration returns a [`Subscription`] that removes exactly that
//! handler.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Message handler; receives the payload (or the full message for wildcard handlers)
pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

type Entries = DashMap<String, Vec<(u64, Handler)>>;

/// Registered handlers by message type
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Arc<Entries>,
    next_id: AtomicU64,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every handler for `kind` with `handler`
    pub fn set(&self, kind: &str, handler: Handler) -> Subscription {
        let id = self.next_id();
        self.entries.insert(kind.to_string(), vec![(id, handler)]);
        self.subscription(kind, id)
    }

    /// Add `handler` alongside any existing handlers for `kind`
    pub fn add(&self, kind: &str, handler: Handler) -> Subscription {
        let id = self.next_id();
        self.entries
            .entry(kind.to_string())
            .or_default()
            .push((id, handler));
        self.subscription(kind, id)
    }

    /// Remove every handler for `kind`
    pub fn remove(&self, kind: &str) -> usize {
        self.entries
            .remove(kind)
            .map_or(0, |(_, handlers)| handlers.len())
    }

    /// Snapshot of the handlers for `kind`, in registration order
    ///
    /// Handlers are cloned out so none run while the map is locked.
    #[must_use]
    pub fn handlers_for(&self, kind: &str) -> Vec<Handler> {
        self.entries
            .get(kind)
            .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn handler_count(&self, kind: &str) -> usize {
        self.entries.get(kind).map_or(0, |handlers| handlers.len())
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn subscription(&self, kind: &str, id: u64) -> Subscription {
        Subscription {
            entries: Arc::downgrade(&self.entries),
            kind: kind.to_string(),
            id,
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.entries.len())
            .finish()
    }
}

/// Handle to one registered handler
///
/// Dropping the handle keeps the handler registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Debug)]
#[must_use = "dropping a Subscription keeps the handler registered"]
pub struct Subscription {
    entries: Weak<Entries>,
    kind: String,
    id: u64,
}

impl Subscription {
    /// Message type this handler was registered for
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Remove the handler; returns `false` if it was already gone
    pub fn unsubscribe(self) -> bool {
        let Some(entries) = self.entries.upgrade() else {
            return false;
        };

        let mut removed = false;
        if let Some(mut handlers) = entries.get_mut(&self.kind) {
            let before = handlers.len();
            handlers.retain(|(id, _)| *id != self.id);
            removed = handlers.len() != before;
        }
        entries.remove_if(&self.kind, |_, handlers| handlers.is_empty());

        removed
    }
}
