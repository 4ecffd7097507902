//! Caller-facing client
//!
//! [`AdminClient`] ties the connection manager, outbound queue, dispatcher
//! and auth tracker together. It is cheap to clone; every clone shares the
//! same connection.

use crate::auth::{AuthTracker, RateLimiter, TokenStore};
use crate::connection::{ConnectionEvent, ConnectionManager, ConnectionState};
use crate::dispatch::{Dispatcher, Subscription};
use crate::error::{ClientError, ClientResult};
use crate::options::ClientOptions;
use crate::protocol::{message_types, OutboundFrame, OutboundMessage};
use crate::requests::{AuditEntry, Request};
use crate::transport::{Connector, WsConnector};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

struct ClientInner {
    connection: Arc<ConnectionManager>,
    dispatcher: Arc<Dispatcher>,
    auth: Arc<AuthTracker>,
    rate_limiter: RateLimiter,
}

/// Reconnecting multiplexed client for the admin gateway
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<ClientInner>,
}

impl AdminClient {
    /// Build a client over any connector
    ///
    /// Nothing is opened until [`connect`](Self::connect).
    #[must_use]
    pub fn new(
        options: ClientOptions,
        connector: Arc<dyn Connector>,
        token_store: Arc<dyn TokenStore>,
    ) -> Self {
        let auth = Arc::new(AuthTracker::new(token_store));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&auth)));
        let connection = ConnectionManager::new(
            options.url,
            options.reconnect,
            connector,
            Arc::clone(&dispatcher),
            Arc::clone(&auth),
        );

        Self {
            inner: Arc::new(ClientInner {
                connection,
                dispatcher,
                auth,
                rate_limiter: RateLimiter::new(options.auth_rate_limit),
            }),
        }
    }

    /// Build a client that connects over WebSocket
    #[must_use]
    pub fn websocket(options: ClientOptions, token_store: Arc<dyn TokenStore>) -> Self {
        Self::new(options, Arc::new(WsConnector), token_store)
    }

    // === Connection ===

    /// Open the connection, replacing any current one
    ///
    /// Queued messages are flushed in submission order once it opens.
    ///
    /// # Errors
    /// Returns [`ClientError::Connect`] if the endpoint cannot be reached,
    /// or [`ClientError::Superseded`] if another `connect`/`disconnect`
    /// overtook this one. A failure here is not retried automatically.
    pub async fn connect(&self) -> ClientResult<()> {
        self.inner.connection.connect().await
    }

    /// Close with a normal closure; no automatic reconnect follows
    pub fn disconnect(&self) {
        self.inner.connection.disconnect();
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connection.is_connected()
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.inner.connection.url()
    }

    /// Messages queued while the connection is not open
    #[must_use]
    pub fn pending_messages(&self) -> usize {
        self.inner.connection.pending()
    }

    /// Register a connection status observer
    pub fn on_connection<F>(&self, observer: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.inner.connection.on_connection(Arc::new(observer));
    }

    /// Subscribe to lifecycle events
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.inner.connection.events()
    }

    // === Outbound ===

    /// Send a message now, or queue it until the connection opens
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidMessage`] if `message` does not
    /// serialize to a JSON object with a string `type`.
    pub fn send<M>(&self, message: &M) -> ClientResult<()>
    where
        M: Serialize + ?Sized,
    {
        let frame = OutboundFrame::encode(message)?;
        self.inner.connection.send_frame(frame);
        Ok(())
    }

    /// Send a typed dashboard request
    ///
    /// # Errors
    /// See [`send`](Self::send).
    pub fn request(&self, request: Request) -> ClientResult<()> {
        self.send(&request.into_message())
    }

    /// Subscribe to a server push channel
    ///
    /// # Errors
    /// See [`send`](Self::send).
    pub fn subscribe(&self, channel: &str) -> ClientResult<()> {
        self.send(&OutboundMessage::subscribe(channel))
    }

    /// Record an admin action on the server audit log
    ///
    /// # Errors
    /// See [`send`](Self::send).
    pub fn log_audit_event(
        &self,
        action: &str,
        resource: &str,
        user_id: &str,
        details: Option<Value>,
    ) -> ClientResult<()> {
        let mut entry = AuditEntry::new(action, resource, user_id);
        entry.details = details;
        tracing::debug!(action, resource, user_id, "Audit event");
        self.request(Request::AuditLog(entry))
    }

    // === Inbound ===

    /// Register the only handler for `kind`, replacing existing ones
    pub fn on_message<F>(&self, kind: &str, handler: F) -> Subscription
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.inner.dispatcher.registry().set(kind, Arc::new(handler))
    }

    /// Add a handler for `kind` alongside existing ones
    pub fn add_handler<F>(&self, kind: &str, handler: F) -> Subscription
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.inner.dispatcher.registry().add(kind, Arc::new(handler))
    }

    /// Add a wildcard handler; it receives every message including `type`
    pub fn on_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.add_handler(message_types::WILDCARD, handler)
    }

    // === Authentication ===

    /// Authenticate with credentials
    ///
    /// # Errors
    /// Returns [`ClientError::RateLimited`] after too many attempts for the
    /// same email inside the configured window.
    pub fn authenticate(&self, email: &str, password: &str) -> ClientResult<()> {
        let key = email.trim().to_lowercase();
        if let Err(retry_after) = self.inner.rate_limiter.check(&key) {
            tracing::warn!(
                retry_after_secs = retry_after.as_secs(),
                "Authentication rate limit reached"
            );
            return Err(ClientError::RateLimited { retry_after });
        }

        self.send(&OutboundMessage::authenticate(email, password))
    }

    /// Authenticate with a previously issued token
    ///
    /// # Errors
    /// See [`send`](Self::send).
    pub fn authenticate_with_token(&self, token: &str) -> ClientResult<()> {
        self.send(&OutboundMessage::authenticate_with_token(token))
    }

    /// Whether the server has accepted authentication on this connection
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.auth.is_authenticated()
    }

    /// Token persisted from the last `auth_success`
    #[must_use]
    pub fn cached_token(&self) -> Option<String> {
        self.inner.auth.cached_token()
    }

    /// Forget the persisted token
    pub fn logout(&self) {
        self.inner.auth.clear_token();
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("url", &self.url())
            .field("state", &self.state())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
