//! # admin-client
//!
//! Reconnecting multiplexed message client for the delivery admin gateway.
//!
//! One logical connection carries every dashboard request and push update.
//! Messages sent while the connection is down are queued and flushed in
//! order; inbound messages are routed to handlers by their `type`.

pub mod auth;
pub mod client;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod protocol;
pub mod queue;
pub mod requests;
pub mod session;
pub mod transport;

pub use auth::{FileTokenStore, MemoryTokenStore, RateLimitPolicy, TokenStore, TokenStoreError};
pub use client::AdminClient;
pub use connection::{ConnectionEvent, ConnectionState, ReconnectPolicy};
pub use dispatch::Subscription;
pub use error::{ClientError, ClientResult, TransportError};
pub use options::ClientOptions;
pub use protocol::{message_types, CloseCode, InboundMessage, OutboundMessage, ServerError};
pub use requests::{AuditEntry, Filters, Request};
pub use session::Session;
