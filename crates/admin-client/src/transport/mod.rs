//! Physical duplex transport
//!
//! The connection manager only talks to these traits. Production code uses
//! [`WsConnector`]; tests substitute an in-memory implementation.

mod websocket;

#[cfg(test)]
pub(crate) mod mock;

pub use websocket::{WsConnector, WsTransport};

use crate::error::TransportError;
use crate::protocol::CloseCode;
use async_trait::async_trait;

/// Close frame sent or received on the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: u16,
    pub reason: String,
}

impl CloseFrame {
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Normal closure (1000); suppresses auto-reconnect
    #[must_use]
    pub fn normal(reason: impl Into<String>) -> Self {
        Self::new(CloseCode::Normal.as_u16(), reason)
    }
}

/// Something received from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame
    Text(String),
    /// The peer closed the connection; `None` when no status was given
    Closed(Option<CloseFrame>),
}

/// An open duplex text-frame connection
#[async_trait]
pub trait Transport: Send {
    /// Write one text frame
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Wait for the next text frame or closure
    ///
    /// Must be cancel-safe: it is polled inside `tokio::select!`.
    async fn recv(&mut self) -> Result<TransportEvent, TransportError>;

    /// Close the connection with the given frame
    async fn close(&mut self, frame: CloseFrame) -> Result<(), TransportError>;
}

/// Opens transports to an endpoint
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, TransportError>;
}
