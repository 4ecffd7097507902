//! Client error types

use crate::protocol::FrameError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of [`AdminClient`](crate::AdminClient)
#[derive(Debug, Error)]
pub enum ClientError {
    /// The physical connection could not be established
    #[error("Failed to connect: {0}")]
    Connect(#[source] TransportError),

    /// A newer `connect` or a `disconnect` replaced this attempt
    #[error("Connection attempt superseded")]
    Superseded,

    /// The message could not be encoded as a frame
    #[error("Invalid outbound message: {0}")]
    InvalidMessage(#[from] FrameError),

    /// Too many credential attempts inside the rate-limit window
    #[error("Too many authentication attempts, retry in {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },
}

/// Errors from the physical duplex transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Client result type
pub type ClientResult<T> = Result<T, ClientError>;
