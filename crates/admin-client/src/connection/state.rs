//! Connection lifecycle state and events

use std::fmt;
use std::time::Duration;

/// Lifecycle state of the single logical connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Closed,
    Connecting,
    Open,
}

impl ConnectionState {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle events broadcast by the connection manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A connection was established
    Connected,

    /// The live connection closed
    Disconnected { code: u16 },

    /// A reconnect attempt was scheduled after `delay`
    ReconnectScheduled { attempt: u32, delay: Duration },

    /// A scheduled reconnect attempt succeeded
    Reconnected { attempt: u32 },

    /// A scheduled reconnect attempt failed to connect
    ReconnectFailed { attempt: u32 },

    /// The attempt ceiling was reached; no further automatic attempts
    ReconnectExhausted,
}
