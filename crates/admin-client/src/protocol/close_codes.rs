//! WebSocket close codes
//!
//! Standard RFC 6455 close codes as seen by the client. Servers may also send
//! application codes (4000-4999); those are carried as raw `u16` values.

use serde::{Deserialize, Serialize};

/// WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure
    Normal = 1000,
    /// Endpoint is going away (server shutdown, page navigation)
    GoingAway = 1001,
    /// Protocol error
    ProtocolError = 1002,
    /// Received a data type it cannot accept
    Unsupported = 1003,
    /// Close frame carried no status code
    NoStatus = 1005,
    /// Connection dropped without a close frame
    Abnormal = 1006,
    /// Payload was inconsistent with the message type
    InvalidPayload = 1007,
    /// Policy violation
    PolicyViolation = 1008,
    /// Message too big to process
    MessageTooBig = 1009,
    /// Server hit an unexpected condition
    InternalError = 1011,
    /// Server is restarting
    ServiceRestart = 1012,
    /// Server is overloaded, try again later
    TryAgainLater = 1013,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1002 => Some(Self::ProtocolError),
            1003 => Some(Self::Unsupported),
            1005 => Some(Self::NoStatus),
            1006 => Some(Self::Abnormal),
            1007 => Some(Self::InvalidPayload),
            1008 => Some(Self::PolicyViolation),
            1009 => Some(Self::MessageTooBig),
            1011 => Some(Self::InternalError),
            1012 => Some(Self::ServiceRestart),
            1013 => Some(Self::TryAgainLater),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether a raw close code marks a normal or intentional closure
    ///
    /// Only 1000 and 1001 count; every other code, including application
    /// codes, is treated as unexpected.
    #[must_use]
    pub const fn is_intentional(code: u16) -> bool {
        code == Self::Normal.as_u16() || code == Self::GoingAway.as_u16()
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::GoingAway => "Going away",
            Self::ProtocolError => "Protocol error",
            Self::Unsupported => "Unsupported data",
            Self::NoStatus => "No status received",
            Self::Abnormal => "Abnormal closure",
            Self::InvalidPayload => "Invalid payload data",
            Self::PolicyViolation => "Policy violation",
            Self::MessageTooBig => "Message too big",
            Self::InternalError => "Internal server error",
            Self::ServiceRestart => "Service restart",
            Self::TryAgainLater => "Try again later",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::GoingAway => "GoingAway",
            Self::ProtocolError => "ProtocolError",
            Self::Unsupported => "Unsupported",
            Self::NoStatus => "NoStatus",
            Self::Abnormal => "Abnormal",
            Self::InvalidPayload => "InvalidPayload",
            Self::PolicyViolation => "PolicyViolation",
            Self::MessageTooBig => "MessageTooBig",
            Self::InternalError => "InternalError",
            Self::ServiceRestart => "ServiceRestart",
            Self::TryAgainLater => "TryAgainLater",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(CloseCode::from_u16(1000), Some(CloseCode::Normal));
        assert_eq!(CloseCode::from_u16(1006), Some(CloseCode::Abnormal));
        assert_eq!(CloseCode::from_u16(1013), Some(CloseCode::TryAgainLater));
        assert_eq!(CloseCode::from_u16(1004), None); // reserved
        assert_eq!(CloseCode::from_u16(4004), None);
    }

    #[test]
    fn test_close_code_as_u16() {
        assert_eq!(CloseCode::Normal.as_u16(), 1000);
        assert_eq!(CloseCode::GoingAway.as_u16(), 1001);
        assert_eq!(u16::from(CloseCode::Abnormal), 1006);
    }

    #[test]
    fn test_is_intentional() {
        assert!(CloseCode::is_intentional(1000));
        assert!(CloseCode::is_intentional(1001));

        assert!(!CloseCode::is_intentional(1005));
        assert!(!CloseCode::is_intentional(1006));
        assert!(!CloseCode::is_intentional(1011));
        assert!(!CloseCode::is_intentional(4000));
    }

    #[test]
    fn test_close_code_display() {
        let display = format!("{}", CloseCode::Abnormal);
        assert!(display.contains("1006"));
        assert!(display.contains("Abnormal"));
    }
}
