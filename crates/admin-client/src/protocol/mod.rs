//! Gateway protocol definitions
//!
//! Defines the JSON message formats, reserved message types, and close codes.

mod close_codes;
mod messages;
pub mod message_types;

pub use close_codes::CloseCode;
pub use messages::{FrameError, InboundMessage, OutboundFrame, OutboundMessage, ServerError};
