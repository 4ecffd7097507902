//! Integration test utilities for the admin client
//!
//! Runs an in-process WebSocket gateway that speaks the admin protocol, so
//! tests can drive a real `AdminClient` over `tokio-tungstenite`.

pub mod helpers;

pub use helpers::*;
