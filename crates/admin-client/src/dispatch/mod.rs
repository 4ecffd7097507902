//! Inbound message dispatch

mod dispatcher;
mod registry;

pub use dispatcher::Dispatcher;
pub use registry::{Handler, HandlerRegistry, Subscription};
