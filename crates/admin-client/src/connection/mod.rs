//! Connection lifecycle
//!
//! One logical connection to the gateway, reopened automatically after
//! unintentional closures.

mod manager;
mod policy;
mod state;
mod task;

pub use manager::{ConnectionManager, ConnectionObserver};
pub use policy::ReconnectPolicy;
pub use state::{ConnectionEvent, ConnectionState};
pub use task::Command;
