//! Session restoration after reconnects
//!
//! The connection manager knows nothing about tokens. A [`Session`] listens
//! for [`ConnectionEvent::Reconnected`] and re-authenticates with the cached
//! token, after any queued messages have been flushed.

use crate::client::AdminClient;
use crate::connection::ConnectionEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Re-authenticates a client after every automatic reconnect
///
/// Dropping the session stops it.
#[derive(Debug)]
pub struct Session {
    task: JoinHandle<()>,
}

impl Session {
    /// Start restoring sessions for `client`
    #[must_use]
    pub fn attach(client: &AdminClient) -> Self {
        let mut events = client.events();
        let client = client.clone();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ConnectionEvent::Reconnected { attempt }) => restore(&client, attempt),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session missed connection events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { task }
    }

    /// Stop restoring sessions
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn restore(client: &AdminClient, attempt: u32) {
    let Some(token) = client.cached_token() else {
        tracing::debug!(attempt, "No cached token, session not restored");
        return;
    };

    tracing::info!(attempt, "Restoring session with cached token");
    if let Err(e) = client.authenticate_with_token(&token) {
        tracing::warn!(error = %e, "Failed to restore session");
    }
}
