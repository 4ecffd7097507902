//! Connection manager
//!
//! Owns the single logical connection: opening it, replacing it, closing it,
//! and reconnecting after unintentional closures. At most one physical
//! connection is live at a time. Each one gets a generation number; events
//! from a connection whose generation is no longer current are ignored.

use super::policy::ReconnectPolicy;
use super::state::{ConnectionEvent, ConnectionState};
use super::task::{run_connection, Command, ConnectionExit};
use crate::auth::AuthTracker;
use crate::dispatch::Dispatcher;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{CloseCode, OutboundFrame};
use crate::queue::OutboundQueue;
use crate::transport::{CloseFrame, Connector};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Connection status observer; `true` on open, `false` on close
pub type ConnectionObserver = Arc<dyn Fn(bool) + Send + Sync>;

struct ReconnectTimer {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    generation: u64,
    writer: Option<mpsc::UnboundedSender<Command>>,
    queue: OutboundQueue,
    attempts: u32,
    reconnect_timer: Option<ReconnectTimer>,
    timer_seq: u64,
}

enum CloseOutcome {
    Intentional,
    Scheduled { attempt: u32, delay: Duration },
    Exhausted,
}

/// Manages the single logical connection to the gateway
pub struct ConnectionManager {
    url: String,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    dispatcher: Arc<Dispatcher>,
    auth: Arc<AuthTracker>,
    inner: Mutex<Inner>,
    observers: RwLock<Vec<ConnectionObserver>>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        connector: Arc<dyn Connector>,
        dispatcher: Arc<Dispatcher>,
        auth: Arc<AuthTracker>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Arc::new(Self {
            url: url.into(),
            policy,
            connector,
            dispatcher,
            auth,
            inner: Mutex::new(Inner::default()),
            observers: RwLock::new(Vec::new()),
            events,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Frames waiting for an open connection
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Automatic attempts made since the last successful connection
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.lock().attempts
    }

    /// Subscribe to lifecycle events
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Register a status observer
    pub fn on_connection(&self, observer: ConnectionObserver) {
        self.observers.write().push(observer);
    }

    /// Open a connection, replacing any current one
    ///
    /// Cancels a pending reconnect. A failure here does not schedule
    /// automatic reconnection.
    pub async fn connect(self: &Arc<Self>) -> ClientResult<()> {
        {
            let mut inner = self.inner.lock();
            if let Some(timer) = inner.reconnect_timer.take() {
                timer.handle.abort();
                tracing::debug!("Pending reconnect cancelled");
            }
        }

        self.open(None).await
    }

    /// Close the connection with a normal closure and stop reconnecting
    ///
    /// Messages sent afterwards are queued until the next `connect`.
    pub fn disconnect(&self) {
        let was_live = {
            let mut inner = self.inner.lock();
            if let Some(timer) = inner.reconnect_timer.take() {
                timer.handle.abort();
            }
            inner.generation += 1;
            inner.attempts = 0;
            inner.state = ConnectionState::Closed;

            match inner.writer.take() {
                Some(writer) => {
                    let _ = writer.send(Command::Close(CloseFrame::normal("client disconnect")));
                    true
                }
                None => false,
            }
        };

        tracing::info!(url = %self.url, "Disconnected by client");

        if was_live {
            self.closed(CloseCode::Normal.as_u16());
        }
    }

    /// Write a frame now, or queue it if the connection is not open
    ///
    /// Returns `true` when the frame was handed to a live connection.
    pub fn send_frame(&self, frame: OutboundFrame) -> bool {
        let mut inner = self.inner.lock();

        let frame = match (inner.state, inner.writer.as_ref()) {
            (ConnectionState::Open, Some(writer)) => match writer.send(Command::Send(frame)) {
                Ok(()) => return true,
                Err(mpsc::error::SendError(Command::Send(frame))) => frame,
                Err(_) => return false,
            },
            _ => frame,
        };

        tracing::warn!(
            kind = %frame.kind(),
            pending = inner.queue.len() + 1,
            "Connection not open, queueing message"
        );
        inner.queue.push(frame);

        false
    }

    async fn open(self: &Arc<Self>, attempt: Option<u32>) -> ClientResult<()> {
        let (generation, replaced) = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.state = ConnectionState::Connecting;

            let replaced = match inner.writer.take() {
                Some(writer) => {
                    let _ = writer.send(Command::Close(CloseFrame::normal("replaced")));
                    true
                }
                None => false,
            };
            (inner.generation, replaced)
        };

        if replaced {
            self.closed(CloseCode::Normal.as_u16());
        }

        tracing::info!(url = %self.url, attempt = ?attempt, "Connecting");

        let mut transport = match self.connector.connect(&self.url).await {
            Ok(transport) => transport,
            Err(e) => {
                let mut inner = self.inner.lock();
                if inner.generation != generation {
                    return Err(ClientError::Superseded);
                }
                inner.state = ConnectionState::Closed;
                drop(inner);

                tracing::warn!(url = %self.url, error = %e, "Connection failed");
                return Err(ClientError::Connect(e));
            }
        };

        let (writer, commands) = mpsc::unbounded_channel();
        let flushed = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                drop(inner);
                tokio::spawn(async move {
                    let _ = transport.close(CloseFrame::normal("superseded")).await;
                });
                return Err(ClientError::Superseded);
            }

            inner.state = ConnectionState::Open;
            inner.attempts = 0;
            let flushed = inner.queue.drain_into(&writer);
            inner.writer = Some(writer);
            flushed
        };

        tracing::info!(url = %self.url, flushed, "Connected");

        // Open-side notifications go out before the connection task exists,
        // so its close can never be reported ahead of them
        self.notify(true);
        let _ = self.events.send(ConnectionEvent::Connected);
        if let Some(attempt) = attempt {
            let _ = self.events.send(ConnectionEvent::Reconnected { attempt });
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let exit = run_connection(transport, commands, &manager.dispatcher).await;
            manager.handle_closed(generation, exit);
        });

        Ok(())
    }

    fn handle_closed(self: &Arc<Self>, generation: u64, exit: ConnectionExit) {
        let (code, unsent) = exit.into_unsent();

        let outcome = {
            let mut inner = self.inner.lock();

            if inner.generation != generation {
                // Replaced or disconnected; keep whatever never reached the wire.
                // With no live replacement these go back ahead of newer frames.
                // A live replacement may already have written newer frames, so
                // these follow them.
                if !unsent.is_empty() {
                    inner.queue.requeue_front(unsent);
                    if let Some(writer) = inner.writer.clone() {
                        let forwarded = inner.queue.drain_into(&writer);
                        tracing::debug!(
                            forwarded,
                            "Frames from a replaced connection sent on its replacement"
                        );
                    }
                }
                tracing::debug!(code, "Superseded connection closed");
                return;
            }

            inner.writer = None;
            inner.state = ConnectionState::Closed;
            if !unsent.is_empty() {
                tracing::debug!(count = unsent.len(), "Requeueing unwritten frames");
                inner.queue.requeue_front(unsent);
            }

            if CloseCode::is_intentional(code) {
                CloseOutcome::Intentional
            } else if self.policy.allows(inner.attempts) {
                let (attempt, delay) = self.schedule_reconnect(&mut inner);
                CloseOutcome::Scheduled { attempt, delay }
            } else {
                CloseOutcome::Exhausted
            }
        };

        tracing::info!(
            code,
            reason = %CloseCode::from_u16(code).map_or("unknown", CloseCode::description),
            "Connection closed"
        );

        self.closed(code);
        self.report(outcome);
    }

    fn schedule_reconnect(self: &Arc<Self>, inner: &mut Inner) -> (u32, Duration) {
        if let Some(timer) = inner.reconnect_timer.take() {
            timer.handle.abort();
        }

        inner.attempts += 1;
        inner.timer_seq += 1;
        let attempt = inner.attempts;
        let id = inner.timer_seq;
        let delay = self.policy.delay;

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut inner = manager.inner.lock();
                let current = inner
                    .reconnect_timer
                    .as_ref()
                    .is_some_and(|timer| timer.id == id);
                if !current {
                    return;
                }
                inner.reconnect_timer = None;
            }

            manager.reconnect(attempt).await;
        });

        inner.reconnect_timer = Some(ReconnectTimer { id, handle });

        (attempt, delay)
    }

    async fn reconnect(self: &Arc<Self>, attempt: u32) {
        if self.state() != ConnectionState::Closed {
            return;
        }

        tracing::info!(
            attempt,
            max_attempts = self.policy.max_attempts,
            "Attempting reconnect"
        );

        match self.open(Some(attempt)).await {
            Ok(()) | Err(ClientError::Superseded) => {}
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Reconnect attempt failed");
                let _ = self.events.send(ConnectionEvent::ReconnectFailed { attempt });

                let outcome = {
                    let mut inner = self.inner.lock();
                    if inner.state != ConnectionState::Closed || inner.reconnect_timer.is_some() {
                        return;
                    }
                    if self.policy.allows(inner.attempts) {
                        let (attempt, delay) = self.schedule_reconnect(&mut inner);
                        CloseOutcome::Scheduled { attempt, delay }
                    } else {
                        CloseOutcome::Exhausted
                    }
                };

                self.report(outcome);
            }
        }
    }

    /// Bookkeeping shared by every path that ends a live connection
    fn closed(&self, code: u16) {
        self.auth.reset();
        self.notify(false);
        let _ = self.events.send(ConnectionEvent::Disconnected { code });
    }

    fn report(&self, outcome: CloseOutcome) {
        match outcome {
            CloseOutcome::Intentional => {}
            CloseOutcome::Scheduled { attempt, delay } => {
                tracing::info!(
                    attempt,
                    max_attempts = self.policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Reconnect scheduled"
                );
                let _ = self
                    .events
                    .send(ConnectionEvent::ReconnectScheduled { attempt, delay });
            }
            CloseOutcome::Exhausted => {
                tracing::error!(
                    max_attempts = self.policy.max_attempts,
                    "Reconnect attempts exhausted"
                );
                let _ = self.events.send(ConnectionEvent::ReconnectExhausted);
            }
        }
    }

    fn notify(&self, connected: bool) {
        let observers = self.observers.read().clone();
        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(connected))).is_err() {
                tracing::error!(connected, "Connection observer panicked");
            }
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.url)
            .field("state", &self.state())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
