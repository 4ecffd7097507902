//! In-memory transport for unit tests

use super::{CloseFrame, Connector, Transport, TransportEvent};
use crate::error::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct PeerState {
    sent: Vec<String>,
    closed_with: Option<CloseFrame>,
    fail_sends: bool,
}

#[derive(Default)]
struct ConnectorState {
    attempts: usize,
    refuse: usize,
    close_on_open: Option<u16>,
    peers: Vec<MockPeer>,
}

/// Connector that hands out in-memory transports
#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `n` connection attempts
    pub(crate) fn refuse_next(&self, n: usize) {
        self.state.lock().refuse = n;
    }

    /// Have every new connection closed by the server with `code` at once
    pub(crate) fn close_on_open(&self, code: u16) {
        self.state.lock().close_on_open = Some(code);
    }

    /// Total connection attempts, successful or not
    pub(crate) fn attempts(&self) -> usize {
        self.state.lock().attempts
    }

    pub(crate) fn connections(&self) -> usize {
        self.state.lock().peers.len()
    }

    pub(crate) fn last_peer(&self) -> MockPeer {
        let state = self.state.lock();
        state.peers[state.peers.len() - 1].clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<Box<dyn Transport>, TransportError> {
        let mut state = self.state.lock();
        state.attempts += 1;

        if state.refuse > 0 {
            state.refuse -= 1;
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(code) = state.close_on_open {
            let _ = tx.send(TransportEvent::Closed(Some(CloseFrame::new(code, "server close"))));
        }
        let shared = Arc::new(Mutex::new(PeerState::default()));
        state.peers.push(MockPeer {
            tx,
            state: Arc::clone(&shared),
        });

        Ok(Box::new(MockTransport { rx, state: shared }))
    }
}

/// Server side of one mock connection
#[derive(Clone)]
pub(crate) struct MockPeer {
    tx: mpsc::UnboundedSender<TransportEvent>,
    state: Arc<Mutex<PeerState>>,
}

impl MockPeer {
    pub(crate) fn push_text(&self, text: impl Into<String>) {
        let _ = self.tx.send(TransportEvent::Text(text.into()));
    }

    pub(crate) fn push_json(&self, value: &Value) {
        self.push_text(value.to_string());
    }

    /// Server-initiated close with a status code
    pub(crate) fn close_with(&self, code: u16) {
        let _ = self
            .tx
            .send(TransportEvent::Closed(Some(CloseFrame::new(code, "server close"))));
    }

    /// Abrupt loss of the connection
    pub(crate) fn drop_connection(&self) {
        self.close_with(1006);
    }

    /// Make every subsequent write fail
    pub(crate) fn fail_sends(&self) {
        self.state.lock().fail_sends = true;
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    pub(crate) fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub(crate) fn sent_types(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .map(|value| value["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Close frame the client sent, if it closed this connection
    pub(crate) fn closed_with(&self) -> Option<CloseFrame> {
        self.state.lock().closed_with.clone()
    }
}

struct MockTransport {
    rx: mpsc::UnboundedReceiver<TransportEvent>,
    state: Arc<Mutex<PeerState>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_sends || state.closed_with.is_some() {
            return Err(TransportError::Closed);
        }
        state.sent.push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Result<TransportEvent, TransportError> {
        match self.rx.recv().await {
            Some(event) => Ok(event),
            None => Ok(TransportEvent::Closed(None)),
        }
    }

    async fn close(&mut self, frame: CloseFrame) -> Result<(), TransportError> {
        self.state.lock().closed_with = Some(frame);
        Ok(())
    }
}

/// Poll `condition` until it holds or two seconds elapse
pub(crate) async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Run `future` with a two second limit
pub(crate) async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .unwrap_or_else(|_| panic!("timed out"))
}
