//! Test helpers for integration tests
//!
//! Provides a scripted admin gateway and small polling utilities.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use admin_client::{message_types, ClientOptions, ReconnectPolicy};
use anyhow::Result;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Token issued by the test gateway
pub const VALID_TOKEN: &str = "valid-token";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse";

#[derive(Debug, Clone, Copy)]
enum Control {
    /// Drop every socket without a close frame
    Drop,
    /// Close every socket with this code
    Close(u16),
}

#[derive(Debug)]
struct GatewayState {
    frames: Mutex<Vec<Value>>,
    connections: AtomicUsize,
    control: broadcast::Sender<Control>,
}

/// In-process admin gateway
///
/// Records every frame it receives and answers `authenticate`,
/// `get_products` and `subscribe`. Anything else gets the server's
/// "Unknown message type" error.
pub struct TestGateway {
    pub addr: SocketAddr,
    state: Arc<GatewayState>,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway on an ephemeral port
    pub async fn start() -> Result<Self> {
        let (control, _) = broadcast::channel(16);
        let state = Arc::new(GatewayState {
            frames: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
            control,
        });

        let app = Router::new()
            .route("/admin/ws", get(gateway_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// WebSocket endpoint URL
    pub fn url(&self) -> String {
        format!("ws://{}/admin/ws", self.addr)
    }

    /// Client options for this gateway with a short reconnect delay
    pub fn options(&self) -> ClientOptions {
        ClientOptions::new(self.url())
            .with_reconnect(ReconnectPolicy::new(3, Duration::from_millis(100)))
    }

    /// Connections accepted so far
    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// Every frame received, in arrival order
    pub fn frames(&self) -> Vec<Value> {
        self.state.frames.lock().clone()
    }

    /// Received frames of one type
    pub fn frames_of_type(&self, kind: &str) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|frame| frame["type"] == kind)
            .collect()
    }

    /// Kill every open connection without a close handshake
    pub fn drop_connections(&self) {
        let _ = self.state.control.send(Control::Drop);
    }

    /// Close every open connection with `code`
    pub fn close_connections(&self, code: u16) {
        let _ = self.state.control.send(Control::Close(code));
    }
}

async fn gateway_handler(
    State(state): State<Arc<GatewayState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: Arc<GatewayState>, mut socket: WebSocket) {
    let mut control = state.control.subscribe();
    state.connections.fetch_add(1, Ordering::SeqCst);

    loop {
        tokio::select! {
            message = socket.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    let Ok(frame) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    state.frames.lock().push(frame.clone());

                    if let Some(reply) = reply_to(&frame) {
                        if socket.send(Message::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
            command = control.recv() => match command {
                Ok(Control::Drop) => return,
                Ok(Control::Close(code)) => {
                    let frame = CloseFrame {
                        code,
                        reason: "server close".into(),
                    };
                    let _ = socket.send(Message::Close(Some(frame))).await;
                    return;
                }
                Err(_) => return,
            },
        }
    }
}

fn reply_to(frame: &Value) -> Option<Value> {
    let kind = frame["type"].as_str().unwrap_or_default();

    match kind {
        message_types::AUTHENTICATE => {
            let payload = &frame["payload"];
            let by_token = payload["token"] == VALID_TOKEN;
            let by_credentials =
                payload["email"] == ADMIN_EMAIL && payload["password"] == ADMIN_PASSWORD;

            Some(if by_token || by_credentials {
                json!({
                    "type": message_types::AUTH_SUCCESS,
                    "user": {"id": 1, "email": ADMIN_EMAIL, "token": VALID_TOKEN}
                })
            } else {
                json!({
                    "type": message_types::ERROR,
                    "message": "Invalid authentication credentials"
                })
            })
        }
        message_types::GET_PRODUCTS => Some(json!({
            "type": message_types::PRODUCTS_DATA,
            "products": [{"id": 1, "name": "Masala Chai", "price": 40}]
        })),
        message_types::SUBSCRIBE => None,
        other => Some(json!({
            "type": message_types::ERROR,
            "message": format!("Unknown message type: {other}")
        })),
    }
}

/// Poll `condition` until it holds or five seconds elapse
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..500 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// A local address nothing is listening on
pub fn unused_url() -> Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(format!("ws://127.0.0.1:{port}/admin/ws"))
}
