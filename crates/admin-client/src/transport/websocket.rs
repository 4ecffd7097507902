//! tokio-tungstenite transport

use super::{CloseFrame, Connector, Transport, TransportEvent};
use crate::error::TransportError;
use crate::protocol::CloseCode;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame as WsCloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Opens WebSocket connections (`ws://` and `wss://`)
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, TransportError> {
        let (stream, response) = connect_async(url).await?;

        tracing::debug!(
            url = %url,
            status = %response.status(),
            "WebSocket handshake complete"
        );

        Ok(Box::new(WsTransport { stream }))
    }
}

/// A connected WebSocket stream
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<TransportEvent, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(TransportEvent::Text(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "Binary frame ignored");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    // Pong replies are queued by tungstenite itself
                }
                Some(Ok(Message::Close(frame))) => {
                    let frame =
                        frame.map(|f| CloseFrame::new(u16::from(f.code), f.reason.into_owned()));
                    return Ok(TransportEvent::Closed(frame));
                }
                Some(Err(e)) => return Err(e.into()),
                // Stream ended without a close frame
                None => {
                    return Ok(TransportEvent::Closed(Some(CloseFrame::new(
                        CloseCode::Abnormal.as_u16(),
                        "connection dropped",
                    ))))
                }
            }
        }
    }

    async fn close(&mut self, frame: CloseFrame) -> Result<(), TransportError> {
        let frame = WsCloseFrame {
            code: WsCloseCode::from(frame.code),
            reason: frame.reason.into(),
        };

        match self.stream.close(Some(frame)).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport").finish()
    }
}

impl From<WsError> for TransportError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::Closed,
            WsError::Io(e) => Self::Io(e),
            WsError::Http(response) => Self::Handshake(format!("HTTP {}", response.status())),
            WsError::Url(e) => Self::Handshake(e.to_string()),
            other => Self::Protocol(other.to_string()),
        }
    }
}
