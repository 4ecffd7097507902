//! Per-connection I/O task
//!
//! Owns the transport for one physical connection. Writes commands from the
//! manager in order and dispatches inbound frames inline, so handlers see
//! messages in arrival order.

use crate::dispatch::Dispatcher;
use crate::protocol::{CloseCode, OutboundFrame};
use crate::transport::{CloseFrame, Transport, TransportEvent};
use tokio::sync::mpsc;

/// Instruction for the connection task
#[derive(Debug)]
pub enum Command {
    /// Write a frame
    Send(OutboundFrame),
    /// Close the connection with this frame and stop
    Close(CloseFrame),
}

/// How a connection task ended
#[derive(Debug)]
pub(crate) struct ConnectionExit {
    /// Close code observed or chosen
    pub code: u16,
    /// Frames taken from the command channel but never written
    pub unsent: Vec<OutboundFrame>,
    /// Command channel, possibly holding frames that were never read
    pub commands: mpsc::UnboundedReceiver<Command>,
}

impl ConnectionExit {
    /// Every frame that never reached the wire, oldest first
    pub(crate) fn into_unsent(self) -> (u16, Vec<OutboundFrame>) {
        let Self {
            code,
            mut unsent,
            mut commands,
        } = self;

        commands.close();
        while let Ok(command) = commands.try_recv() {
            if let Command::Send(frame) = command {
                unsent.push(frame);
            }
        }

        (code, unsent)
    }
}

/// Drive one connection until it closes
pub(crate) async fn run_connection(
    mut transport: Box<dyn Transport>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    dispatcher: &Dispatcher,
) -> ConnectionExit {
    let mut unsent = Vec::new();

    let code = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(frame)) => {
                    if let Err(e) = transport.send(frame.text().to_string()).await {
                        tracing::warn!(error = %e, kind = %frame.kind(), "Write failed");
                        unsent.push(frame);
                        break CloseCode::Abnormal.as_u16();
                    }
                    tracing::trace!(kind = %frame.kind(), "Frame written");
                }
                Some(Command::Close(frame)) => {
                    let code = frame.code;
                    if let Err(e) = transport.close(frame).await {
                        tracing::debug!(error = %e, "Close handshake failed");
                    }
                    break code;
                }
                None => {
                    let _ = transport.close(CloseFrame::normal("client dropped")).await;
                    break CloseCode::Normal.as_u16();
                }
            },
            event = transport.recv() => match event {
                Ok(TransportEvent::Text(text)) => {
                    dispatcher.dispatch(&text);
                }
                Ok(TransportEvent::Closed(frame)) => {
                    if let Some(frame) = &frame {
                        tracing::debug!(code = frame.code, reason = %frame.reason, "Peer closed connection");
                    }
                    break frame.map_or(CloseCode::NoStatus.as_u16(), |f| f.code);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Read failed");
                    break CloseCode::Abnormal.as_u16();
                }
            },
        }
    };

    ConnectionExit {
        code,
        unsent,
        commands,
    }
}
