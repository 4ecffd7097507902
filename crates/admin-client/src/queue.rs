//! Outbound queue
//!
//! Holds frames submitted while the connection is not open. Frames are kept
//! in submission order and flushed as soon as a connection opens.

use crate::connection::Command;
use crate::protocol::OutboundFrame;
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// FIFO of frames waiting for an open connection
#[derive(Debug, Default)]
pub struct OutboundQueue {
    frames: VecDeque<OutboundFrame>,
}

impl OutboundQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame at the tail
    pub fn push(&mut self, frame: OutboundFrame) {
        self.frames.push_back(frame);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Hand every queued frame to the connection writer, oldest first
    ///
    /// Stops at the first frame the writer rejects; that frame and everything
    /// after it stay queued. Returns the number of frames handed over.
    pub fn drain_into(&mut self, writer: &mpsc::UnboundedSender<Command>) -> usize {
        let mut flushed = 0;

        while let Some(frame) = self.frames.pop_front() {
            if let Err(mpsc::error::SendError(command)) = writer.send(Command::Send(frame)) {
                if let Command::Send(frame) = command {
                    self.frames.push_front(frame);
                }
                break;
            }
            flushed += 1;
        }

        flushed
    }

    /// Put frames that were never written back at the head, keeping their order
    pub fn requeue_front(&mut self, frames: Vec<OutboundFrame>) {
        for frame in frames.into_iter().rev() {
            self.frames.push_front(frame);
        }
    }
}
