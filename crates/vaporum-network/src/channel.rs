//! In-process transport over tokio channels.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use vaporum_core::transport::Transport;

/// One end of a bidirectional command channel.
///
/// Sending never blocks and receiving is a non-blocking poll, so the game
/// can call it from its frame tick. The other end may be another
/// `ChannelTransport` or a socket task (see [`crate::connection`]).
#[derive(Debug)]
pub struct ChannelTransport {
    outgoing: UnboundedSender<String>,
    incoming: UnboundedReceiver<String>,
    connected: bool,
}

impl ChannelTransport {
    /// Build from raw channel halves.
    pub fn new(outgoing: UnboundedSender<String>, incoming: UnboundedReceiver<String>) -> Self {
        Self {
            outgoing,
            incoming,
            connected: true,
        }
    }

    /// Two transports wired to each other.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self::new(a_tx, b_rx), Self::new(b_tx, a_rx))
    }
}

impl Transport for ChannelTransport {
    fn queue_outgoing(&mut self, command: String) {
        if self.outgoing.send(command).is_err() {
            tracing::debug!("Outgoing channel closed");
            self.connected = false;
        }
    }

    fn poll_incoming(&mut self) -> Option<String> {
        match self.incoming.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.connected {
                    tracing::debug!("Incoming channel closed");
                }
                self.connected = false;
                None
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected && !self.outgoing.is_closed()
    }
}
