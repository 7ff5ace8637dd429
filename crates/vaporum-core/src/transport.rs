//! The seam between the game and whatever carries commands to the peer.

use std::collections::VecDeque;

/// A bidirectional, non-blocking channel of textual commands.
///
/// Implementations must never block the frame tick: `queue_outgoing`
/// buffers and `poll_incoming` returns immediately.
pub trait Transport: Send {
    /// Queue a command line for the peer.
    fn queue_outgoing(&mut self, command: String);

    /// Take the next command line received from the peer, if any.
    fn poll_incoming(&mut self) -> Option<String>;

    /// Whether the peer is still reachable.
    fn is_connected(&self) -> bool;
}

/// Transport for games without a peer. Outgoing commands are dropped.
#[derive(Debug, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn queue_outgoing(&mut self, command: String) {
        tracing::trace!(%command, "Dropping outgoing command (offline)");
    }

    fn poll_incoming(&mut self) -> Option<String> {
        None
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// In-memory transport that records outgoing commands and replays a
/// scripted incoming queue. Useful for console input and tests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub incoming: VecDeque<String>,
    pub outgoing: Vec<String>,
    pub connected: bool,
}

impl ScriptedTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Queue lines as if the peer had sent them.
    pub fn push_incoming(&mut self, line: impl Into<String>) {
        self.incoming.push_back(line.into());
    }
}

impl Transport for ScriptedTransport {
    fn queue_outgoing(&mut self, command: String) {
        self.outgoing.push(command);
    }

    fn poll_incoming(&mut self) -> Option<String> {
        self.incoming.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
