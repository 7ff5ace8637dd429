//! Vaporum Networking Layer
//!
//! Concrete [`Transport`](vaporum_core::transport::Transport)
//! implementations for playing against a peer:
//!
//! - [`framing`]: NUL-delimited framing of command lines
//! - [`channel`]: in-process transport over tokio channels
//! - [`connection`]: tokio tasks bridging a TCP (or any async) stream to a
//!   channel transport
//!
//! The game never awaits anything. It polls the transport once per frame;
//! all I/O happens on the tokio runtime.

// Re-export core types
pub use vaporum_core;

pub mod channel;
pub mod connection;
pub mod framing;

pub use channel::ChannelTransport;
pub use connection::{accept, connect, spawn};
pub use framing::{encode_frame, FrameDecoder, FrameError, FRAME_DELIMITER, MAX_FRAME_SIZE};
