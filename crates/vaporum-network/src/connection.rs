//! Bridges a byte stream to a [`ChannelTransport`].
//!
//! [`spawn`] starts a reader and a writer task on the current tokio runtime.
//! The reader decodes frames and forwards them to the game; the writer
//! encodes queued commands. When the stream closes or fails, the channels
//! close and the game sees the peer as disconnected.

use crate::channel::ChannelTransport;
use crate::framing::{encode_frame, FrameDecoder};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 4096;

/// Run `stream` in background tasks and return the game-side transport.
///
/// Must be called from within a tokio runtime.
pub fn spawn<S>(stream: S) -> ChannelTransport
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (to_peer_tx, mut to_peer_rx) = mpsc::unbounded_channel::<String>();
    let (from_peer_tx, from_peer_rx) = mpsc::unbounded_channel::<String>();
    let (mut reader, mut writer) = tokio::io::split(stream);

    tokio::spawn(async move {
        let mut decoder = FrameDecoder::new();
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            let read = match reader.read(&mut buffer).await {
                Ok(0) => {
                    debug!("Peer closed the stream");
                    break;
                }
                Ok(n) => n,
                Err(err) => {
                    warn!(error = %err, "Read from peer failed");
                    break;
                }
            };
            decoder.extend(&buffer[..read]);
            while let Some(frame) = decoder.next_frame() {
                match frame {
                    Ok(command) => {
                        if from_peer_tx.send(command).is_err() {
                            return;
                        }
                    }
                    Err(err) => warn!(error = %err, "Dropping bad frame"),
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(command) = to_peer_rx.recv().await {
            let frame = match encode_frame(&command) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(%command, error = %err, "Cannot frame command");
                    continue;
                }
            };
            if let Err(err) = writer.write_all(&frame).await {
                warn!(error = %err, "Write to peer failed");
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    ChannelTransport::new(to_peer_tx, from_peer_rx)
}

/// Accept one peer on `listener` and bridge it. Used by the host.
pub async fn accept(listener: &TcpListener) -> io::Result<ChannelTransport> {
    let (stream, addr) = listener.accept().await?;
    stream.set_nodelay(true)?;
    info!(%addr, "Peer connected");
    Ok(spawn(stream))
}

/// Connect to a host and bridge the connection. Used by the client.
pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<ChannelTransport> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    info!(addr = %stream.peer_addr()?, "Connected to host");
    Ok(spawn(stream))
}
