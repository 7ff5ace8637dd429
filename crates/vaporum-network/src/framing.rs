//! NUL-delimited message framing.
//!
//! Every command line travels as its UTF-8 bytes followed by a single `0`
//! byte. The decoder accepts arbitrary chunking of the byte stream.

use thiserror::Error;

/// Byte that terminates every frame.
pub const FRAME_DELIMITER: u8 = 0;

/// Largest accepted frame body in bytes.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Framing failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("message contains the frame delimiter")]
    EmbeddedDelimiter,
}

/// Encode one message as a frame.
pub fn encode_frame(message: &str) -> Result<Vec<u8>, FrameError> {
    let bytes = message.as_bytes();
    if bytes.contains(&FRAME_DELIMITER) {
        return Err(FrameError::EmbeddedDelimiter);
    }
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge {
            size: bytes.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    let mut frame = Vec::with_capacity(bytes.len() + 1);
    frame.extend_from_slice(bytes);
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Incremental frame decoder.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    max_frame_size: usize,
    /// Set after an oversized frame until its delimiter shows up.
    discarding: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame_size(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_size,
            discarding: false,
        }
    }

    /// Append received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes held for an incomplete frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Pop the next complete frame.
    ///
    /// Empty frames are skipped. An oversized frame is reported once and its
    /// bytes are dropped up to the next delimiter.
    pub fn next_frame(&mut self) -> Option<Result<String, FrameError>> {
        loop {
            let Some(end) = self.buffer.iter().position(|b| *b == FRAME_DELIMITER) else {
                if self.buffer.len() > self.max_frame_size {
                    let size = self.buffer.len();
                    self.buffer.clear();
                    if !self.discarding {
                        self.discarding = true;
                        return Some(Err(FrameError::TooLarge {
                            size,
                            max: self.max_frame_size,
                        }));
                    }
                }
                return None;
            };

            let body: Vec<u8> = self.buffer.drain(..=end).take(end).collect();
            if self.discarding {
                self.discarding = false;
                continue;
            }
            if body.is_empty() {
                continue;
            }
            if body.len() > self.max_frame_size {
                return Some(Err(FrameError::TooLarge {
                    size: body.len(),
                    max: self.max_frame_size,
                }));
            }
            return Some(String::from_utf8(body).map_err(|_| FrameError::InvalidUtf8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame() {
        assert_eq!(encode_frame("EndTurn").unwrap(), b"EndTurn\0".to_vec());
        assert_eq!(encode_frame("a\0b"), Err(FrameError::EmbeddedDelimiter));
    }

    #[test]
    fn test_decode_split_chunks() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"Move hexCoords=\"1,");
        assert_eq!(decoder.next_frame(), None);
        decoder.extend(b"2\"\0Attack\0End");
        assert_eq!(
            decoder.next_frame(),
            Some(Ok("Move hexCoords=\"1,2\"".to_string()))
        );
        assert_eq!(decoder.next_frame(), Some(Ok("Attack".to_string())));
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.buffered_len(), 3);
    }

    #[test]
    fn test_empty_frames_skipped() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"\0\0Stay\0");
        assert_eq!(decoder.next_frame(), Some(Ok("Stay".to_string())));
        assert_eq!(decoder.next_frame(), None);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0xff, 0xfe, 0, b'O', b'k', 0]);
        assert_eq!(decoder.next_frame(), Some(Err(FrameError::InvalidUtf8)));
        assert_eq!(decoder.next_frame(), Some(Ok("Ok".to_string())));
    }

    #[test]
    fn test_oversized_frame_dropped() {
        let mut decoder = FrameDecoder::with_max_frame_size(4);
        decoder.extend(b"toolong");
        assert!(matches!(
            decoder.next_frame(),
            Some(Err(FrameError::TooLarge { .. }))
        ));
        decoder.extend(b"tail\0Stay\0");
        assert_eq!(decoder.next_frame(), Some(Ok("Stay".to_string())));
    }
}
