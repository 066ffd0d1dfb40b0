//! Errors raised while encoding or decoding frames.

use std::io;

use thiserror::Error;

/// Failures produced by the framing codec.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The peer closed the stream before the declared byte count arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed {
        /// Bytes required by the read in progress.
        expected: usize,
        /// Bytes that arrived before end-of-stream.
        received: usize,
    },
    /// The payload did not parse as the expected structured message.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
    /// The declared length cannot hold a correlation identifier.
    #[error("declared frame length {declared} is shorter than the correlation id")]
    TooShort {
        /// Length read from the prefix.
        declared: u32,
    },
    /// The declared length exceeds the caller-imposed limit.
    #[error("declared frame length {declared} exceeds limit of {limit} bytes")]
    TooLarge {
        /// Length read from the prefix.
        declared: u32,
        /// Configured maximum.
        limit: u32,
    },
    /// The outgoing payload is too large to describe in a 32-bit length.
    #[error("payload of {len} bytes does not fit in a frame")]
    Oversized {
        /// Serialised payload length.
        len: usize,
    },
    /// The outgoing message failed to serialise.
    #[error("failed to serialise message: {0}")]
    Serialise(#[source] serde_json::Error),
    /// The transport reported an error other than end-of-stream.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    /// Returns true when the failure came from a transport deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Io(source) => matches!(
                source.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
