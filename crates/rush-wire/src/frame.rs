//! Length-prefixed framing with correlation identifiers.
//!
//! Decoding performs two exact reads: four bytes for the length, then the
//! declared number of body bytes. Stream transports deliver data in chunks of
//! arbitrary size, so each read loops until it is satisfied or the stream
//! reports end-of-file.

use std::io::{self, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::FrameError;

/// Width of the little-endian length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Width of the length prefix plus the correlation identifier.
pub const HEADER_LEN: usize = 8;

const CORRELATION_ID_LEN: u32 = 4;

/// A decoded frame: the correlation identifier and its structured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<T> {
    /// Identifier pairing a request with its response.
    pub correlation_id: u32,
    /// Deserialised payload.
    pub message: T,
}

/// Serialises `message` into a complete wire frame.
///
/// The codec enforces no upper bound beyond what a 32-bit length can express.
///
/// # Errors
///
/// Returns [`FrameError::Serialise`] when the message cannot be encoded as
/// JSON and [`FrameError::Oversized`] when the payload does not fit the
/// length field.
pub fn encode_frame<T>(correlation_id: u32, message: &T) -> Result<Vec<u8>, FrameError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(message).map_err(FrameError::Serialise)?;
    let length = u32::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_add(CORRELATION_ID_LEN))
        .ok_or(FrameError::Oversized { len: payload.len() })?;

    let mut buffer = Vec::with_capacity(HEADER_LEN + payload.len());
    buffer.extend_from_slice(&length.to_le_bytes());
    buffer.extend_from_slice(&correlation_id.to_le_bytes());
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

/// Encodes `message` and writes the whole frame before flushing.
///
/// # Errors
///
/// Propagates encoding failures from [`encode_frame`] and transport errors
/// as [`FrameError::Io`].
pub fn write_frame<W, T>(writer: &mut W, correlation_id: u32, message: &T) -> Result<(), FrameError>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    let bytes = encode_frame(correlation_id, message)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame without a size limit.
///
/// # Errors
///
/// See [`FrameReader::read`].
pub fn read_frame<T, R>(reader: &mut R) -> Result<Frame<T>, FrameError>
where
    T: DeserializeOwned,
    R: Read + ?Sized,
{
    FrameReader::new().read(reader)
}

/// Frame decoder with an optional caller-imposed size limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReader {
    max_len: Option<u32>,
}

impl FrameReader {
    /// Creates a decoder that accepts any declared length.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_len: None }
    }

    /// Creates a decoder that rejects declared lengths above `limit`.
    #[must_use]
    pub const fn with_max_len(limit: u32) -> Self {
        Self {
            max_len: Some(limit),
        }
    }

    /// Returns the configured limit, if any.
    #[must_use]
    pub const fn max_len(&self) -> Option<u32> {
        self.max_len
    }

    /// Reads exactly one frame from `reader`.
    ///
    /// # Errors
    ///
    /// - [`FrameError::ConnectionClosed`] when the stream ends before either
    ///   the length prefix or the declared body is complete.
    /// - [`FrameError::TooShort`] when the declared length cannot hold the
    ///   correlation identifier.
    /// - [`FrameError::TooLarge`] when a limit is configured and exceeded.
    /// - [`FrameError::MalformedPayload`] when the payload is not valid JSON
    ///   for `T`.
    /// - [`FrameError::Io`] for any other transport failure.
    pub fn read<T, R>(&self, reader: &mut R) -> Result<Frame<T>, FrameError>
    where
        T: DeserializeOwned,
        R: Read + ?Sized,
    {
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        read_full(reader, &mut prefix)?;
        let declared = u32::from_le_bytes(prefix);
        self.check_declared(declared)?;

        let body_len = usize::try_from(declared).map_err(|_| FrameError::TooLarge {
            declared,
            limit: u32::MAX,
        })?;
        let mut body = vec![0u8; body_len];
        read_full(reader, &mut body)?;

        let Some((id_bytes, payload)) = body.split_first_chunk::<4>() else {
            return Err(FrameError::TooShort { declared });
        };
        let correlation_id = u32::from_le_bytes(*id_bytes);
        let message = serde_json::from_slice(payload).map_err(FrameError::MalformedPayload)?;
        Ok(Frame {
            correlation_id,
            message,
        })
    }

    fn check_declared(&self, declared: u32) -> Result<(), FrameError> {
        if declared < CORRELATION_ID_LEN {
            return Err(FrameError::TooShort { declared });
        }
        match self.max_len {
            Some(limit) if declared > limit => Err(FrameError::TooLarge { declared, limit }),
            _ => Ok(()),
        }
    }
}

/// Fills `buffer` completely, treating a zero-byte read as a closed peer.
fn read_full<R>(reader: &mut R, buffer: &mut [u8]) -> Result<(), FrameError>
where
    R: Read + ?Sized,
{
    let expected = buffer.len();
    let mut received = 0usize;
    while let Some(remaining) = buffer.get_mut(received..).filter(|rest| !rest.is_empty()) {
        match reader.read(remaining) {
            Ok(0) => return Err(FrameError::ConnectionClosed { expected, received }),
            Ok(count) => received += count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(FrameError::Io(error)),
        }
    }
    Ok(())
}
