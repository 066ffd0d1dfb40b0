//! Wire protocol for the rush command-execution daemon.
//!
//! Every message exchanged with the daemon travels inside a length-prefixed
//! frame:
//!
//! ```text
//! ┌────────────┬──────────────────┬─────────────────────┐
//! │   Length   │  Correlation ID  │   Payload (JSON)    │
//! │  (4 bytes) │    (4 bytes)     │  (length - 4 bytes) │
//! └────────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! Both integers are little-endian and the length counts every byte after
//! the length field itself. The codec in [`frame`] is transport agnostic: it
//! reads from any [`std::io::Read`] and keeps reading until the declared byte
//! count arrives or the peer closes the stream.
//!
//! # Example
//!
//! ```
//! use rush_wire::{Request, SessionInit, StdinMode, encode_frame, read_frame};
//! use std::collections::BTreeMap;
//!
//! let request = Request::SessionInit(SessionInit::shell_command(
//!     "echo hello",
//!     "/tmp",
//!     BTreeMap::from([(String::from("PATH"), String::from("/usr/bin"))]),
//! ));
//! let bytes = encode_frame(7, &request).expect("request serialises");
//! let frame = read_frame::<Request, _>(&mut bytes.as_slice()).expect("frame decodes");
//! assert_eq!(frame.correlation_id, 7);
//! assert_eq!(frame.message, request);
//! ```

mod error;
pub mod frame;
pub mod message;

#[cfg(test)]
mod tests;

pub use self::error::FrameError;
pub use self::frame::{
    Frame, FrameReader, HEADER_LEN, LENGTH_PREFIX_LEN, encode_frame, read_frame, write_frame,
};
pub use self::message::{
    DEFAULT_CORRELATION_ID, DaemonResponse, Request, SessionInit, StdinMode,
};
