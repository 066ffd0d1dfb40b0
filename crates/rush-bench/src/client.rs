//! Session client for the rush daemon.
//!
//! Each call opens its own connection, sends one framed request, waits for
//! exactly one framed response, and closes the connection. The reported
//! latency covers all of that: the clock starts before connecting and stops
//! once the response has been decoded.

use std::io;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use rush_bench_config::Config;
use rush_wire::{
    DEFAULT_CORRELATION_ID, DaemonResponse, FrameError, FrameReader, Request, SessionInit,
    write_frame,
};
use thiserror::Error;
use tracing::debug;

use crate::transport;

const CLIENT_TARGET: &str = "rush_bench::client";

/// Connection parameters for [`DaemonClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    socket_path: Utf8PathBuf,
    timeout: Option<Duration>,
    max_frame_bytes: Option<u32>,
    correlation_id: u32,
}

impl ClientSettings {
    /// Creates settings for `socket_path` with no timeout or size limit.
    #[must_use]
    pub fn new(socket_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: None,
            max_frame_bytes: None,
            correlation_id: DEFAULT_CORRELATION_ID,
        }
    }

    /// Derives settings from resolved configuration.
    ///
    /// A zero timeout is treated as unbounded.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.timeout().filter(|limit| !limit.is_zero());
        Self {
            timeout,
            max_frame_bytes: config.max_frame_bytes(),
            ..Self::new(config.socket().clone())
        }
    }

    /// Bounds connect, send, and receive by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Rejects responses whose declared length exceeds `limit`.
    #[must_use]
    pub const fn with_max_frame_bytes(mut self, limit: u32) -> Self {
        self.max_frame_bytes = Some(limit);
        self
    }

    /// Overrides the correlation id written on each request.
    #[must_use]
    pub const fn with_correlation_id(mut self, correlation_id: u32) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Returns the daemon socket path.
    #[must_use]
    pub fn socket_path(&self) -> &Utf8Path {
        self.socket_path.as_path()
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the configured correlation id.
    #[must_use]
    pub const fn correlation_id(&self) -> u32 {
        self.correlation_id
    }

    fn frame_reader(&self) -> FrameReader {
        self.max_frame_bytes
            .map_or_else(FrameReader::new, FrameReader::with_max_len)
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.map_or(0, |limit| {
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
        })
    }
}

/// A completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Decoded response payload.
    pub response: DaemonResponse,
    /// Wall-clock time from before connect until the response was decoded.
    pub elapsed: Duration,
}

impl Execution {
    /// Elapsed time in fractional milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Errors surfaced by [`DaemonClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Nothing is listening on the socket.
    #[error("rush daemon is not running at {socket}: {source}")]
    DaemonUnavailable {
        /// Socket path that was tried.
        socket: Utf8PathBuf,
        /// Underlying connect failure.
        #[source]
        source: io::Error,
    },
    /// Connecting failed for another reason.
    #[error("failed to connect to {socket}: {source}")]
    Connect {
        /// Socket path that was tried.
        socket: Utf8PathBuf,
        /// Underlying connect failure.
        #[source]
        source: io::Error,
    },
    /// The configured timeout elapsed.
    #[error("daemon at {socket} did not respond within {timeout_ms} ms")]
    Timeout {
        /// Socket path in use.
        socket: Utf8PathBuf,
        /// Configured bound in milliseconds.
        timeout_ms: u64,
    },
    /// Sending or receiving a frame failed.
    #[error("daemon exchange failed: {0}")]
    Frame(#[from] FrameError),
    /// The response carried a different correlation id from the request.
    #[error("response correlation id {actual} does not match request id {expected}")]
    CorrelationMismatch {
        /// Id sent on the request.
        expected: u32,
        /// Id found on the response.
        actual: u32,
    },
    /// The current directory could not be captured for the request.
    #[error("failed to resolve working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
}

impl ClientError {
    fn from_connect(settings: &ClientSettings, source: io::Error) -> Self {
        let socket = settings.socket_path.clone();
        match source.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotFound
            | io::ErrorKind::AddrNotAvailable => Self::DaemonUnavailable { socket, source },
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout {
                socket,
                timeout_ms: settings.timeout_ms(),
            },
            _ => Self::Connect { socket, source },
        }
    }

    fn from_frame(settings: &ClientSettings, error: FrameError) -> Self {
        if error.is_timeout() {
            return Self::Timeout {
                socket: settings.socket_path.clone(),
                timeout_ms: settings.timeout_ms(),
            };
        }
        Self::Frame(error)
    }
}

/// Sends single requests to the daemon over fresh connections.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    settings: ClientSettings,
}

impl DaemonClient {
    /// Creates a client using `settings`.
    #[must_use]
    pub const fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    /// Returns the client settings.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Performs one request/response exchange and measures it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when connecting, sending, or receiving fails,
    /// when the timeout elapses, or when the response id does not match.
    pub fn execute(&self, request: &Request) -> Result<Execution, ClientError> {
        let settings = &self.settings;
        let started = Instant::now();
        let mut stream = transport::connect(settings.socket_path(), settings.timeout)
            .map_err(|error| ClientError::from_connect(settings, error))?;
        write_frame(&mut stream, settings.correlation_id, request)
            .map_err(|error| ClientError::from_frame(settings, error))?;
        let frame = settings
            .frame_reader()
            .read::<DaemonResponse, _>(&mut stream)
            .map_err(|error| ClientError::from_frame(settings, error))?;
        let elapsed = started.elapsed();
        drop(stream);

        if frame.correlation_id != settings.correlation_id {
            return Err(ClientError::CorrelationMismatch {
                expected: settings.correlation_id,
                actual: frame.correlation_id,
            });
        }

        debug!(
            target: CLIENT_TARGET,
            socket = %settings.socket_path,
            elapsed_us = elapsed.as_micros(),
            response_type = frame.message.message_type().unwrap_or("unknown"),
            "daemon round trip complete"
        );
        Ok(Execution {
            response: frame.message,
            elapsed,
        })
    }

    /// Runs `command` through the daemon using the current directory and
    /// `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WorkingDirectory`] when the current directory
    /// is unavailable, otherwise the errors of [`DaemonClient::execute`].
    pub fn execute_command(&self, command: &str) -> Result<Execution, ClientError> {
        let init = SessionInit::snapshot(command).map_err(ClientError::WorkingDirectory)?;
        self.execute(&Request::from(init))
    }

    /// Reports whether the daemon answers a trivial request.
    #[must_use]
    pub fn probe(&self) -> bool {
        match self.execute_command("true") {
            Ok(_) => true,
            Err(error) => {
                debug!(target: CLIENT_TARGET, %error, "daemon probe failed");
                false
            }
        }
    }
}
