//! Executors that run one shell command and report how long it took.
//!
//! The harness only sees [`CommandExecutor`], so the daemon-backed shell
//! and subprocess reference shells are measured through the same loop.

mod daemon;
mod subprocess;

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::client::ClientError;

pub use self::daemon::{DAEMON_EXECUTOR_NAME, DaemonExecutor};
pub use self::subprocess::SubprocessExecutor;

/// Runs a command once and returns its wall-clock latency.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Executes `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] when the command could not be run or
    /// did not exit successfully.
    fn execute(&mut self, command: &str) -> Result<Duration, ExecutionError>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for Box<E> {
    fn execute(&mut self, command: &str) -> Result<Duration, ExecutionError> {
        (**self).execute(command)
    }
}

/// Failures reported by a [`CommandExecutor`].
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The daemon round trip failed.
    #[error(transparent)]
    Daemon(#[from] ClientError),
    /// The shell process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// Waiting on the shell process failed.
    #[error("failed to wait for {program}: {source}")]
    Wait {
        /// Program that was launched.
        program: String,
        /// Underlying wait failure.
        #[source]
        source: io::Error,
    },
    /// The command finished with a failing status.
    #[error("{program} exited with status {status}")]
    NonZeroExit {
        /// Program or executor that ran the command.
        program: String,
        /// Exit status, `-1` when terminated by a signal.
        status: i64,
    },
    /// The command outlived its time limit and was killed.
    #[error("{program} did not finish within {timeout_ms} ms")]
    Timeout {
        /// Program that was launched.
        program: String,
        /// Configured bound in milliseconds.
        timeout_ms: u64,
    },
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
