//! Executor backed by the rush daemon.

use std::time::Duration;

use crate::client::DaemonClient;

use super::{CommandExecutor, ExecutionError};

/// Name the daemon executor reports under in comparisons.
pub const DAEMON_EXECUTOR_NAME: &str = "rush-daemon";

/// Runs commands through [`DaemonClient`], one connection per call.
///
/// The response is opaque: any well-formed reply counts as a completed call.
/// [`DaemonExecutor::with_exit_status_check`] makes a non-zero `exit_code`
/// fail the call instead, matching [`super::SubprocessExecutor`].
#[derive(Debug, Clone)]
pub struct DaemonExecutor {
    client: DaemonClient,
    check_exit_status: bool,
}

impl DaemonExecutor {
    /// Wraps `client`.
    #[must_use]
    pub const fn new(client: DaemonClient) -> Self {
        Self {
            client,
            check_exit_status: false,
        }
    }

    /// Treats a response whose `exit_code` is present and non-zero as a
    /// failed call.
    #[must_use]
    pub const fn with_exit_status_check(mut self) -> Self {
        self.check_exit_status = true;
        self
    }

    /// `true` when non-zero exit codes fail the call.
    #[must_use]
    pub const fn checks_exit_status(&self) -> bool {
        self.check_exit_status
    }

    /// Returns the wrapped client.
    #[must_use]
    pub const fn client(&self) -> &DaemonClient {
        &self.client
    }
}

impl CommandExecutor for DaemonExecutor {
    fn execute(&mut self, command: &str) -> Result<Duration, ExecutionError> {
        let execution = self.client.execute_command(command)?;
        if !self.check_exit_status {
            return Ok(execution.elapsed);
        }
        match execution.response.exit_code() {
            Some(status) if status != 0 => Err(ExecutionError::NonZeroExit {
                program: String::from(DAEMON_EXECUTOR_NAME),
                status,
            }),
            _ => Ok(execution.elapsed),
        }
    }
}
