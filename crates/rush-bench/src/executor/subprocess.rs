//! Executor that spawns a shell per command.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{CommandExecutor, ExecutionError, duration_ms};

const SUBPROCESS_TARGET: &str = "rush_bench::executor::subprocess";
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs `<program> -c <command>` with all standard streams closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessExecutor {
    program: String,
    timeout: Option<Duration>,
}

impl SubprocessExecutor {
    /// Creates an executor for the shell `program`, e.g. `bash`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kills commands that run longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the shell program.
    #[must_use]
    pub fn program(&self) -> &str {
        self.program.as_str()
    }

    fn wait(&self, child: &mut Child) -> Result<(), ExecutionError> {
        let Some(limit) = self.timeout else {
            let status = child.wait().map_err(|source| self.wait_error(source))?;
            return self.check_status(status);
        };

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return self.check_status(status),
                Ok(None) if started.elapsed() > limit => {
                    warn!(
                        target: SUBPROCESS_TARGET,
                        program = %self.program,
                        timeout_ms = duration_ms(limit),
                        "command timed out, killing process"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(ExecutionError::Timeout {
                        program: self.program.clone(),
                        timeout_ms: duration_ms(limit),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => return Err(self.wait_error(source)),
            }
        }
    }

    fn check_status(&self, status: ExitStatus) -> Result<(), ExecutionError> {
        if status.success() {
            return Ok(());
        }
        Err(ExecutionError::NonZeroExit {
            program: self.program.clone(),
            status: i64::from(status.code().unwrap_or(-1)),
        })
    }

    fn wait_error(&self, source: io::Error) -> ExecutionError {
        ExecutionError::Wait {
            program: self.program.clone(),
            source,
        }
    }
}

impl CommandExecutor for SubprocessExecutor {
    fn execute(&mut self, command: &str) -> Result<Duration, ExecutionError> {
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        self.wait(&mut child)?;
        let elapsed = started.elapsed();
        debug!(
            target: SUBPROCESS_TARGET,
            program = %self.program,
            elapsed_us = elapsed.as_micros(),
            "subprocess command complete"
        );
        Ok(elapsed)
    }
}
