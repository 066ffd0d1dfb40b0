//! Shared helpers for unit and behaviour tests.

pub(crate) mod fake_daemon;

use std::time::Duration;

use crate::executor::{CommandExecutor, ExecutionError};

pub(crate) fn failure(status: i64) -> ExecutionError {
    ExecutionError::NonZeroExit {
        program: String::from("test-shell"),
        status,
    }
}

/// Executor returning a fixed latency and failing from call `fail_on`
/// onwards (1-based).
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedExecutor {
    pub(crate) latency: Duration,
    pub(crate) fail_on: Option<usize>,
    pub(crate) calls: usize,
}

impl ScriptedExecutor {
    pub(crate) fn succeeding(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub(crate) fn failing_on(call: usize) -> Self {
        Self {
            latency: Duration::from_millis(1),
            fail_on: Some(call),
            calls: 0,
        }
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&mut self, _command: &str) -> Result<Duration, ExecutionError> {
        self.calls += 1;
        match self.fail_on {
            Some(call) if self.calls >= call => Err(failure(1)),
            _ => Ok(self.latency),
        }
    }
}
