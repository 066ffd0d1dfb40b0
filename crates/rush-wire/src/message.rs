//! Structured messages carried inside frames.
//!
//! Requests are internally tagged by a `type` field. Responses are treated as
//! opaque JSON objects: the client delivers them to the caller without
//! depending on their shape.

use std::collections::BTreeMap;
use std::env;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Correlation identifier used by the one-request-per-connection client.
pub const DEFAULT_CORRELATION_ID: u32 = 1;

/// How the daemon should wire the command's standard input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdinMode {
    /// No input is piped in.
    #[default]
    Null,
    /// The command inherits the client's standard input.
    Inherit,
    /// Input is streamed through a pipe.
    Pipe,
}

/// Session initialisation payload describing one command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInit {
    /// Directory the command runs in.
    pub working_dir: String,
    /// Environment subset forwarded to the daemon.
    pub env: BTreeMap<String, String>,
    /// Shell invocation arguments, for example `["-c", "echo hello"]`.
    pub args: Vec<String>,
    /// Standard input handling.
    pub stdin_mode: StdinMode,
}

impl SessionInit {
    /// Builds a `-c <command>` invocation with no standard input.
    #[must_use]
    pub fn shell_command(
        command: impl Into<String>,
        working_dir: impl Into<String>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            env,
            args: vec![String::from("-c"), command.into()],
            stdin_mode: StdinMode::Null,
        }
    }

    /// Builds a request from the process's current directory and `PATH`.
    ///
    /// The snapshot is taken at call time so every request reflects the
    /// environment as it is when the request is sent.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported when the current directory cannot be
    /// resolved.
    pub fn snapshot(command: &str) -> io::Result<Self> {
        let working_dir = env::current_dir()?.to_string_lossy().into_owned();
        let path = env::var_os("PATH")
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default();
        let environment = BTreeMap::from([(String::from("PATH"), path)]);
        Ok(Self::shell_command(command, working_dir, environment))
    }

    /// Replaces the standard input mode.
    #[must_use]
    pub const fn with_stdin_mode(mut self, stdin_mode: StdinMode) -> Self {
        self.stdin_mode = stdin_mode;
        self
    }

    /// Returns the command text of a `-c` invocation.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self.args.as_slice() {
            [flag, command, ..] if flag == "-c" => Some(command.as_str()),
            _ => None,
        }
    }
}

/// Client-to-daemon messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Starts a session that executes one command.
    SessionInit(SessionInit),
}

impl From<SessionInit> for Request {
    fn from(init: SessionInit) -> Self {
        Self::SessionInit(init)
    }
}

/// Daemon reply, kept as an uninterpreted JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaemonResponse(Map<String, Value>);

impl DaemonResponse {
    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the `type` tag when the daemon supplied one.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    /// Returns the `exit_code` field of an execution result.
    #[must_use]
    pub fn exit_code(&self) -> Option<i64> {
        self.get("exit_code").and_then(Value::as_i64)
    }

    /// Borrows the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the response and returns the JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DaemonResponse {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
