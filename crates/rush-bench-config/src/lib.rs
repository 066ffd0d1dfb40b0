//! Layered configuration for the rush daemon benchmark tool.
//!
//! Values resolve in increasing precedence from built-in defaults, a TOML
//! configuration file (`--config-path` or `RUSH_BENCH_CONFIG_PATH`),
//! `RUSH_BENCH_*` environment variables, and finally command-line flags. The
//! resulting [`Config`] is an explicit value threaded into the client; no
//! component reads the socket location from ambient global state.

mod defaults;
mod logging;

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_RUNTIME_DIR, DEFAULT_SOCKET_FILE, default_log_filter_string,
    default_log_format, default_socket_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Command-line flags owned by the configuration loader.
///
/// These must precede any benchmark arguments on the command line.
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--socket",
    "--log-filter",
    "--log-format",
    "--timeout-ms",
    "--max-frame-bytes",
];

/// Resolved benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RUSH_BENCH")]
pub struct Config {
    /// Filesystem path of the daemon's Unix domain socket.
    #[ortho_config(default = default_socket_path())]
    pub socket: Utf8PathBuf,
    /// `tracing` filter expression applied to stderr logging.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for stderr logging.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Upper bound in milliseconds for connect, send, and receive.
    ///
    /// Unset means a hung daemon blocks the run indefinitely.
    pub timeout_ms: Option<u64>,
    /// Largest response frame the client accepts, in bytes.
    pub max_frame_bytes: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket_path(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            timeout_ms: None,
            max_frame_bytes: None,
        }
    }
}

impl Config {
    /// Returns the configured daemon socket path.
    #[must_use]
    pub fn socket(&self) -> &Utf8PathBuf {
        &self.socket
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Converts the millisecond bound into a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Returns the response size limit, if any.
    #[must_use]
    pub const fn max_frame_bytes(&self) -> Option<u32> {
        self.max_frame_bytes
    }
}
