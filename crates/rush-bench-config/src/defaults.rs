//! Built-in defaults shared by the benchmark binary and its tests.

use std::env;

use camino::Utf8PathBuf;
use dirs::home_dir;

use crate::logging::LogFormat;

/// Directory under the user's home that holds the daemon socket.
pub const DEFAULT_RUNTIME_DIR: &str = ".rush";

/// File name of the daemon socket.
pub const DEFAULT_SOCKET_FILE: &str = "daemon.sock";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Computes the daemon socket path, `~/.rush/daemon.sock`.
///
/// Falls back to the temporary directory when the home directory cannot be
/// resolved or is not valid UTF-8.
#[must_use]
pub fn default_socket_path() -> Utf8PathBuf {
    let mut base = home_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(fallback_base_directory);
    base.push(DEFAULT_RUNTIME_DIR);
    base.push(DEFAULT_SOCKET_FILE);
    base
}

fn fallback_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}
