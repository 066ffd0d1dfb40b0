//! Log output format selection for the benchmark binary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Formats the telemetry layer can emit on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One terse line per event, suited to an interactive terminal.
    #[default]
    Compact,
    /// Flattened JSON objects, one per line, for log collectors.
    Json,
}

/// Error returned when a [`LogFormat`] name is not recognised.
pub type LogFormatParseError = strum::ParseError;
