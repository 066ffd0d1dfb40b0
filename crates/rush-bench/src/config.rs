//! Routing of configuration flags to the layered loader.
//!
//! Configuration flags must precede every other token. The leading run of
//! them goes to `ortho_config`; the rest is parsed by clap.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use rush_bench_config::{CONFIG_CLI_FLAGS, Config};

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered arguments, the environment,
    /// and any configuration file.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if flag.starts_with("--") && CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    while let Some(argument) = remaining.as_slice().first() {
        let FlagAction::Include { needs_value } = classify(argument) else {
            break;
        };
        config_arguments.push(argument.clone());
        remaining.next();
        if needs_value && let Some(value) = remaining.next() {
            config_arguments.push(value.clone());
        }
    }

    let command_start = args.len() - remaining.as_slice().len();
    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}

/// Builds the argument list clap sees: the program name followed by every
/// token after the configuration flags.
pub(crate) fn command_arguments(args: &[OsString], command_start: usize) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.get(command_start..).unwrap_or_default())
        .cloned()
        .collect()
}
