// src/config/model.rs

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::launcher::DEFAULT_DISCARD_SINK;
use crate::types::{DEFAULT_MAX_ARGS, SuccessPolicy};

/// Configuration exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [runner]
/// max_args = 32
/// success_policy = "reaped"
/// discard_sink = "/dev/null"
///
/// [command.cpuinfo]
/// cmd = "/bin/cat /proc/cpuinfo"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    /// Named commands from `[command.<name>]`.
    #[serde(default)]
    pub command: BTreeMap<String, CommandConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub command: BTreeMap<String, CommandConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerSection,
        command: BTreeMap<String, CommandConfig>,
    ) -> Self {
        Self { runner, command }
    }

    /// Look up a named command.
    pub fn command(&self, name: &str) -> Option<&CommandConfig> {
        self.command.get(name)
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RunnerSection::default(), BTreeMap::new())
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Upper bound on tokens per command line.
    #[serde(default = "default_max_args")]
    pub max_args: usize,

    /// `"reaped"` (default) or `"exit-code"`.
    #[serde(default)]
    pub success_policy: SuccessPolicy,

    /// File the child's stderr is redirected to.
    #[serde(default = "default_discard_sink")]
    pub discard_sink: PathBuf,
}

fn default_max_args() -> usize {
    DEFAULT_MAX_ARGS
}

fn default_discard_sink() -> PathBuf {
    PathBuf::from(OsStr::from_bytes(DEFAULT_DISCARD_SINK.to_bytes()))
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            max_args: default_max_args(),
            success_policy: SuccessPolicy::default(),
            discard_sink: default_discard_sink(),
        }
    }
}

/// `[command.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    /// Whitespace-separated program path and arguments.
    pub cmd: String,

    #[serde(default)]
    pub description: Option<String>,
}
