#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use procpipe::config::{CommandConfig, ConfigFile, RawConfigFile, RunnerSection};
use procpipe::types::SuccessPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                runner: RunnerSection::default(),
                command: BTreeMap::new(),
            },
        }
    }

    pub fn with_max_args(mut self, max_args: usize) -> Self {
        self.config.runner.max_args = max_args;
        self
    }

    pub fn with_success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.config.runner.success_policy = policy;
        self
    }

    pub fn with_discard_sink(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.runner.discard_sink = path.into();
        self
    }

    pub fn with_command(mut self, name: &str, cmd: &str) -> Self {
        self.config.command.insert(
            name.to_string(),
            CommandConfig {
                cmd: cmd.to_string(),
                description: None,
            },
        );
        self
    }

    /// The unvalidated config, for tests that exercise validation itself.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
