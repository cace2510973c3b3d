// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ProcpipeError, Result};
use crate::types::ArgVector;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProcpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.runner, raw.command))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runner(cfg)?;
    validate_commands(cfg)?;
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.max_args == 0 {
        return Err(ProcpipeError::ConfigError(
            "[runner].max_args must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.runner.discard_sink.as_os_str().is_empty() {
        return Err(ProcpipeError::ConfigError(
            "[runner].discard_sink must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Every named command must tokenize under the configured limit. Whether
/// its program exists is only checked at launch time.
fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    for (name, command) in cfg.command.iter() {
        if let Err(err) = ArgVector::tokenize(&command.cmd, cfg.runner.max_args) {
            return Err(ProcpipeError::ConfigError(format!(
                "command '{name}' is invalid: {err}"
            )));
        }
    }
    Ok(())
}
