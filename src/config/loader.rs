// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "PROCPIPE_CONFIG";

/// Read and deserialize a config file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Read, deserialize and validate a config file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    debug!(
        path = %path.as_ref().display(),
        commands = config.command.len(),
        "loaded config"
    );
    Ok(config)
}

/// Resolve which config file to use, if any.
///
/// An explicit path wins; otherwise `PROCPIPE_CONFIG` is consulted. With
/// neither, the built-in defaults apply and no file is read.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// Load the resolved config, or fall back to defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    match resolve_config_path(explicit) {
        Some(path) => load_and_validate(path),
        None => Ok(ConfigFile::default()),
    }
}
