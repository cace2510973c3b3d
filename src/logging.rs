// src/logging.rs

//! Logging setup for `procpipe` using `tracing` + `tracing-subscriber`.
//!
//! Filter resolution:
//! 1. `--log-level` CLI flag, applied to every target
//! 2. `PROCPIPE_LOG`, either a bare level ("debug", "warning") or
//!    `EnvFilter` directives such as `procpipe::exec=trace,warn`
//! 3. `info`
//!
//! Logs go to STDERR; STDOUT carries only the captured child output.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "PROCPIPE_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env_value.as_deref());

    // Malformed directives fall back to the default rather than aborting.
    let (filter, rejected) = match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(err)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?;

    if let Some(err) = rejected {
        tracing::warn!(directives = %directives, error = %err, "ignoring invalid {LOG_ENV}");
    }

    Ok(())
}

/// Directive string for the subscriber's `EnvFilter`.
///
/// Bare level names in `env_value` are normalised (so "warning" works);
/// anything else is handed to `EnvFilter` unchanged.
pub fn filter_directives(cli_level: Option<LogLevel>, env_value: Option<&str>) -> String {
    if let Some(lvl) = cli_level {
        return level_name(level_from_log_level(lvl));
    }

    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => match parse_level_str(value) {
            Some(level) => level_name(level),
            None => value.to_string(),
        },
        None => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn level_name(level: tracing::Level) -> String {
    level.as_str().to_ascii_lowercase()
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
