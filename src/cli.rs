// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `procpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procpipe",
    version,
    about = "Run a program, capture its stdout, discard its stderr, and reap it.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Falls back to `PROCPIPE_CONFIG`, then to built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run the command configured as `[command.<NAME>]`.
    #[arg(long, value_name = "NAME", conflicts_with = "command")]
    pub name: Option<String>,

    /// List configured commands and exit.
    #[arg(long)]
    pub list: bool,

    /// Override `[runner].max_args`.
    #[arg(long, value_name = "N")]
    pub max_args: Option<usize>,

    /// Treat a nonzero child exit code as failure.
    #[arg(long)]
    pub exit_code: bool,

    /// Only print output lines matching this `*` wildcard.
    #[arg(long, value_name = "PATTERN")]
    pub filter: Option<String>,

    /// Print the tokenized argument vector without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Program path and arguments, after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
