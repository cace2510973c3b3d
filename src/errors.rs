// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("argument vector is empty")]
    EmptyArgs,

    #[error("argument {index} contains an interior NUL byte")]
    NulInArgument { index: usize },

    #[error("too many arguments: {count} exceeds the limit of {max}")]
    TooManyArguments { count: usize, max: usize },

    #[error("the command \"{path}\" is not executable: {reason}")]
    NotExecutable { path: String, reason: String },

    #[error("could not create pipe: {0}")]
    ChannelCreation(#[source] nix::Error),

    #[error("could not fork process for \"{program}\": {source}")]
    ForkFailed {
        program: String,
        #[source]
        source: nix::Error,
    },

    #[error("could not wrap pipe read end as a stream: {0}")]
    StreamWrap(String),

    #[error("failed to close process stream for pid {pid}: {source}")]
    StreamClose {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("child status unavailable for pid {0}")]
    ChildStatusUnavailable(i32),

    #[error("waitpid failed for pid {pid}: {source}")]
    WaitFailed {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("unexpected wait status for pid {pid}: {status}")]
    UnexpectedStatus { pid: i32, status: String },

    /// The child's output was fully drained but reaping it failed.
    /// The captured bytes are still usable.
    #[error("reap failed after capturing {} bytes of output: {source}", .captured.len())]
    ReapAfterCapture {
        captured: Vec<u8>,
        #[source]
        source: Box<ProcpipeError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcpipeError {
    /// True for errors raised before any OS resource was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProcpipeError::EmptyArgs
                | ProcpipeError::NulInArgument { .. }
                | ProcpipeError::TooManyArguments { .. }
                | ProcpipeError::NotExecutable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProcpipeError>;
