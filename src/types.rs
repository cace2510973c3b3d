// src/types.rs

use std::ffi::{CStr, CString, OsStr};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::str::FromStr;

use nix::sys::signal::Signal;
use serde::Deserialize;

use crate::errors::{ProcpipeError, Result};

/// Default upper bound on the number of tokens in an argument vector.
pub const DEFAULT_MAX_ARGS: usize = 32;

/// Program path followed by its arguments, ready to be handed to `execv`.
///
/// Construction enforces every precondition that can be checked without
/// touching the filesystem:
///
/// - at least one element (the program),
/// - no interior NUL bytes,
/// - no more than `max_args` elements.
///
/// Whether the program is actually executable is checked by the launcher,
/// as late as possible before forking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgVector {
    args: Vec<CString>,
}

impl ArgVector {
    /// Split a command line on whitespace.
    ///
    /// No quoting or escaping is interpreted. Lines with more than
    /// `max_args` tokens are rejected rather than truncated.
    pub fn tokenize(line: &str, max_args: usize) -> Result<Self> {
        Self::from_args(line.split_whitespace(), max_args)
    }

    pub fn from_args<I, S>(args: I, max_args: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let raw: Vec<S> = args.into_iter().collect();

        if raw.is_empty() {
            return Err(ProcpipeError::EmptyArgs);
        }
        if raw.len() > max_args {
            return Err(ProcpipeError::TooManyArguments {
                count: raw.len(),
                max: max_args,
            });
        }

        let args = raw
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                CString::new(arg.as_ref().as_bytes())
                    .map_err(|_| ProcpipeError::NulInArgument { index })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { args })
    }

    /// The program to execute (first element).
    pub fn program(&self) -> &CStr {
        &self.args[0]
    }

    pub fn program_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(self.args[0].to_bytes()))
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Always false; an empty vector cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CStr> {
        self.args.iter().map(CString::as_c_str)
    }

    pub fn as_slice(&self) -> &[CString] {
        &self.args
    }
}

impl fmt::Display for ArgVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How a reaped child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal termination with the given exit code.
    Exited(i32),
    /// Killed by a signal.
    Signaled { signal: Signal, core_dumped: bool },
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(code) => Some(*code),
            ExitStatus::Signaled { .. } => None,
        }
    }

    pub fn signal(&self) -> Option<Signal> {
        match self {
            ExitStatus::Exited(_) => None,
            ExitStatus::Signaled { signal, .. } => Some(*signal),
        }
    }

    /// Exit code in the convention used by POSIX shells: the code itself
    /// for a normal exit, `128 + signo` for a signal.
    pub fn shell_code(&self) -> i32 {
        match self {
            ExitStatus::Exited(code) => *code,
            ExitStatus::Signaled { signal, .. } => 128 + *signal as i32,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exit code {code}"),
            ExitStatus::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "killed by {signal} (core dumped)"),
            ExitStatus::Signaled { signal, .. } => write!(f, "killed by {signal}"),
        }
    }
}

/// What counts as success for a [`crate::exec::CommandRunner`] invocation.
///
/// - `Reaped`: the child was launched, drained and reaped; its own exit
///   code is not consulted (default).
/// - `ExitCode`: additionally require the child to exit with code 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessPolicy {
    #[default]
    Reaped,
    ExitCode,
}

impl SuccessPolicy {
    pub fn accepts(&self, status: &ExitStatus) -> bool {
        match self {
            SuccessPolicy::Reaped => true,
            SuccessPolicy::ExitCode => status.success(),
        }
    }
}

impl FromStr for SuccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reaped" => Ok(SuccessPolicy::Reaped),
            "exit-code" | "exit_code" => Ok(SuccessPolicy::ExitCode),
            other => Err(format!(
                "invalid success_policy: {other} (expected \"reaped\" or \"exit-code\")"
            )),
        }
    }
}
