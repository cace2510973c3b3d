// src/exec/runner.rs

//! Tokenize, launch, drain and reap in one call.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::{self, Read};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::RunnerSection;
use crate::errors::{ProcpipeError, Result};
use crate::exec::handle::ProcessHandle;
use crate::exec::launcher::{DEFAULT_DISCARD_SINK, Launcher};
use crate::types::{ArgVector, DEFAULT_MAX_ARGS, ExitStatus, SuccessPolicy};

/// Size of each read from the child's stdout.
const READ_CHUNK: usize = 4096;

/// Knobs for a [`CommandRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Command lines with more tokens than this are rejected.
    pub max_args: usize,
    pub success_policy: SuccessPolicy,
    /// Opened in the child as its stderr.
    pub discard_sink: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            max_args: DEFAULT_MAX_ARGS,
            success_policy: SuccessPolicy::default(),
            discard_sink: PathBuf::from(OsStr::from_bytes(DEFAULT_DISCARD_SINK.to_bytes())),
        }
    }
}

impl From<&RunnerSection> for RunnerOptions {
    fn from(section: &RunnerSection) -> Self {
        Self {
            max_args: section.max_args,
            success_policy: section.success_policy,
            discard_sink: section.discard_sink.clone(),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// Everything the child wrote to stdout, in order.
    pub stdout: Vec<u8>,
    /// Whether the run counts as successful under the runner's policy.
    pub success: bool,
}

impl CommandOutput {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    options: RunnerOptions,
    launcher: Launcher,
}

impl CommandRunner {
    pub fn new(options: RunnerOptions) -> Result<Self> {
        if options.max_args == 0 {
            return Err(ProcpipeError::ConfigError(
                "max_args must be >= 1 (got 0)".to_string(),
            ));
        }
        let launcher = Launcher::with_discard_sink(&options.discard_sink)?;
        Ok(Self { options, launcher })
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Tokenize `command_line` on whitespace and run it.
    ///
    /// Nothing is launched if the line is empty or has more than
    /// `max_args` tokens.
    pub fn run(&self, command_line: &str) -> Result<CommandOutput> {
        let args = ArgVector::tokenize(command_line, self.options.max_args).inspect_err(|err| {
            warn!(command = command_line, error = %err, "rejected command line");
        })?;
        self.run_args(&args)
    }

    /// Run an already tokenized argument vector.
    pub fn run_args(&self, args: &ArgVector) -> Result<CommandOutput> {
        let mut handle = self.launcher.launch(args)?;

        let stdout = match drain(&mut handle) {
            Ok(bytes) => bytes,
            Err(err) => {
                // Still collect the child so a read error leaves no zombie.
                if let Err(reap_err) = handle.reap() {
                    debug!(pid = handle.pid().as_raw(), error = %reap_err, "reaping after read error");
                }
                return Err(err.into());
            }
        };

        let status = match handle.reap() {
            Ok(status) => status,
            Err(source) => {
                return Err(ProcpipeError::ReapAfterCapture {
                    captured: stdout,
                    source: Box::new(source),
                });
            }
        };

        let success = self.options.success_policy.accepts(&status);
        info!(
            program = %args.program_path().display(),
            %status,
            bytes = stdout.len(),
            success,
            "command finished"
        );

        Ok(CommandOutput {
            status,
            stdout,
            success,
        })
    }
}

/// Read `handle` until EOF.
fn drain(handle: &mut ProcessHandle) -> io::Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match handle.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => output.extend_from_slice(&chunk[..n]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    debug!(pid = handle.pid().as_raw(), bytes = output.len(), "drained child stdout");
    Ok(output)
}

/// Run `command_line` with default options.
///
/// Returns whether the child was launched and reaped, plus its captured
/// stdout. Failures before launch yield empty output; a reap failure after
/// the output was drained still returns the drained text.
pub fn run_command(command_line: &str) -> (bool, String) {
    match CommandRunner::default().run(command_line) {
        Ok(output) => {
            let text = output.text().into_owned();
            (output.success, text)
        }
        Err(ProcpipeError::ReapAfterCapture { captured, .. }) => {
            (false, String::from_utf8_lossy(&captured).into_owned())
        }
        Err(_) => (false, String::new()),
    }
}
