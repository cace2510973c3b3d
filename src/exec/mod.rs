// src/exec/mod.rs

//! Process execution layer.
//!
//! A launch goes through three pieces, leaves first:
//!
//! - [`channel`] creates the pipe the child's stdout is written into.
//! - [`launcher`] forks, rewires the child's stdout onto the pipe and its
//!   stderr onto a discard sink, then execs the program.
//! - [`handle`] is what the parent gets back: a readable stream over the
//!   pipe plus the child's pid, and `reap` to close the stream and wait.
//!
//! [`runner`] composes them: tokenize a command line, launch, drain to EOF,
//! reap, and hand back the captured output.

pub mod channel;
pub mod handle;
pub mod launcher;
pub mod runner;

pub use channel::Channel;
pub use handle::{ProcessHandle, ProcessStream};
pub use launcher::{Launcher, launch};
pub use runner::{CommandOutput, CommandRunner, RunnerOptions, run_command};
