#![allow(dead_code)]

use procpipe::exec::{CommandRunner, RunnerOptions};
use procpipe::types::SuccessPolicy;

pub use procpipe_test_utils::{ScriptDir, init_tracing};

/// Runner with default options and tracing initialised.
pub fn default_runner() -> CommandRunner {
    init_tracing();
    CommandRunner::default()
}

/// Runner that also requires a zero exit code.
pub fn strict_runner() -> CommandRunner {
    init_tracing();
    CommandRunner::new(RunnerOptions {
        success_policy: SuccessPolicy::ExitCode,
        ..RunnerOptions::default()
    })
    .expect("valid runner options")
}
