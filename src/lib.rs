// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod util;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::errors::ProcpipeError;
use crate::exec::{CommandOutput, CommandRunner, RunnerOptions};
use crate::types::{ArgVector, SuccessPolicy};
use crate::util::Wildcard;

pub use crate::exec::{launch, run_command};
pub use crate::types::ExitStatus;

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code:
/// - `0` when the run succeeded under the active success policy,
/// - the child's exit code (or `128 + signo`) when it did not,
/// - errors are propagated and mapped to `1` by the caller.
pub fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;

    if args.list {
        print_commands(&cfg);
        return Ok(0);
    }

    let options = runner_options(&cfg, &args);
    let argv = resolve_args(&cfg, &args, options.max_args)?;

    if args.dry_run {
        print_dry_run(&argv);
        return Ok(0);
    }

    let filter = args.filter.as_deref().map(Wildcard::new).transpose()?;
    let runner = CommandRunner::new(options)?;

    match runner.run_args(&argv) {
        Ok(output) => {
            write_output(&output.stdout, filter.as_ref())?;
            Ok(exit_code_for(&output))
        }
        Err(ProcpipeError::ReapAfterCapture { captured, source }) => {
            write_output(&captured, filter.as_ref())?;
            Err(ProcpipeError::ReapAfterCapture { captured, source })
                .with_context(|| format!("running '{argv}'"))
        }
        Err(err) => Err(err).with_context(|| format!("running '{argv}'")),
    }
}

/// Config values, overridden by CLI flags.
fn runner_options(cfg: &ConfigFile, args: &CliArgs) -> RunnerOptions {
    let mut options = RunnerOptions::from(&cfg.runner);
    if let Some(max_args) = args.max_args {
        options.max_args = max_args;
    }
    if args.exit_code {
        options.success_policy = SuccessPolicy::ExitCode;
    }
    options
}

/// Argument vector for this invocation.
///
/// Named config commands are whitespace-tokenized; a trailing
/// `-- PROGRAM ARGS...` is taken as-is, one argument per CLI word.
fn resolve_args(cfg: &ConfigFile, args: &CliArgs, max_args: usize) -> Result<ArgVector> {
    if let Some(name) = &args.name {
        let command = cfg
            .command(name)
            .ok_or_else(|| ProcpipeError::ConfigError(format!("unknown command '{name}'")))?;
        return ArgVector::tokenize(&command.cmd, max_args)
            .with_context(|| format!("command '{name}'"));
    }

    if args.command.is_empty() {
        return Err(ProcpipeError::ConfigError(
            "no command given (pass --name NAME or -- PROGRAM ARGS...)".to_string(),
        )
        .into());
    }

    Ok(ArgVector::from_args(&args.command, max_args)?)
}

fn exit_code_for(output: &CommandOutput) -> i32 {
    if output.success {
        return 0;
    }
    match output.status.shell_code() {
        0 => 1,
        code => code,
    }
}

fn write_output(bytes: &[u8], filter: Option<&Wildcard>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match filter {
        None => out.write_all(bytes)?,
        Some(filter) => {
            let text = String::from_utf8_lossy(bytes);
            for line in text.lines().filter(|line| filter.is_match(line)) {
                writeln!(out, "{line}")?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn print_commands(cfg: &ConfigFile) {
    println!("commands ({}):", cfg.command.len());
    for (name, command) in cfg.command.iter() {
        println!("  - {name}");
        println!("      cmd: {}", command.cmd);
        if let Some(ref description) = command.description {
            println!("      description: {description}");
        }
    }
}

fn print_dry_run(argv: &ArgVector) {
    println!("procpipe dry-run");
    println!("  program: {}", argv.program_path().display());
    for (i, arg) in argv.iter().enumerate().skip(1) {
        println!("  arg[{i}]: {}", arg.to_string_lossy());
    }
    debug!(tokens = argv.len(), "dry-run complete (nothing launched)");
}
