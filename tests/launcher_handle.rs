mod common;

use std::fs;
use std::io::Read;

use procpipe::errors::ProcpipeError;
use procpipe::exec::{Launcher, launch};
use procpipe::types::{ArgVector, DEFAULT_MAX_ARGS, ExitStatus};

use common::{ScriptDir, init_tracing};

fn argv(line: &str) -> ArgVector {
    ArgVector::tokenize(line, DEFAULT_MAX_ARGS).unwrap()
}

#[test]
fn test_launch_read_and_reap() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("hello.sh", "echo hello\nexit 2").unwrap();

    let mut handle = launch(&argv(&cmd)).unwrap();
    assert!(handle.pid().as_raw() > 0);
    assert!(!handle.is_reaped());

    let mut out = String::new();
    handle.read_to_string(&mut out).unwrap();
    assert_eq!(out, "hello\n");

    let status = handle.reap().unwrap();
    assert_eq!(status, ExitStatus::Exited(2));
    assert_eq!(handle.status(), Some(ExitStatus::Exited(2)));
}

#[test]
fn test_second_reap_reports_status_unavailable() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("quiet.sh", "exit 0").unwrap();

    let mut handle = launch(&argv(&cmd)).unwrap();
    let pid = handle.pid().as_raw();

    handle.reap().unwrap();

    match handle.reap() {
        Err(ProcpipeError::ChildStatusUnavailable(p)) => assert_eq!(p, pid),
        other => panic!("Expected ChildStatusUnavailable, got: {other:?}"),
    }
}

#[test]
fn test_read_after_reap_is_an_error() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("hello.sh", "echo hi").unwrap();

    let mut handle = launch(&argv(&cmd)).unwrap();
    handle.reap().unwrap();

    let mut buf = [0u8; 16];
    assert!(handle.read(&mut buf).is_err());
}

#[test]
fn test_reap_without_reading_does_not_block() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    // Far more than a pipe buffer; the child gets SIGPIPE once the read
    // end is closed instead of blocking forever.
    let cmd = scripts
        .sh_command(
            "chatty.sh",
            r#"i=0
while [ $i -lt 50000 ]; do echo "unread output line $i"; i=$((i+1)); done"#,
        )
        .unwrap();

    let mut handle = launch(&argv(&cmd)).unwrap();
    let status = handle.reap().unwrap();

    assert!(!status.success());
}

#[test]
fn test_nonexistent_program_is_rejected() {
    init_tracing();
    let err = launch(&argv("/no/such/dir/program")).unwrap_err();

    match err {
        ProcpipeError::NotExecutable { path, .. } => assert_eq!(path, "/no/such/dir/program"),
        other => panic!("Expected NotExecutable, got: {other:?}"),
    }
}

#[test]
fn test_non_executable_file_is_rejected() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let path = scripts.plain_file("data.txt", "echo never").unwrap();

    let err = launch(&argv(&path.display().to_string())).unwrap_err();
    assert!(matches!(err, ProcpipeError::NotExecutable { .. }));
}

#[test]
fn test_directory_is_rejected() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();

    let err = launch(&argv(&scripts.path().display().to_string())).unwrap_err();

    match err {
        ProcpipeError::NotExecutable { reason, .. } => assert!(reason.contains("directory")),
        other => panic!("Expected NotExecutable, got: {other:?}"),
    }
}

#[test]
fn test_executable_script_runs_directly() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let path = scripts.script("direct.sh", "echo \"$0 $1\"").unwrap();

    let line = format!("{} arg", path.display());
    let mut handle = launch(&argv(&line)).unwrap();

    let mut out = String::new();
    handle.read_to_string(&mut out).unwrap();
    handle.reap().unwrap();

    assert_eq!(out, format!("{} arg\n", path.display()));
}

#[test]
fn test_exec_failure_surfaces_as_empty_output_and_failure_status() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    // Executable bit but no shebang and no valid binary format: execv fails
    // with ENOEXEC inside the child.
    let path = scripts.script("bogus", "").unwrap();
    fs::write(&path, b"\x00\x01\x02 not a program").unwrap();

    let mut handle = launch(&argv(&path.display().to_string())).unwrap();

    let mut out = Vec::new();
    handle.read_to_end(&mut out).unwrap();
    let status = handle.reap().unwrap();

    assert!(out.is_empty());
    assert_eq!(status, ExitStatus::Exited(libc::EXIT_FAILURE));
}

#[test]
fn test_stderr_goes_to_configured_discard_sink() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let sink = scripts.plain_file("stderr.log", "").unwrap();
    let cmd = scripts
        .sh_command("both.sh", "echo out\necho err >&2")
        .unwrap();

    let launcher = Launcher::with_discard_sink(&sink).unwrap();
    let mut handle = launcher.launch(&argv(&cmd)).unwrap();

    let mut out = String::new();
    handle.read_to_string(&mut out).unwrap();
    handle.reap().unwrap();

    assert_eq!(out, "out\n");
    assert_eq!(fs::read_to_string(&sink).unwrap(), "err\n");
}

#[test]
fn test_unopenable_discard_sink_fails_child_setup() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("hello.sh", "echo hello").unwrap();

    let launcher = Launcher::with_discard_sink("/no/such/dir/sink").unwrap();
    let mut handle = launcher.launch(&argv(&cmd)).unwrap();

    let mut out = Vec::new();
    handle.read_to_end(&mut out).unwrap();
    let status = handle.reap().unwrap();

    assert!(out.is_empty(), "child must not exec after failed rewiring");
    assert_eq!(status, ExitStatus::Exited(libc::EXIT_FAILURE));
}

#[test]
fn test_child_inherits_environment() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("env.sh", "echo \"$PATH\"").unwrap();

    let mut handle = launch(&argv(&cmd)).unwrap();
    let mut out = String::new();
    handle.read_to_string(&mut out).unwrap();
    handle.reap().unwrap();

    if let Ok(expected) = std::env::var("PATH") {
        assert_eq!(out.trim_end(), expected);
    }
}
