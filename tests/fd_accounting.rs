//! Descriptor bookkeeping. Every test here is `#[serial]` so that counts
//! taken from `/proc/self/fd` are not disturbed by sibling tests.
#![cfg(target_os = "linux")]

mod common;

use std::io::Read;

use procpipe::exec::launch;
use procpipe::types::{ArgVector, DEFAULT_MAX_ARGS};
use procpipe_test_utils::open_fd_count;
use serial_test::serial;

use common::{ScriptDir, default_runner, init_tracing};

#[test]
#[serial]
fn test_failed_precondition_leaks_no_descriptors() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let not_exec = scripts.plain_file("plain.txt", "data").unwrap();

    let before = open_fd_count();

    assert!(default_runner().run("/no/such/program").is_err());
    let argv = ArgVector::tokenize(&not_exec.display().to_string(), DEFAULT_MAX_ARGS).unwrap();
    assert!(launch(&argv).is_err());

    assert_eq!(open_fd_count(), before);
}

#[test]
#[serial]
fn test_successful_run_leaks_no_descriptors() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("hello.sh", "echo hello").unwrap();
    let runner = default_runner();

    let before = open_fd_count();
    for _ in 0..10 {
        let output = runner.run(&cmd).unwrap();
        assert_eq!(output.text(), "hello\n");
    }

    assert_eq!(open_fd_count(), before);
}

#[test]
#[serial]
fn test_handle_holds_exactly_one_descriptor_until_reaped() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("hello.sh", "echo hello").unwrap();
    let argv = ArgVector::tokenize(&cmd, DEFAULT_MAX_ARGS).unwrap();

    let before = open_fd_count();
    let mut handle = launch(&argv).unwrap();
    assert_eq!(open_fd_count(), before + 1, "only the read end stays open");

    let mut out = String::new();
    handle.read_to_string(&mut out).unwrap();
    handle.reap().unwrap();

    assert_eq!(open_fd_count(), before);
}

#[test]
#[serial]
fn test_dropped_handle_releases_its_descriptor() {
    init_tracing();
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("quiet.sh", "exit 0").unwrap();
    let argv = ArgVector::tokenize(&cmd, DEFAULT_MAX_ARGS).unwrap();

    let before = open_fd_count();
    let handle = launch(&argv).unwrap();
    let pid = handle.pid();
    drop(handle);

    assert_eq!(open_fd_count(), before);

    // Collect the zombie the dropped handle left behind.
    nix::sys::wait::waitpid(pid, None).unwrap();
}
