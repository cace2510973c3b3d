mod common;

use nix::sys::signal::Signal;
use procpipe::errors::ProcpipeError;
use procpipe::exec::run_command;
use procpipe::types::ExitStatus;

use common::{ScriptDir, default_runner, strict_runner};

#[test]
fn test_captures_stdout_in_order_without_stderr() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts
        .sh_command(
            "mixed.sh",
            r#"echo first
echo "to stderr" >&2
echo second
printf 'no newline'"#,
        )
        .unwrap();

    let output = default_runner().run(&cmd).unwrap();

    assert!(output.success);
    assert_eq!(output.status, ExitStatus::Exited(0));
    assert_eq!(output.text(), "first\nsecond\nno newline");
}

#[test]
fn test_arguments_are_passed_through_verbatim() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts
        .sh_command("args.sh", r#"for a in "$@"; do echo "[$a]"; done"#)
        .unwrap();

    let output = default_runner()
        .run(&format!("{cmd}   alpha\tbeta  'gamma'  $HOME"))
        .unwrap();

    // No shell interpretation: quotes and variables arrive untouched.
    assert_eq!(output.text(), "[alpha]\n[beta]\n['gamma']\n[$HOME]\n");
}

#[test]
fn test_large_output_is_not_truncated() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts
        .sh_command(
            "flood.sh",
            r#"i=0
while [ $i -lt 20000 ]; do
  echo "line $i of the flood test, padded to exceed one pipe buffer"
  i=$((i+1))
done"#,
        )
        .unwrap();

    let output = default_runner().run(&cmd).unwrap();

    let expected: String = (0..20000)
        .map(|i| format!("line {i} of the flood test, padded to exceed one pipe buffer\n"))
        .collect();
    assert!(expected.len() > 64 * 1024);
    assert_eq!(output.stdout.len(), expected.len());
    assert_eq!(output.text(), expected);
}

#[test]
fn test_nonzero_exit_still_reaps_successfully() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("fail.sh", "echo partial\nexit 3").unwrap();

    let output = default_runner().run(&cmd).unwrap();

    assert!(output.success, "reaped policy ignores the child's code");
    assert_eq!(output.status, ExitStatus::Exited(3));
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(output.text(), "partial\n");
}

#[test]
fn test_exit_code_policy_rejects_nonzero_exit() {
    let scripts = ScriptDir::new().unwrap();
    let failing = scripts.sh_command("fail.sh", "exit 4").unwrap();
    let passing = scripts.sh_command("ok.sh", "echo fine").unwrap();

    let runner = strict_runner();

    let failed = runner.run(&failing).unwrap();
    assert!(!failed.success);
    assert_eq!(failed.status, ExitStatus::Exited(4));

    let passed = runner.run(&passing).unwrap();
    assert!(passed.success);
}

#[test]
fn test_signal_termination_is_distinguishable() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts
        .sh_command("die.sh", "echo before\nkill -KILL $$\necho after")
        .unwrap();

    let output = default_runner().run(&cmd).unwrap();

    assert_eq!(output.text(), "before\n");
    assert_eq!(output.status.signal(), Some(Signal::SIGKILL));
    assert_eq!(output.status.code(), None);
    assert!(!output.status.success());
    assert_eq!(output.status.shell_code(), 128 + 9);
}

#[test]
fn test_too_many_tokens_is_rejected_before_launch() {
    let scripts = ScriptDir::new().unwrap();
    let marker = scripts.path().join("launched");
    let cmd = scripts
        .sh_command("touch.sh", &format!("echo yes > {}", marker.display()))
        .unwrap();

    // `/bin/sh <script>` is two tokens; 31 extra makes 33.
    let args: Vec<String> = (0..31).map(|i| format!("a{i}")).collect();
    let line = format!("{cmd} {}", args.join(" "));

    let err = default_runner().run(&line).unwrap_err();

    match err {
        ProcpipeError::TooManyArguments { count, max } => {
            assert_eq!(count, 33);
            assert_eq!(max, 32);
        }
        other => panic!("Expected TooManyArguments, got: {other:?}"),
    }
    assert!(!marker.exists(), "nothing may be launched");
}

#[test]
fn test_exactly_max_tokens_is_accepted() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("count.sh", "echo $#").unwrap();

    let args: Vec<String> = (0..30).map(|i| format!("a{i}")).collect();
    let output = default_runner()
        .run(&format!("{cmd} {}", args.join(" ")))
        .unwrap();

    assert_eq!(output.text(), "30\n");
}

#[test]
fn test_empty_command_line_is_rejected() {
    let err = default_runner().run("   \t ").unwrap_err();
    assert!(matches!(err, ProcpipeError::EmptyArgs));
    assert!(err.is_precondition());
}

#[test]
fn test_missing_program_fails_with_precondition_error() {
    let err = default_runner()
        .run("/definitely/not/a/real/program --flag")
        .unwrap_err();
    assert!(matches!(err, ProcpipeError::NotExecutable { .. }));
}

#[test]
fn test_run_command_reports_success_and_text() {
    let scripts = ScriptDir::new().unwrap();
    let cmd = scripts.sh_command("hello.sh", "echo hello world").unwrap();

    let (ok, text) = run_command(&cmd);

    assert!(ok);
    assert_eq!(text, "hello world\n");
}

#[test]
fn test_run_command_failure_has_empty_output() {
    let (ok, text) = run_command("/no/such/binary");
    assert!(!ok);
    assert!(text.is_empty());

    let too_many = std::iter::repeat_n("x", 40).collect::<Vec<_>>().join(" ");
    let (ok, text) = run_command(&format!("/bin/sh {too_many}"));
    assert!(!ok);
    assert!(text.is_empty());
}

#[test]
fn test_runner_rejects_zero_max_args() {
    let err = procpipe::exec::CommandRunner::new(procpipe::exec::RunnerOptions {
        max_args: 0,
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, ProcpipeError::ConfigError(_)));
}
