// src/exec/launcher.rs

//! Fork/exec of a single child with its stdout wired to a [`Channel`].
//!
//! Everything that runs between `fork` and `execv` in the child must be
//! async-signal safe: no allocation, no locking, no logging. The argument
//! pointer array and the discard sink path are therefore built before
//! forking, and the child branch talks to `libc` directly.

use std::ffi::{CStr, CString};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::raw::{c_char, c_int};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::{AccessFlags, ForkResult, Pid, access, fork};
use tracing::{debug, info, warn};

use crate::errors::{ProcpipeError, Result};
use crate::exec::channel::Channel;
use crate::exec::handle::{ProcessHandle, ProcessStream, wait_for_exit};
use crate::types::{ArgVector, ExitStatus};

/// Where the child's stderr goes unless configured otherwise.
pub const DEFAULT_DISCARD_SINK: &CStr = c"/dev/null";

/// Spawns children whose stdout is captured and whose stderr is discarded.
#[derive(Debug, Clone)]
pub struct Launcher {
    discard_sink: CString,
}

impl Default for Launcher {
    fn default() -> Self {
        Self {
            discard_sink: DEFAULT_DISCARD_SINK.to_owned(),
        }
    }
}

impl Launcher {
    /// Use `discard_sink` (opened write-only in the child) as stderr.
    pub fn with_discard_sink(discard_sink: impl AsRef<Path>) -> Result<Self> {
        let bytes = discard_sink.as_ref().as_os_str().as_bytes();
        let discard_sink = CString::new(bytes).map_err(|_| {
            ProcpipeError::ConfigError(format!(
                "discard sink path {:?} contains a NUL byte",
                discard_sink.as_ref()
            ))
        })?;
        Ok(Self { discard_sink })
    }

    pub fn discard_sink(&self) -> &CStr {
        &self.discard_sink
    }

    /// Start `args` as a child process and return a handle to its stdout.
    ///
    /// The program is checked for existence and execute permission first;
    /// if that fails, no pipe is created and no process is forked.
    pub fn launch(&self, args: &ArgVector) -> Result<ProcessHandle> {
        check_executable(args.program_path())?;

        let argv: Vec<*const c_char> = args
            .iter()
            .map(CStr::as_ptr)
            .chain(std::iter::once(ptr::null()))
            .collect();

        let channel = Channel::new()?;

        // SAFETY: the child branch only calls async-signal-safe functions
        // on data prepared above, and always ends in execv or _exit.
        match unsafe { fork() } {
            Err(err) => {
                warn!(program = %args.program_path().display(), error = %err, "fork failed");
                // Both channel ends are closed when `channel` drops here.
                Err(ProcpipeError::ForkFailed {
                    program: args.program_path().display().to_string(),
                    source: err,
                })
            }
            Ok(ForkResult::Child) => {
                let Channel { read, write } = channel;
                // SAFETY: we are the freshly forked child.
                unsafe { exec_child(read, write, &self.discard_sink, &argv) }
            }
            Ok(ForkResult::Parent { child }) => {
                drop(channel.write);

                match ProcessStream::from_fd(channel.read) {
                    Ok(stream) => {
                        info!(pid = child.as_raw(), program = %args, "launched child process");
                        Ok(ProcessHandle::new(child, stream))
                    }
                    Err(err) => {
                        warn!(pid = child.as_raw(), error = %err, "could not wrap child stdout");
                        if let Err(reap_err) = abandon_child(child) {
                            debug!(pid = child.as_raw(), error = %reap_err, "reaping after wrap failure");
                        }
                        Err(err)
                    }
                }
            }
        }
    }
}

/// Kill and collect a child whose output can no longer be read.
///
/// The child may not exit on its own, so it gets SIGKILL before the wait.
fn abandon_child(child: Pid) -> Result<ExitStatus> {
    match kill(child, Signal::SIGKILL) {
        // ESRCH: already gone, but possibly still a zombie.
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => debug!(pid = child.as_raw(), error = %err, "kill before reap"),
    }
    wait_for_exit(child)
}

/// Launch `args` with the default discard sink.
pub fn launch(args: &ArgVector) -> Result<ProcessHandle> {
    Launcher::default().launch(args)
}

/// Existence and execute-permission check on the program path.
pub fn check_executable(path: &Path) -> Result<()> {
    let not_executable = |reason: String| ProcpipeError::NotExecutable {
        path: path.display().to_string(),
        reason,
    };

    access(path, AccessFlags::F_OK | AccessFlags::X_OK)
        .map_err(|err| not_executable(err.desc().to_string()))?;

    let meta = std::fs::metadata(path).map_err(|err| not_executable(err.to_string()))?;
    if meta.is_dir() {
        return Err(not_executable("is a directory".to_string()));
    }

    Ok(())
}

/// Child side of the fork. Never returns.
///
/// The sink is opened while the read end still occupies its slot, so a
/// parent with closed standard descriptors cannot hand the sink fd 1.
unsafe fn exec_child(
    read: OwnedFd,
    write: OwnedFd,
    discard_sink: &CStr,
    argv: &[*const c_char],
) -> ! {
    let sink = unsafe { libc::open(discard_sink.as_ptr(), libc::O_WRONLY | libc::O_CLOEXEC) };
    drop(read);

    if sink < 0 {
        drop(write);
        unsafe { libc::_exit(libc::EXIT_FAILURE) };
    }

    let write_fd = write.as_raw_fd();
    if redirect(write_fd, libc::STDOUT_FILENO) < 0 || redirect(sink, libc::STDERR_FILENO) < 0 {
        if write_fd != libc::STDOUT_FILENO && write_fd != libc::STDERR_FILENO {
            drop(write);
        } else {
            std::mem::forget(write);
        }
        if sink != libc::STDOUT_FILENO && sink != libc::STDERR_FILENO {
            unsafe { libc::close(sink) };
        }
        unsafe { libc::_exit(libc::EXIT_FAILURE) };
    }

    // The originals are close-on-exec; only fds 1 and 2 survive execv.
    std::mem::forget(write);

    unsafe {
        reset_signal_state();
        libc::execv(argv[0], argv.as_ptr());
        libc::_exit(libc::EXIT_FAILURE)
    }
}

/// Undo what the Rust runtime and the caller may have changed: SIGPIPE is
/// ignored by std's startup code, and an ignored disposition or a blocked
/// mask would otherwise be inherited by the new program.
unsafe fn reset_signal_state() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);

        let mut empty: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut empty);
        libc::sigprocmask(libc::SIG_SETMASK, &empty, ptr::null_mut());
    }
}

/// Make `target` a copy of `src` that survives exec.
fn redirect(src: c_int, target: c_int) -> c_int {
    if src == target {
        // dup2 onto itself keeps FD_CLOEXEC; clear it by hand.
        return clear_cloexec(src);
    }
    loop {
        let ret = unsafe { libc::dup2(src, target) };
        if ret < 0 && Errno::last() == Errno::EINTR {
            continue;
        }
        return ret;
    }
}

fn clear_cloexec(fd: c_int) -> c_int {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD, 0) };
    if flags < 0 {
        return -1;
    }
    let new_flags = flags & !libc::FD_CLOEXEC;
    if flags == new_flags {
        0
    } else {
        unsafe { libc::fcntl(fd, libc::F_SETFD, new_flags) }
    }
}
