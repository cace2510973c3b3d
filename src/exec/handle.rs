// src/exec/handle.rs

//! Parent-side view of a launched child: its stdout stream and its pid.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{IntoRawFd, OwnedFd};
use std::os::unix::fs::FileTypeExt;

use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{info, trace, warn};

use crate::errors::{ProcpipeError, Result};
use crate::types::ExitStatus;

/// Readable stream over the read end of a child's stdout pipe.
#[derive(Debug)]
pub struct ProcessStream {
    file: File,
}

impl ProcessStream {
    /// Take ownership of `fd` as a stream. The descriptor must be a pipe;
    /// on failure it is closed before returning.
    pub(crate) fn from_fd(fd: OwnedFd) -> Result<Self> {
        let file = File::from(fd);
        let meta = file
            .metadata()
            .map_err(|err| ProcpipeError::StreamWrap(err.to_string()))?;

        if !meta.file_type().is_fifo() {
            return Err(ProcpipeError::StreamWrap(
                "descriptor is not a pipe".to_string(),
            ));
        }

        Ok(Self { file })
    }

    /// Close the underlying descriptor, reporting any error from close(2).
    fn close(self) -> nix::Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: `fd` was just released by `into_raw_fd`, so nothing else
        // owns or closes it.
        Errno::result(unsafe { libc::close(fd) }).map(drop)
    }
}

impl Read for ProcessStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// A launched child process.
///
/// Read its output through the [`Read`] impl until EOF, then call
/// [`ProcessHandle::reap`]. A handle dropped without reaping closes its
/// stream but leaves the child as a zombie.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Pid,
    stream: Option<ProcessStream>,
    status: Option<ExitStatus>,
    /// Set once `waitpid` has answered for this pid, even with ECHILD.
    collected: bool,
}

impl ProcessHandle {
    pub(crate) fn new(pid: Pid, stream: ProcessStream) -> Self {
        Self {
            pid,
            stream: Some(stream),
            status: None,
            collected: false,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Exit status, once reaped. Stays `None` if the child was collected
    /// elsewhere before `reap` got to it.
    pub fn status(&self) -> Option<ExitStatus> {
        self.status
    }

    /// True once the child no longer needs collecting.
    pub fn is_reaped(&self) -> bool {
        self.collected
    }

    /// Close the stream without waiting. Idempotent.
    pub fn close_stream(&mut self) -> Result<()> {
        match self.stream.take() {
            Some(stream) => stream.close().map_err(|source| ProcpipeError::StreamClose {
                pid: self.pid.as_raw(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Close the stream, then block until the child exits.
    ///
    /// `waitpid` is retried when interrupted by a signal. A second call on
    /// the same handle returns [`ProcpipeError::ChildStatusUnavailable`]
    /// without calling `waitpid` again, since the pid may already belong to
    /// an unrelated process.
    pub fn reap(&mut self) -> Result<ExitStatus> {
        if self.collected {
            return Err(ProcpipeError::ChildStatusUnavailable(self.pid.as_raw()));
        }

        // A failed close still releases the descriptor; the child must be
        // collected regardless.
        if let Err(err) = self.close_stream() {
            warn!(pid = self.pid.as_raw(), error = %err, "closing child stream");
        }

        let status = match wait_for_exit(self.pid) {
            Ok(status) => status,
            Err(err) => {
                if matches!(err, ProcpipeError::ChildStatusUnavailable(_)) {
                    self.collected = true;
                }
                return Err(err);
            }
        };
        self.status = Some(status);
        self.collected = true;

        info!(pid = self.pid.as_raw(), %status, "reaped child process");
        Ok(status)
    }
}

impl Read for ProcessHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(buf),
            None => Err(io::Error::other("process stream is closed")),
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.collected {
            warn!(
                pid = self.pid.as_raw(),
                "dropping handle of unreaped child; it stays a zombie until collected"
            );
        }
    }
}

/// Block until `pid` terminates.
pub(crate) fn wait_for_exit(pid: Pid) -> Result<ExitStatus> {
    wait_retrying(pid, || waitpid(pid, None))
}

fn wait_retrying<F>(pid: Pid, mut wait: F) -> Result<ExitStatus>
where
    F: FnMut() -> nix::Result<WaitStatus>,
{
    loop {
        match wait() {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ExitStatus::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, core_dumped)) => {
                return Ok(ExitStatus::Signaled {
                    signal,
                    core_dumped,
                });
            }
            Ok(other) => {
                return Err(ProcpipeError::UnexpectedStatus {
                    pid: pid.as_raw(),
                    status: format!("{other:?}"),
                });
            }
            Err(Errno::EINTR) => {
                trace!(pid = pid.as_raw(), "waitpid interrupted, retrying");
            }
            Err(Errno::ECHILD) => {
                return Err(ProcpipeError::ChildStatusUnavailable(pid.as_raw()));
            }
            Err(source) => {
                return Err(ProcpipeError::WaitFailed {
                    pid: pid.as_raw(),
                    source,
                });
            }
        }
    }
}
