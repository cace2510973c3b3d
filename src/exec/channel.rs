// src/exec/channel.rs

//! Pipe creation for a single launch.

use std::os::fd::{AsRawFd, OwnedFd};

use tracing::{trace, warn};

use crate::errors::{ProcpipeError, Result};

/// Both ends of a freshly created pipe.
///
/// Each end is an [`OwnedFd`], so whichever side of the fork drops it closes
/// it exactly once. Both ends are close-on-exec: the only descriptor the
/// exec'd program inherits is the `dup2` copy on its stdout.
#[derive(Debug)]
pub struct Channel {
    /// Read end, kept by the parent.
    pub read: OwnedFd,
    /// Write end, handed to the child.
    pub write: OwnedFd,
}

impl Channel {
    /// Create a connected pair or fail without leaving anything open.
    pub fn new() -> Result<Self> {
        let (read, write) = create_pipe().map_err(|err| {
            warn!(error = %err, "failed to create pipe");
            ProcpipeError::ChannelCreation(err)
        })?;

        trace!(
            read_fd = read.as_raw_fd(),
            write_fd = write.as_raw_fd(),
            "created channel"
        );

        Ok(Self { read, write })
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn create_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn create_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::{FcntlArg, FdFlag, fcntl};

    // No pipe2 here; there is a window where another thread's fork can
    // inherit these before the flag is set.
    let (read, write) = nix::unistd::pipe()?;
    fcntl(&read, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    fcntl(&write, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok((read, write))
}
