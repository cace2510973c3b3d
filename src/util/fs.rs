// src/util/fs.rs

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::unistd::{AccessFlags, access};
use tracing::{debug, warn};

/// Fully resolved target of `path`, following every symlink.
pub fn link_target(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

/// Resolve a symlink's raw target against the link's own location.
///
/// Absolute targets are returned unchanged. Relative ones are joined onto
/// the directory containing `link_path` and canonicalized, so the result
/// only exists if the target does.
pub fn absolute_link_target(target: &Path, link_path: &Path) -> Option<PathBuf> {
    if target.as_os_str().is_empty() || link_path.as_os_str().is_empty() {
        return None;
    }
    if target.is_absolute() {
        return Some(target.to_path_buf());
    }

    let base = link_path.parent().unwrap_or_else(|| Path::new("."));
    fs::canonicalize(base.join(target)).ok()
}

/// True if `path` exists and is readable.
///
/// A missing file is an expected outcome; any other access failure is
/// logged.
pub fn file_exists(path: &Path) -> bool {
    match access(path, AccessFlags::R_OK) {
        Ok(()) => true,
        Err(Errno::ENOENT) => false,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to access file");
            false
        }
    }
}

/// First line of `path` that starts with `prefix`.
pub fn first_line_starting_with(path: &Path, prefix: &str) -> Option<String> {
    if !file_exists(path) {
        return None;
    }

    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "opening file");
            return None;
        }
    };

    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .find(|line| line.starts_with(prefix))
}

/// First `root/name` that can be opened for reading.
///
/// Opened non-blocking so that FIFOs and device nodes do not hang the probe.
pub fn first_openable<I, S>(root: &Path, names: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().find_map(|name| {
        let candidate = root.join(name.as_ref().trim_start_matches('/'));
        OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&candidate)
            .ok()
            .map(|_| candidate)
    })
}
