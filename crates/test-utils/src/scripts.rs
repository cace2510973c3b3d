use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Shell used to interpret test scripts.
pub const SHELL: &str = "/bin/sh";

/// A temporary directory of throwaway shell scripts.
///
/// Prefer [`ScriptDir::sh_command`] when a test only needs the script's
/// behaviour: it runs the script through `/bin/sh` instead of exec'ing the
/// freshly written file, which sidesteps `ETXTBSY` when another test thread
/// forks while the file is still open for writing.
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("creating script dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `body` as `name` with a `#!/bin/sh` line and mode 0755.
    pub fn script(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.write(name, &format!("#!{SHELL}\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", path.display()))?;
        Ok(path)
    }

    /// Write `contents` as `name` with mode 0644.
    pub fn plain_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.write(name, contents)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))
            .with_context(|| format!("chmod {}", path.display()))?;
        Ok(path)
    }

    /// Write `body` as `name` and return a command line running it with
    /// `/bin/sh`.
    pub fn sh_command(&self, name: &str, body: &str) -> Result<String> {
        let path = self.plain_file(name, &format!("{body}\n"))?;
        Ok(format!("{SHELL} {}", path.display()))
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
