//! Scoped change of the process working directory.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Switches the process into a directory and switches back on drop.
///
/// The working directory is process-global; hold at most one guard at a time.
pub struct WorkdirGuard {
    previous: PathBuf,
    current: PathBuf,
}

impl WorkdirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        let current = dir.canonicalize()?;
        env::set_current_dir(&current)?;
        log::debug!("cwd: {} -> {}", previous.display(), current.display());
        Ok(Self { previous, current })
    }

    /// Absolute path of the directory entered.
    pub fn path(&self) -> &Path {
        &self.current
    }

    /// Directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        match env::set_current_dir(&self.previous) {
            Ok(()) => log::debug!("cwd restored: {}", self.previous.display()),
            Err(e) => eprintln!(
                "  [WARN] Could not return to {}: {}",
                self.previous.display(),
                e
            ),
        }
    }
}
