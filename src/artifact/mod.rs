//! Post-build artifact handling: optional rename, optional move, checksum.
//!
//! Nothing here fails the build. Problems come back as [`FinalizeWarning`]s
//! and the image stays wherever it last landed successfully.

pub mod checksum;
pub mod prompt;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use prompt::{NoPrompt, Prompter, ScriptedPrompter, TerminalPrompter};

pub const RENAME_QUESTION: &str = "New image name (empty keeps the current name):";
pub const MOVE_QUESTION: &str = "Move image to directory (empty leaves it here):";

#[derive(Debug, Error)]
pub enum FinalizeWarning {
    #[error("image not found: {0}")]
    Missing(PathBuf),

    #[error("could not read answer: {0}")]
    Prompt(#[source] io::Error),

    #[error("'{0}' is not a valid file name")]
    InvalidName(String),

    #[error("{0} already exists, not overwriting")]
    Exists(PathBuf),

    #[error("rename to {to} failed: {source}")]
    Rename {
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("move to {to} failed: {source}")]
    Move {
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checksum failed: {0:#}")]
    Checksum(anyhow::Error),

    #[error("{0} was removed by the final clean; answer the move question to keep the image")]
    Removed(PathBuf),
}

/// What happened to the image.
#[derive(Debug, Default)]
pub struct Finalized {
    /// Final location of the image, if it existed.
    pub image: Option<PathBuf>,
    pub checksum: Option<PathBuf>,
    pub warnings: Vec<FinalizeWarning>,
}

impl Finalized {
    fn warn(&mut self, warning: FinalizeWarning) {
        eprintln!("  [WARN] {}", warning);
        self.warnings.push(warning);
    }

    /// Forget the image if something deleted it since finalizing, along with
    /// its now orphaned checksum file.
    pub fn confirm_present(&mut self) {
        if !self.image.as_ref().is_some_and(|image| !image.is_file()) {
            return;
        }
        if let Some(checksum) = self.checksum.take() {
            if let Err(e) = fs::remove_file(&checksum) {
                log::debug!("cannot remove {}: {}", checksum.display(), e);
            }
        }
        if let Some(image) = self.image.take() {
            self.warn(FinalizeWarning::Removed(image));
        }
    }
}

/// Locate `<work_dir>/<artifact_name>`, then offer to rename and move it.
///
/// Relative move destinations are taken relative to `origin`, the directory
/// the user started from, not the work directory.
pub fn finalize(
    work_dir: &Path,
    artifact_name: &str,
    origin: &Path,
    prompter: &mut dyn Prompter,
) -> Finalized {
    let mut out = Finalized::default();
    let mut image = work_dir.join(artifact_name);

    if !image.is_file() {
        out.warn(FinalizeWarning::Missing(image));
        return out;
    }
    println!("  Image: {}", image.display());

    match prompter.ask(RENAME_QUESTION) {
        Ok(answer) if answer.is_empty() => {}
        Ok(answer) => match rename(&image, &answer) {
            Ok(renamed) => {
                println!("  Renamed to {}", renamed.display());
                image = renamed;
            }
            Err(w) => out.warn(w),
        },
        Err(e) => out.warn(FinalizeWarning::Prompt(e)),
    }

    match prompter.ask(MOVE_QUESTION) {
        Ok(answer) if answer.is_empty() => {}
        Ok(answer) => match relocate(&image, &destination(&answer, origin)) {
            Ok(moved) => {
                println!("  Moved to {}", moved.display());
                image = moved;
            }
            Err(w) => out.warn(w),
        },
        Err(e) => out.warn(FinalizeWarning::Prompt(e)),
    }

    match checksum::write_checksum(&image) {
        Ok(path) => out.checksum = Some(path),
        Err(e) => out.warn(FinalizeWarning::Checksum(e)),
    }

    out.image = Some(image);
    out
}

/// Rename within the same directory. A name without extension inherits
/// the image's extension.
pub fn rename(image: &Path, new_name: &str) -> Result<PathBuf, FinalizeWarning> {
    let candidate = Path::new(new_name);
    if new_name.contains('/') || candidate.file_name().is_none() || new_name == "." {
        return Err(FinalizeWarning::InvalidName(new_name.to_string()));
    }

    let mut name = new_name.to_string();
    if candidate.extension().is_none() {
        if let Some(ext) = image.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
    }

    let target = image.with_file_name(name);
    if target == image {
        return Ok(target);
    }
    if target.exists() {
        return Err(FinalizeWarning::Exists(target));
    }
    fs::rename(image, &target).map_err(|source| FinalizeWarning::Rename {
        to: target.clone(),
        source,
    })?;
    Ok(target)
}

/// Move into `dest_dir`, creating it. Falls back to copy + remove when a
/// plain rename can't cross filesystems.
pub fn relocate(image: &Path, dest_dir: &Path) -> Result<PathBuf, FinalizeWarning> {
    let Some(file_name) = image.file_name() else {
        return Err(FinalizeWarning::InvalidName(image.display().to_string()));
    };
    let target = dest_dir.join(file_name);
    if target == image {
        return Ok(target);
    }
    if target.exists() {
        return Err(FinalizeWarning::Exists(target));
    }

    let move_err = |source| FinalizeWarning::Move {
        to: target.clone(),
        source,
    };
    fs::create_dir_all(dest_dir).map_err(move_err)?;

    if let Err(e) = fs::rename(image, &target) {
        log::debug!("rename failed ({}), copying instead", e);
        fs::copy(image, &target).map_err(move_err)?;
        fs::remove_file(image).map_err(move_err)?;
    }
    Ok(target)
}

/// Expand `~` and anchor relative answers at `origin`.
fn destination(answer: &str, origin: &Path) -> PathBuf {
    let path = match (answer.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if answer == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(answer)),
        _ => PathBuf::from(answer),
    };
    if path.is_absolute() {
        path
    } else {
        origin.join(path)
    }
}
