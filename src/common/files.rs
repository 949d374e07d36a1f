//! Directory mirroring for work-directory preparation.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copy every file and directory under `src` into `dst`, overwriting files
/// that already exist. Symlinks are recreated, not followed. Returns the
/// number of files copied.
pub fn mirror_dir(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        bail!("{} is not a directory", src.display());
    }

    let mut copied = 0;
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.with_context(|| format!("walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .context("walkdir yielded a path outside its root")?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).with_context(|| format!("create {}", target.display()))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())?;
            if target.symlink_metadata().is_ok() {
                fs::remove_file(&target)?;
            }
            std::os::unix::fs::symlink(&link, &target)
                .with_context(|| format!("link {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} -> {}", entry.path().display(), target.display())
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
