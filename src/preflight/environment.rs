//! Project and host environment checks.

use std::path::Path;

use crate::compat::CompatibilityChecker;
use crate::descriptor::{self, CONFIG_DIR, DESCRIPTOR_FILE};
use crate::process::Cmd;
use crate::profile;
use crate::track::Track;

use super::types::CheckResult;

/// Free space below which a warning is raised. A full desktop image build
/// needs roughly 15GB of chroot, cache and binary tree.
const MIN_FREE_GB: u64 = 20;

/// Check the descriptor, config directory, and profiles in `project_dir`.
pub fn check_project(project_dir: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match descriptor::resolve(project_dir) {
        Ok(track) => results.push(CheckResult::pass_with(DESCRIPTOR_FILE, &track.to_string())),
        Err(e) => results.push(CheckResult::fail(DESCRIPTOR_FILE, &e.to_string())),
    }

    if project_dir.join(CONFIG_DIR).is_dir() {
        results.push(CheckResult::pass(&format!("{}/", CONFIG_DIR)));
    }

    match profile::discover(project_dir) {
        Ok(found) if found.is_empty() => {}
        Ok(found) => results.push(CheckResult::pass_with(
            "profiles",
            &format!("{} *.{} file(s)", found.len(), profile::PROFILE_EXTENSION),
        )),
        Err(e) => results.push(CheckResult::warn("profiles", &e.to_string())),
    }

    results
}

/// Report which tracks this host may build. Failing both is fatal.
pub fn check_compatibility(checker: &CompatibilityChecker) -> Vec<CheckResult> {
    let tracks = [Track::Stable, Track::Rolling];
    let compatible: Vec<Track> = tracks
        .into_iter()
        .filter(|t| checker.is_compatible(*t))
        .collect();

    tracks
        .into_iter()
        .map(|track| {
            let name = format!("host: {}", track);
            if compatible.contains(&track) {
                CheckResult::pass(&name)
            } else if compatible.is_empty() {
                CheckResult::fail(&name, &incompatible_detail(checker, track))
            } else {
                CheckResult::warn(&name, &incompatible_detail(checker, track))
            }
        })
        .collect()
}

fn incompatible_detail(checker: &CompatibilityChecker, track: Track) -> String {
    format!(
        "{} lacks VERSION_CODENAME={} and {} has no matching Variant",
        checker.files().os_release.display(),
        track.codename(),
        checker.files().branding.display()
    )
}

/// Warn when the filesystem holding `dir` is short on space.
pub fn check_disk_space(dir: &Path) -> Option<CheckResult> {
    // Walk up to an existing ancestor; the work dir may not exist yet.
    let existing = dir.ancestors().find(|p| p.exists())?;

    let result = Cmd::new("df")
        .args(["--output=avail", "-B1"])
        .arg_path(existing)
        .allow_fail()
        .run()
        .ok()?;
    if !result.success() {
        return None;
    }

    let avail_bytes: u64 = result.stdout.lines().nth(1)?.trim().parse().ok()?;
    let free_gb = avail_bytes / (1024 * 1024 * 1024);
    let name = format!("disk space ({})", existing.display());
    Some(if free_gb < MIN_FREE_GB {
        CheckResult::warn(&name, &format!("{}GB free - build needs ~15GB", free_gb))
    } else {
        CheckResult::pass_with(&name, &format!("{}GB free", free_gb))
    })
}
