//! Host compatibility checks.
//!
//! A host may build a track if `/etc/os-release` names the track's codename,
//! or failing that, if the desktop branding file declares one of the track's
//! edition variants. Missing or unreadable files count as "no match".

use std::fs;
use std::path::{Path, PathBuf};

use crate::track::Track;

/// Standard OS identification file.
pub const OS_RELEASE: &str = "/etc/os-release";

/// KDE "About this system" branding, carries the `Variant=` edition name.
pub const BRANDING_FILE: &str = "/etc/xdg/kcm-about-distrorc";

/// Locations of the host identification files.
#[derive(Debug, Clone)]
pub struct HostFiles {
    pub os_release: PathBuf,
    pub branding: PathBuf,
}

impl Default for HostFiles {
    fn default() -> Self {
        Self {
            os_release: PathBuf::from(OS_RELEASE),
            branding: PathBuf::from(BRANDING_FILE),
        }
    }
}

/// Decides which tracks the current host may build.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityChecker {
    files: HostFiles,
}

impl CompatibilityChecker {
    pub fn new(files: HostFiles) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &HostFiles {
        &self.files
    }

    /// True if this host may build `track`.
    pub fn is_compatible(&self, track: Track) -> bool {
        if has_codename(&self.files.os_release, track.codename()) {
            log::debug!("{} names codename {}", self.files.os_release.display(), track.codename());
            return true;
        }

        match read_variant(&self.files.branding) {
            Some(variant) => {
                let allowed = track.allowed_variants().contains(&variant.as_str());
                log::debug!("branding variant '{}' allowed for {}: {}", variant, track, allowed);
                allowed
            }
            None => false,
        }
    }
}

/// Check os-release for an exact `VERSION_CODENAME=<codename>` entry.
fn has_codename(os_release: &Path, codename: &str) -> bool {
    let Ok(content) = fs::read_to_string(os_release) else {
        return false;
    };
    content
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .any(|(key, value)| key.trim() == "VERSION_CODENAME" && unquote(value) == codename)
}

/// Read the `Variant` value from the branding file. Section headers are
/// skipped; the first `Variant=` line wins.
fn read_variant(branding: &Path) -> Option<String> {
    let content = fs::read_to_string(branding).ok()?;
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('[') && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "Variant")
        .map(|(_, value)| unquote(value).to_string())
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}
