//! Distribution tracks and the Debian codenames they build against.

use serde::Serialize;
use std::fmt;

/// Codename used for the Stable track.
pub const STABLE_CODENAME: &str = "trixie";

/// Codename used for the Rolling track.
pub const ROLLING_CODENAME: &str = "forky";

/// Version strings accepted in the build descriptor, in display order.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["lts", "normal"];

/// Which Debian base an image is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// `lts` in the descriptor, Debian trixie.
    Stable,
    /// `normal` in the descriptor, Debian forky.
    Rolling,
}

impl Track {
    /// Map a descriptor version string (case-insensitive) to a track.
    pub fn from_version(version: &str) -> Option<Self> {
        match version.to_ascii_lowercase().as_str() {
            "lts" => Some(Self::Stable),
            "normal" => Some(Self::Rolling),
            _ => None,
        }
    }

    pub fn codename(self) -> &'static str {
        match self {
            Self::Stable => STABLE_CODENAME,
            Self::Rolling => ROLLING_CODENAME,
        }
    }

    /// Branding variants that may build this track when the host codename
    /// doesn't match.
    pub fn allowed_variants(self) -> &'static [&'static str] {
        match self {
            Self::Stable => &["LTS Edition", "Cybersecurity Edition"],
            Self::Rolling => &[
                "Official Edition",
                "Hydra Edition",
                "Gnome Edition",
                "Xfce Edition",
                "Gaming Edition",
            ],
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable ({})", STABLE_CODENAME),
            Self::Rolling => write!(f, "rolling ({})", ROLLING_CODENAME),
        }
    }
}
