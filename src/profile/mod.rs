//! Profile translation.
//!
//! A profile is an ini file (`*.profile`) in the build directory:
//!
//! ```ini
//! [packages]
//! desktop = kde-plasma-desktop
//! tools = nmap, wireshark
//!
//! [bootappend]
//! parameters = quiet splash
//! ```
//!
//! Each profile becomes `config/package-lists/<name>.list.chroot`. Boot
//! parameters are collected and handed to `lb config` as
//! `--bootappend-live`. Unknown sections are ignored.

pub mod ini;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use ini::IniError;

/// Extension that marks a profile file.
pub const PROFILE_EXTENSION: &str = "profile";

/// Where package lists go, relative to the build directory.
pub const PACKAGE_LIST_DIR: &str = "config/package-lists";

/// Suffix live-build expects for lists installed into the chroot.
pub const PACKAGE_LIST_SUFFIX: &str = ".list.chroot";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: IniError,
    },

    #[error("cannot derive a profile name from {0}")]
    Name(PathBuf),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parsed profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Package names in document order, empty values removed.
    pub packages: Vec<String>,
    /// `[bootappend] parameters`, if set and non-empty.
    pub bootappend: Option<String>,
}

impl Profile {
    /// Parse profile text. `name` is the file stem.
    pub fn parse(name: &str, content: &str) -> Result<Self, IniError> {
        let doc = ini::parse(content)?;

        let packages = doc
            .section("packages")
            .map(|s| {
                s.entries
                    .iter()
                    .flat_map(|(_, value)| value.split(','))
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let bootappend = doc
            .section("bootappend")
            .and_then(|s| s.get("parameters"))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);

        Ok(Self {
            name: name.to_string(),
            packages,
            bootappend,
        })
    }

    /// Package list file contents: one package per line.
    pub fn package_list(&self) -> String {
        self.packages.join("\n")
    }
}

/// Outcome of translating every profile in a directory.
#[derive(Debug, Default)]
pub struct TranslationReport {
    /// Profiles that were processed, in file-name order.
    pub profiles: Vec<String>,
    /// Package list files written.
    pub written: Vec<PathBuf>,
    /// Boot parameters from all profiles, space-joined in file-name order.
    pub bootappend: Option<String>,
    /// Files that could not be translated.
    pub failures: Vec<ProfileError>,
}

impl TranslationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn print(&self) {
        if self.profiles.is_empty() && self.failures.is_empty() {
            println!("  No *.{} files found", PROFILE_EXTENSION);
            return;
        }
        for name in &self.profiles {
            println!("  ✓ {}", name);
        }
        for path in &self.written {
            println!("    Wrote: {}", path.display());
        }
        if let Some(params) = &self.bootappend {
            println!("  Boot parameters: {}", params);
        }
        for failure in &self.failures {
            println!("  ✗ {}", failure);
        }
    }
}

/// Find profile files directly inside `dir`, sorted by file name.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, ProfileError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ProfileError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == PROFILE_EXTENSION)
        {
            found.push(path.to_path_buf());
        }
    }
    Ok(found)
}

/// Translate every profile in `build_dir` into package lists.
///
/// A file that fails is recorded in the report and the scan continues.
/// Returns an error only if the directory itself can't be scanned.
pub fn translate(build_dir: &Path) -> Result<TranslationReport, ProfileError> {
    let mut report = TranslationReport::default();
    let mut params = Vec::new();

    for path in discover(build_dir)? {
        match translate_file(build_dir, &path) {
            Ok((profile, written)) => {
                log::debug!("translated {} ({} packages)", path.display(), profile.packages.len());
                report.written.extend(written);
                params.extend(profile.bootappend);
                report.profiles.push(profile.name);
            }
            Err(e) => {
                log::warn!("{}", e);
                report.failures.push(e);
            }
        }
    }

    if !params.is_empty() {
        report.bootappend = Some(params.join(" "));
    }
    Ok(report)
}

fn translate_file(build_dir: &Path, path: &Path) -> Result<(Profile, Option<PathBuf>), ProfileError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProfileError::Name(path.to_path_buf()))?;

    let content = fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let profile = Profile::parse(name, &content).map_err(|source| ProfileError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;

    let list_dir = build_dir.join(PACKAGE_LIST_DIR);
    fs::create_dir_all(&list_dir).map_err(|source| ProfileError::Write {
        path: list_dir.clone(),
        source,
    })?;

    if profile.packages.is_empty() {
        return Ok((profile, None));
    }

    let list_path = list_dir.join(format!("{}{}", profile.name, PACKAGE_LIST_SUFFIX));
    fs::write(&list_path, profile.package_list()).map_err(|source| ProfileError::Write {
        path: list_path.clone(),
        source,
    })?;
    Ok((profile, Some(list_path)))
}
