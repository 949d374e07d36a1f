//! Build descriptor loading.
//!
//! `build.json` is a JSON array whose first element names the version track:
//!
//! ```json
//! ["lts"]
//! ```
//!
//! It must sit next to a `config/` directory holding the live-build
//! configuration overlay.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::track::{Track, SUPPORTED_VERSIONS};

/// Descriptor file name, relative to the project directory.
pub const DESCRIPTOR_FILE: &str = "build.json";

/// Configuration directory, sibling of the descriptor.
pub const CONFIG_DIR: &str = "config";

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("build descriptor not found: {0}")]
    MissingDescriptor(PathBuf),

    #[error("configuration directory not found: {0}")]
    MissingConfigDir(PathBuf),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("build descriptor must be a list, found {0}")]
    NotAList(&'static str),

    #[error("build descriptor list is empty")]
    Empty,

    #[error("first descriptor entry must be a string, found {0}")]
    NotAString(&'static str),

    #[error("unsupported version '{value}' (supported: {})", SUPPORTED_VERSIONS.join(", "))]
    UnsupportedVersion { value: String },
}

/// A validated build descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    /// Version string exactly as written.
    pub version: String,
}

impl BuildDescriptor {
    /// Validate the shape of a decoded document.
    pub fn from_value(value: &Value) -> Result<Self, DescriptorError> {
        let entries = value
            .as_array()
            .ok_or_else(|| DescriptorError::NotAList(kind(value)))?;
        let first = entries.first().ok_or(DescriptorError::Empty)?;
        let version = first
            .as_str()
            .ok_or_else(|| DescriptorError::NotAString(kind(first)))?;
        Ok(Self {
            version: version.to_string(),
        })
    }

    /// Map the version string onto a track.
    pub fn track(&self) -> Result<Track, DescriptorError> {
        Track::from_version(&self.version).ok_or_else(|| DescriptorError::UnsupportedVersion {
            value: self.version.clone(),
        })
    }
}

/// Parse descriptor text.
pub fn parse(path: &Path, content: &str) -> Result<BuildDescriptor, DescriptorError> {
    let value: Value = serde_json::from_str(content).map_err(|source| DescriptorError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    BuildDescriptor::from_value(&value)
}

/// Load and validate the descriptor under `project_dir`, returning its track.
pub fn resolve(project_dir: &Path) -> Result<Track, DescriptorError> {
    let path = project_dir.join(DESCRIPTOR_FILE);
    let config_dir = project_dir.join(CONFIG_DIR);

    if !path.is_file() {
        return Err(DescriptorError::MissingDescriptor(path));
    }
    if !config_dir.is_dir() {
        return Err(DescriptorError::MissingConfigDir(config_dir));
    }

    let content = fs::read_to_string(&path).map_err(|source| DescriptorError::Read {
        path: path.clone(),
        source,
    })?;
    let track = parse(&path, &content)?.track()?;
    log::info!("{} selects {}", path.display(), track);
    Ok(track)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
