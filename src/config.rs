//! Configuration management for hackeros-builder.
//!
//! Reads configuration from a `.env` file in the project directory and from
//! environment variables. Environment variables take precedence over `.env`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default live-build entry point.
pub const DEFAULT_LB: &str = "lb";

/// Default target architecture.
pub const DEFAULT_ARCH: &str = "amd64";

/// Builder configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Command used to run live-build: program followed by leading args
    /// (e.g. `["sudo", "lb"]`).
    pub lb_command: Vec<String>,
    /// Target architecture passed to `lb config --architectures`.
    pub arch: String,
    /// Work directory for `build` without `--here`.
    pub build_dir: PathBuf,
    /// Per-invocation timeout in seconds. `None` waits forever.
    pub step_timeout_secs: Option<u64>,
    /// Skip rename/move prompts after a build.
    pub non_interactive: bool,
}

impl Config {
    /// Load configuration from `<project_dir>/.env` and the environment.
    pub fn load(project_dir: &Path) -> Self {
        let env_path = project_dir.join(".env");
        if env_path.exists() {
            if let Err(e) = dotenvy::from_path(&env_path) {
                eprintln!("  [WARN] Ignoring {}: {}", env_path.display(), e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lb_command = lookup("HACKEROS_LB")
            .map(|s| s.split_whitespace().map(String::from).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_LB.to_string()]);

        let arch = lookup("HACKEROS_ARCH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ARCH.to_string());

        let build_dir = lookup("HACKEROS_BUILD_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_build_dir);

        let step_timeout_secs = lookup("HACKEROS_STEP_TIMEOUT")
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    eprintln!("  [WARN] HACKEROS_STEP_TIMEOUT='{}' is not a number, ignoring", s);
                    None
                }
            })
            .filter(|secs| *secs > 0);

        let non_interactive = lookup("HACKEROS_NONINTERACTIVE")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            lb_command,
            arch,
            build_dir,
            step_timeout_secs,
            non_interactive,
        }
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }

    /// Name live-build gives the hybrid ISO for this architecture.
    pub fn artifact_name(&self) -> String {
        format!("live-image-{}.hybrid.iso", self.arch)
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  HACKEROS_LB: {}", self.lb_command.join(" "));
        println!("  HACKEROS_ARCH: {}", self.arch);
        println!("  HACKEROS_BUILD_DIR: {}", self.build_dir.display());
        match self.step_timeout_secs {
            Some(secs) => println!("  HACKEROS_STEP_TIMEOUT: {}s", secs),
            None => println!("  HACKEROS_STEP_TIMEOUT: none"),
        }
        println!("  HACKEROS_NONINTERACTIVE: {}", self.non_interactive);
        println!("  Artifact: {}", self.artifact_name());
    }
}

fn default_build_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hackeros-builder/build")
}
