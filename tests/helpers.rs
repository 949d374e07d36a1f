//! Shared test utilities for hackeros-builder tests.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use hackeros_builder::compat::{CompatibilityChecker, HostFiles};
use hackeros_builder::orchestrator::{LiveBuild, Orchestrator};

pub const ARTIFACT: &str = "live-image-amd64.hybrid.iso";

/// Temporary project with a fake `lb` and fake host identification files.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Build/work directory
    pub work_dir: PathBuf,
    /// Fake `lb` script
    pub lb: PathBuf,
    /// Every fake `lb` invocation, one line of args per call
    pub lb_log: PathBuf,
    pub host: HostFiles,
}

/// How the fake `lb` behaves.
#[derive(Default, Clone)]
pub struct FakeLb<'a> {
    /// `(subcommand, exit code)`: exit with this code when called with this subcommand.
    pub fail: Option<(&'a str, i32)>,
    /// Sleep this many seconds during `lb build`, in a forked child like real `lb` does.
    pub build_sleep: Option<u32>,
    /// Whether `lb build` leaves an image behind.
    pub produce_image: bool,
    /// Whether `lb clean` deletes the image, as `lb clean --purge` does.
    pub clean_removes_image: bool,
}

impl TestEnv {
    pub fn new(fake: FakeLb) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let work_dir = base.join("work");
        let bin_dir = base.join("bin");
        let host_dir = base.join("host");
        for dir in [&work_dir, &bin_dir, &host_dir] {
            fs::create_dir_all(dir).expect("Failed to create test dir");
        }

        let lb_log = base.join("lb.log");
        let lb = bin_dir.join("lb");
        write_executable(&lb, &fake_lb_script(&lb_log, &fake));

        Self {
            _temp_dir: temp_dir,
            work_dir,
            lb,
            lb_log,
            host: HostFiles {
                os_release: host_dir.join("os-release"),
                branding: host_dir.join("kcm-about-distrorc"),
            },
        }
    }

    /// Host reports the given Debian codename.
    pub fn with_codename(self, codename: &str) -> Self {
        fs::write(
            &self.host.os_release,
            format!("ID=debian\nVERSION_CODENAME={}\n", codename),
        )
        .expect("Failed to write os-release");
        self
    }

    pub fn checker(&self) -> CompatibilityChecker {
        CompatibilityChecker::new(self.host.clone())
    }

    pub fn orchestrator(&self, timeout: Option<std::time::Duration>) -> Orchestrator {
        let live_build = LiveBuild::new(&[self.lb.to_string_lossy().into_owned()], timeout);
        Orchestrator::new(live_build, self.checker(), "amd64", ARTIFACT)
    }

    /// Recorded `lb` calls, each as its argument string.
    pub fn lb_calls(&self) -> Vec<String> {
        fs::read_to_string(&self.lb_log)
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Subcommands `lb` was called with, in order.
    pub fn lb_subcommands(&self) -> Vec<String> {
        self.lb_calls()
            .iter()
            .filter_map(|c| c.split_whitespace().next().map(String::from))
            .collect()
    }
}

fn fake_lb_script(log: &Path, fake: &FakeLb) -> String {
    let mut script = format!("#!/bin/sh\necho \"$*\" >> '{}'\n", log.display());
    if let Some((sub, code)) = fake.fail {
        script.push_str(&format!("[ \"$1\" = '{}' ] && {{ echo \"E: {} broke\"; echo 'detail on stderr' >&2; exit {}; }}\n", sub, sub, code));
    }
    if let Some(secs) = fake.build_sleep {
        script.push_str(&format!("[ \"$1\" = build ] && {{ sleep {}; echo slept; }}\n", secs));
    }
    if fake.produce_image {
        script.push_str(&format!("[ \"$1\" = build ] && echo image > '{}'\n", ARTIFACT));
    }
    if fake.clean_removes_image {
        script.push_str(&format!("[ \"$1\" = clean ] && rm -f '{}'\n", ARTIFACT));
    }
    script.push_str("exit 0\n");
    script
}

/// Write a file and make it executable.
pub fn write_executable(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write script");
    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

/// Assert that a file has exactly the given content.
pub fn assert_file_content(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert_eq!(content, expected, "Unexpected content in {}", path.display());
}
