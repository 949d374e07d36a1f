//! Preflight checks.
//!
//! Validates the host toolchain, the project layout and host compatibility
//! before a build. Run with `hackeros-builder preflight`.

mod environment;
mod host_tools;
mod types;

use std::path::Path;

use anyhow::{bail, Result};

use crate::compat::CompatibilityChecker;
use crate::config::Config;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(project_dir: &Path, config: &Config, checker: &CompatibilityChecker) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.extend(host_tools::check_host_tools(config));

    println!("Checking project...");
    checks.extend(environment::check_project(project_dir));

    println!("Checking host compatibility...");
    checks.extend(environment::check_compatibility(checker));
    checks.extend(environment::check_disk_space(&config.build_dir));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(project_dir: &Path, config: &Config, checker: &CompatibilityChecker) -> Result<()> {
    let report = run_preflight(project_dir, config, checker);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before building.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
