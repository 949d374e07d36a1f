//! Preflight command - runs preflight checks.

use anyhow::Result;
use std::path::Path;

use crate::compat::CompatibilityChecker;
use crate::config::Config;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(project_dir: &Path, strict: bool, config: &Config, checker: &CompatibilityChecker) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(project_dir, config, checker)?;
    } else {
        let report = preflight::run_preflight(project_dir, config, checker);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail with exit code 1.");
        }
    }
    Ok(())
}
