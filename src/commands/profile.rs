//! Profile command - builds a rolling image from `*.profile` files.

use anyhow::{bail, Result};
use std::path::Path;

use crate::compat::CompatibilityChecker;
use crate::config::Config;
use crate::orchestrator::{BuildContext, Orchestrator};
use crate::profile;
use crate::track::Track;

/// Execute the profile command in `build_dir`.
pub fn cmd_profile(build_dir: &Path, config: &Config, checker: CompatibilityChecker) -> Result<()> {
    println!("=== HackerOS Profile Build ===\n");

    let mut ctx = BuildContext::new(build_dir.to_path_buf(), Track::Rolling);
    ctx.here = true;
    ctx.profile_mode = true;

    let mut orchestrator = Orchestrator::from_config(config, checker);
    orchestrator.check_host(&ctx)?;

    println!("Translating profiles...");
    let report = profile::translate(build_dir)?;
    report.print();
    if !report.is_clean() {
        bail!(
            "{} profile(s) could not be translated, nothing was built",
            report.failures.len()
        );
    }
    ctx.bootappend = report.bootappend;
    println!();

    super::run_build(&mut orchestrator, &ctx, config)
}
