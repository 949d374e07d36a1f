//! Build command - builds an image from the project's build descriptor.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::mirror_dir;
use crate::compat::CompatibilityChecker;
use crate::config::Config;
use crate::descriptor::{self, CONFIG_DIR};
use crate::orchestrator::{BuildContext, Orchestrator};

/// Flags for the build command.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Build trixie regardless of the descriptor.
    pub stable: bool,
    /// Build in the project directory instead of the configured work dir.
    pub here: bool,
}

/// Execute the build command.
pub fn cmd_build(
    project_dir: &Path,
    options: BuildOptions,
    config: &Config,
    checker: CompatibilityChecker,
) -> Result<()> {
    println!("=== HackerOS Image Build ===\n");

    let track = descriptor::resolve(project_dir)?;

    let work_dir = if options.here {
        project_dir.to_path_buf()
    } else {
        config.build_dir.clone()
    };
    let mut ctx = BuildContext::new(work_dir, track);
    ctx.stable = options.stable;
    ctx.here = options.here;

    let mut orchestrator = Orchestrator::from_config(config, checker);
    orchestrator.check_host(&ctx)?;

    if !options.here {
        prepare_work_dir(project_dir, &ctx.work_dir)?;
    }

    super::run_build(&mut orchestrator, &ctx, config)
}

/// Create `work_dir` and mirror the project's `config/` into it.
pub fn prepare_work_dir(project_dir: &Path, work_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(work_dir)
        .with_context(|| format!("Cannot create work directory {}", work_dir.display()))?;

    let src = project_dir.join(CONFIG_DIR);
    let dst = work_dir.join(CONFIG_DIR);
    if same_dir(&src, &dst) {
        println!("[SKIP] Work directory is the project directory");
        return Ok(dst);
    }

    println!("Copying {} -> {}", src.display(), dst.display());
    let copied = mirror_dir(&src, &dst)?;
    println!("  {} file(s) copied", copied);
    Ok(dst)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
