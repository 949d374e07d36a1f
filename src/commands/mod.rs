//! CLI command handlers.
//!
//! - `build` - Build an image from `build.json`
//! - `profile` - Build an image from `*.profile` files in the current directory
//! - `preflight` - Run preflight checks
//! - `show` - Display information

pub mod build;
mod preflight;
pub mod profile;
pub mod show;

pub use build::cmd_build;
pub use preflight::cmd_preflight;
pub use profile::cmd_profile;
pub use show::cmd_show;

use anyhow::Result;
use std::time::Duration;

use crate::artifact::prompt;
use crate::config::Config;
use crate::orchestrator::{BuildContext, Orchestrator};
use crate::timing::format_duration;

/// Run the orchestrator for `ctx` and print a summary.
fn run_build(orchestrator: &mut Orchestrator, ctx: &BuildContext, config: &Config) -> Result<()> {
    let mut prompter = prompt::for_session(config.non_interactive);
    let summary = orchestrator.run(ctx, &mut *prompter)?;

    let total: Duration = summary.elapsed.iter().map(|(_, d)| *d).sum();
    println!("\n=== Build complete ({}) ===", format_duration(total));
    match &summary.finalized.image {
        Some(image) => println!("  Image: {}", image.display()),
        None => println!("  [WARN] No image kept, see warnings above"),
    }
    if !summary.finalized.warnings.is_empty() {
        println!("  {} warning(s), see above", summary.finalized.warnings.len());
    }
    Ok(())
}
