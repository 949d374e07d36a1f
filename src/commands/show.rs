//! Show command - displays information.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::descriptor;
use crate::profile;

/// Show target for the show command.
pub enum ShowTarget {
    /// Effective configuration
    Config { json: bool },
    /// Descriptor track and discovered profiles
    Project,
}

/// Execute the show command.
pub fn cmd_show(project_dir: &Path, target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config { json: true } => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ShowTarget::Config { json: false } => config.print(),
        ShowTarget::Project => {
            println!("Project: {}", project_dir.display());
            match descriptor::resolve(project_dir) {
                Ok(track) => println!("  Track: {}", track),
                Err(e) => println!("  Track: unavailable ({})", e),
            }
            let profiles = profile::discover(project_dir)?;
            if profiles.is_empty() {
                println!("  Profiles: none");
            }
            for path in profiles {
                println!("  Profile: {}", path.display());
            }
        }
    }
    Ok(())
}
