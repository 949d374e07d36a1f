//! hackeros-builder - HackerOS live ISO builder.
//!
//! Drives live-build (`lb`) to produce a bootable hybrid ISO:
//! - `build`: track from `build.json`, config overlay from `config/`
//! - `profile`: package lists translated from `*.profile` files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hackeros_builder::commands::{self, build::BuildOptions, show::ShowTarget};
use hackeros_builder::compat::CompatibilityChecker;
use hackeros_builder::config::Config;

#[derive(Parser)]
#[command(name = "hackeros-builder")]
#[command(about = "HackerOS live ISO builder")]
#[command(
    after_help = "QUICK START:\n  hackeros-builder preflight      Check host and project\n  hackeros-builder build          Build from build.json\n  hackeros-builder build --here   Build in the current directory\n  hackeros-builder profile        Build from *.profile files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an image from build.json and config/
    Build {
        /// Build Debian trixie (stable) regardless of build.json
        #[arg(long)]
        stable: bool,

        /// Build in the current directory instead of HACKEROS_BUILD_DIR
        #[arg(long)]
        here: bool,
    },

    /// Build a rolling (forky) image from *.profile files in the current directory
    Profile,

    /// Run preflight checks (host tools, project layout, compatibility)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowWhat,
    },
}

#[derive(Subcommand)]
enum ShowWhat {
    /// Show effective configuration
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show descriptor track and discovered profiles
    Project,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,lb=info")).init();

    let cli = Cli::parse();
    let project_dir = std::env::current_dir().context("Cannot determine current directory")?;
    let config = Config::load(&project_dir);
    let checker = CompatibilityChecker::default();

    match cli.command {
        Commands::Build { stable, here } => {
            commands::cmd_build(&project_dir, BuildOptions { stable, here }, &config, checker)?;
        }

        Commands::Profile => {
            commands::cmd_profile(&project_dir, &config, checker)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&project_dir, strict, &config, &checker)?;
        }

        Commands::Show { what } => {
            let target = match what {
                ShowWhat::Config { json } => ShowTarget::Config { json },
                ShowWhat::Project => ShowTarget::Project,
            };
            commands::cmd_show(&project_dir, target, &config)?;
        }
    }

    Ok(())
}
