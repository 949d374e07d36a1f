//! Build orchestration.
//!
//! A run walks a fixed sequence of live-build invocations inside the work
//! directory:
//!
//! ```text
//! Idle -> Cleaning -> Configuring -> Building -> Finalizing -> Done
//!            \            \             \            \
//!             `------------`-------------`------------`--> Failed
//! ```
//!
//! Host compatibility is checked before leaving `Idle`; an incompatible host
//! never starts a run. Any failing invocation stops forward progress. There
//! is no retry.

pub mod live_build;
pub mod workdir;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::artifact::{self, Finalized, Prompter};
use crate::compat::CompatibilityChecker;
use crate::config::Config;
use crate::process::Cmd;
use crate::timing::Timer;
use crate::track::{Track, STABLE_CODENAME};

pub use live_build::{ConfigureOptions, LiveBuild};
pub use workdir::WorkdirGuard;

/// Everything one run needs to know. Built per invocation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub work_dir: PathBuf,
    /// Track resolved from the descriptor (or implied by the command).
    pub track: Track,
    /// `--stable`: build trixie regardless of the resolved track.
    pub stable: bool,
    /// `--here`: the project directory is the work directory.
    pub here: bool,
    /// Package lists come from `*.profile` files.
    pub profile_mode: bool,
    /// Boot parameters surfaced by profile translation.
    pub bootappend: Option<String>,
}

impl BuildContext {
    pub fn new(work_dir: PathBuf, track: Track) -> Self {
        Self {
            work_dir,
            track,
            stable: false,
            here: false,
            profile_mode: false,
            bootappend: None,
        }
    }

    /// Track after applying `--stable`.
    pub fn effective_track(&self) -> Track {
        if self.stable {
            Track::Stable
        } else {
            self.track
        }
    }

    /// One-line description for the run banner.
    pub fn describe(&self, arch: &str) -> String {
        let place = if self.here { "in place" } else { "in work dir" };
        let source = if self.profile_mode {
            "package lists from *.profile"
        } else {
            "config/ from project"
        };
        format!(
            "{} ({}), {}, {}",
            self.effective_track(),
            arch,
            source,
            place
        )
    }

    /// Codename handed to `lb config --distribution`.
    pub fn codename(&self) -> &'static str {
        if self.stable {
            STABLE_CODENAME
        } else {
            self.track.codename()
        }
    }
}

/// Invocation phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Cleaning,
    Configuring,
    Building,
    Finalizing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cleaning => "clean",
            Self::Configuring => "configure",
            Self::Building => "build",
            Self::Finalizing => "final clean",
        };
        f.write_str(name)
    }
}

/// Orchestrator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Cleaning,
    Configuring,
    Building,
    Finalizing,
    Done,
    Failed(Failure),
}

impl From<Phase> for State {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Cleaning => Self::Cleaning,
            Phase::Configuring => Self::Configuring,
            Phase::Building => Self::Building,
            Phase::Finalizing => Self::Finalizing,
        }
    }
}

/// Why an invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Non-zero exit. `output` is stdout then stderr, verbatim.
    Exit { code: i32, output: String },
    /// Killed after exceeding the configured step timeout.
    Timeout { after: Duration },
    /// The program could not be started at all.
    Spawn(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit { code, output } if output.is_empty() => {
                write!(f, "exit code {}", code)
            }
            Self::Exit { code, output } => write!(f, "exit code {}:\n{}", code, output),
            Self::Timeout { after } => write!(f, "timed out after {}s", after.as_secs()),
            Self::Spawn(msg) => f.write_str(msg),
        }
    }
}

/// A failed invocation, recorded in [`State::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase} step failed running `{command}`: {reason}")]
pub struct Failure {
    pub phase: Phase,
    pub command: String,
    pub reason: FailureReason,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(
        "this host cannot build the {track} track: os-release does not name {} \
         and the edition variant is not one of: {}",
        .track.codename(),
        .track.allowed_variants().join(", ")
    )]
    Incompatible { track: Track },

    #[error("cannot enter work directory {path}: {source}")]
    Workdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Step(#[from] Failure),
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub finalized: Finalized,
    pub elapsed: Vec<(Phase, Duration)>,
}

/// Drives live-build through one run.
pub struct Orchestrator {
    live_build: LiveBuild,
    checker: CompatibilityChecker,
    arch: String,
    artifact_name: String,
    state: State,
}

impl Orchestrator {
    pub fn new(live_build: LiveBuild, checker: CompatibilityChecker, arch: &str, artifact_name: &str) -> Self {
        Self {
            live_build,
            checker,
            arch: arch.to_string(),
            artifact_name: artifact_name.to_string(),
            state: State::Idle,
        }
    }

    pub fn from_config(config: &Config, checker: CompatibilityChecker) -> Self {
        Self::new(
            LiveBuild::from_config(config),
            checker,
            &config.arch,
            &config.artifact_name(),
        )
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Fail if this host may not build the context's track.
    pub fn check_host(&self, ctx: &BuildContext) -> Result<(), BuildError> {
        let track = ctx.effective_track();
        if self.checker.is_compatible(track) {
            Ok(())
        } else {
            Err(BuildError::Incompatible { track })
        }
    }

    /// Run clean, configure, build, finalize, clean.
    ///
    /// The process working directory is switched to `ctx.work_dir` for the
    /// duration and restored on every exit path.
    pub fn run(&mut self, ctx: &BuildContext, prompter: &mut dyn Prompter) -> Result<RunSummary, BuildError> {
        self.state = State::Idle;
        self.check_host(ctx)?;

        let guard = WorkdirGuard::enter(&ctx.work_dir).map_err(|source| BuildError::Workdir {
            path: ctx.work_dir.clone(),
            source,
        })?;

        let options = ConfigureOptions {
            codename: ctx.codename().to_string(),
            arch: self.arch.clone(),
            bootappend: ctx.bootappend.clone(),
        };
        println!("Building {}: {}", ctx.describe(&self.arch), guard.path().display());

        let mut elapsed = Vec::new();
        elapsed.push((Phase::Cleaning, self.step(Phase::Cleaning, self.live_build.clean())?));
        elapsed.push((
            Phase::Configuring,
            self.step(Phase::Configuring, self.live_build.configure(&options))?,
        ));
        elapsed.push((Phase::Building, self.step(Phase::Building, self.live_build.build())?));

        self.state = State::Finalizing;
        println!("\n==> Finalizing image");
        let mut finalized =
            artifact::finalize(guard.path(), &self.artifact_name, guard.previous(), prompter);

        // `lb clean --purge` deletes an image left at its default location.
        elapsed.push((Phase::Finalizing, self.step(Phase::Finalizing, self.live_build.clean())?));
        finalized.confirm_present();

        self.state = State::Done;
        Ok(RunSummary { finalized, elapsed })
    }

    fn step(&mut self, phase: Phase, cmd: Cmd) -> Result<Duration, Failure> {
        self.state = State::from(phase);
        let command = cmd.display();
        println!("\n==> {}: {}", phase, command);

        let timer = Timer::start(&format!("lb {}", phase));
        let reason = match cmd.allow_fail().run() {
            Ok(result) if result.success() => {
                log::debug!("{} output:\n{}", phase, result.combined_output());
                return Ok(timer.finish());
            }
            Ok(result) if result.timed_out() => FailureReason::Timeout {
                after: self.live_build.timeout().unwrap_or_default(),
            },
            Ok(result) => FailureReason::Exit {
                code: result.code(),
                output: result.combined_output(),
            },
            Err(e) => FailureReason::Spawn(format!("{:#}", e)),
        };

        let failure = Failure {
            phase,
            command,
            reason,
        };
        self.state = State::Failed(failure.clone());
        Err(failure)
    }
}
