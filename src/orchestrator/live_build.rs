//! Command lines for the live-build (`lb`) tool.

use std::time::Duration;

use crate::config::Config;
use crate::process::Cmd;

/// Archive areas enabled in the image.
pub const ARCHIVE_AREAS: &str = "main contrib non-free non-free-firmware";

/// apt flags so chroot installs never stop for input or signatures.
pub const APT_OPTIONS: &str = "--yes --allow-unauthenticated";

/// Kernel command line live-build uses before any profile parameters.
pub const BOOTAPPEND_BASE: &str = "boot=live components";

/// Log target that receives `lb` output line by line (`RUST_LOG=lb=info`).
pub const OUTPUT_LOG_TARGET: &str = "lb";

/// Inputs to `lb config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureOptions {
    pub codename: String,
    pub arch: String,
    /// Extra kernel parameters from profiles.
    pub bootappend: Option<String>,
}

impl ConfigureOptions {
    /// Arguments following `lb config`.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--distribution",
            self.codename.as_str(),
            "--architectures",
            self.arch.as_str(),
            "--archive-areas",
            ARCHIVE_AREAS,
            "--apt-options",
            APT_OPTIONS,
            "--apt-secure",
            "false",
            "--firmware-binary",
            "true",
            "--firmware-chroot",
            "true",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(params) = &self.bootappend {
            args.push("--bootappend-live".to_string());
            args.push(format!("{} {}", BOOTAPPEND_BASE, params));
        }
        args
    }
}

/// Builds `lb` invocations, honouring a wrapper prefix such as `sudo`.
#[derive(Debug, Clone)]
pub struct LiveBuild {
    program: String,
    leading_args: Vec<String>,
    timeout: Option<Duration>,
}

impl LiveBuild {
    /// `command` is the program followed by any leading args.
    pub fn new(command: &[String], timeout: Option<Duration>) -> Self {
        let (program, leading_args) = match command.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => ("lb".to_string(), Vec::new()),
        };
        Self {
            program,
            leading_args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.lb_command, config.step_timeout())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn cmd(&self, subcommand: &str) -> Cmd {
        Cmd::new(&self.program)
            .args(&self.leading_args)
            .arg(subcommand)
            .timeout(self.timeout)
            .log_output(OUTPUT_LOG_TARGET)
    }

    /// `lb clean --purge`
    pub fn clean(&self) -> Cmd {
        self.cmd("clean").arg("--purge")
    }

    /// `lb config ...`
    pub fn configure(&self, options: &ConfigureOptions) -> Cmd {
        self.cmd("config").args(options.args())
    }

    /// `lb build`
    pub fn build(&self) -> Cmd {
        self.cmd("build")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(bootappend: Option<&str>) -> ConfigureOptions {
        ConfigureOptions {
            codename: "forky".into(),
            arch: "amd64".into(),
            bootappend: bootappend.map(String::from),
        }
    }

    #[test]
    fn test_configure_args() {
        let args = options(None).args();
        assert_eq!(&args[..4], &["--distribution", "forky", "--architectures", "amd64"]);
        assert!(args.windows(2).any(|w| w == ["--apt-secure", "false"]));
        assert!(args.windows(2).any(|w| w == ["--firmware-binary", "true"]));
        assert!(!args.iter().any(|a| a == "--bootappend-live"));
    }

    #[test]
    fn test_bootappend_appended() {
        let args = options(Some("quiet splash")).args();
        let n = args.len();
        assert_eq!(args[n - 2], "--bootappend-live");
        assert_eq!(args[n - 1], "boot=live components quiet splash");
    }

    #[test]
    fn test_wrapper_prefix() {
        let lb = LiveBuild::new(&["sudo".to_string(), "lb".to_string()], None);
        assert_eq!(lb.clean().display(), "sudo lb clean --purge");
        assert_eq!(lb.build().display(), "sudo lb build");
    }

    #[test]
    fn test_empty_command_defaults_to_lb() {
        let lb = LiveBuild::new(&[], None);
        assert_eq!(lb.build().display(), "lb build");
    }
}
