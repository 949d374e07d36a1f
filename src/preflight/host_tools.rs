//! Host tool availability checks.

use crate::config::Config;
use crate::process;

use super::types::CheckResult;

/// Check the live-build toolchain is installed.
pub fn check_host_tools(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // First word of HACKEROS_LB may be a wrapper like sudo; check every word.
    for program in &config.lb_command {
        results.push(check_tool_exists(
            program,
            if program == "sudo" { "sudo" } else { "live-build" },
            "Runs the image build",
            true,
        ));
    }

    let required_tools = [("debootstrap", "debootstrap", "Bootstraps the chroot")];
    for (tool, package, purpose) in required_tools {
        results.push(check_tool_exists(tool, package, purpose, true));
    }

    let optional_tools = [("xorriso", "xorriso", "Needed by lb for ISO images")];
    for (tool, package, purpose) in optional_tools {
        results.push(check_tool_exists(tool, package, purpose, false));
    }

    results
}

/// Check if a tool exists in PATH.
fn check_tool_exists(tool: &str, package: &str, purpose: &str, required: bool) -> CheckResult {
    match process::which(tool) {
        Some(path) => CheckResult::pass_with(tool, &path),
        None => {
            let msg = format!("Not found. Install '{}' package. {}", package, purpose);
            if required {
                CheckResult::fail(tool, &msg)
            } else {
                CheckResult::warn(tool, &msg)
            }
        }
    }
}
