//! Centralized command execution with consistent error handling.
//!
//! Every external invocation goes through [`Cmd`], which captures stdout and
//! stderr, optionally enforces a timeout, and turns non-zero exits into
//! errors carrying the captured output.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

/// How long to keep collecting output after a timed-out command is killed.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status, or `None` if the command was killed after timing out.
    pub status: Option<ExitStatus>,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }

    /// Returns true if the command was killed because it ran past its timeout.
    pub fn timed_out(&self) -> bool {
        self.status.is_none()
    }

    /// Get the exit code, or -1 if terminated by signal or timeout.
    pub fn code(&self) -> i32 {
        self.status.and_then(|s| s.code()).unwrap_or(-1)
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }

    /// Stdout followed by stderr, trimmed.
    pub fn combined_output(&self) -> String {
        let out = self.stdout_trimmed();
        let err = self.stderr_trimmed();
        match (out.is_empty(), err.is_empty()) {
            (true, _) => err.to_string(),
            (_, true) => out.to_string(),
            _ => format!("{}\n{}", out, err),
        }
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
    /// Log target that receives each output line as it arrives.
    log_target: Option<&'static str>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            timeout: None,
            allow_fail: false,
            log_target: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Kill the command, and everything it started, if it runs longer than `limit`.
    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Also emit every output line at info level under `target` while running.
    pub fn log_output(mut self, target: &'static str) -> Self {
        self.log_target = Some(target);
        self
    }

    /// Human-readable command line, for logs.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Run the command and capture output.
    pub fn run(self) -> Result<CommandResult> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // A timed command leads its own process group so a timeout can take
        // down whatever it forked. Untimed commands stay in ours and keep
        // receiving Ctrl-C from the terminal.
        if self.timeout.is_some() {
            cmd.process_group(0);
        }

        log::debug!("exec: {}", self.display());

        let mut child = cmd.spawn().with_context(|| {
            format!("Failed to execute '{}'. Is it installed?", self.program)
        })?;

        // Pipes are drained on their own threads so a chatty child can't
        // block on a full pipe while we wait on it.
        let stdout = Drain::start(child.stdout.take(), self.log_target);
        let stderr = Drain::start(child.stderr.take(), self.log_target);

        let (status, deadline) = match self.timeout {
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => (Some(status), None),
                None => {
                    log::warn!("'{}' exceeded {:?}, killing", self.program, limit);
                    kill_group(&mut child);
                    (None, Some(Instant::now() + DRAIN_GRACE))
                }
            },
            None => (Some(child.wait()?), None),
        };

        let result = CommandResult {
            status,
            stdout: stdout.finish(deadline),
            stderr: stderr.finish(deadline),
        };

        if !self.allow_fail && !result.success() {
            let prefix = format!("'{}' failed", self.program);

            if result.timed_out() {
                bail!("{} (timed out)", prefix);
            }

            let output = result.combined_output();
            if output.is_empty() {
                bail!("{} (exit code {})", prefix, result.code());
            } else {
                bail!("{} (exit code {}):\n{}", prefix, result.code(), output);
            }
        }

        Ok(result)
    }
}

/// SIGKILL the child's process group, then reap the child.
fn kill_group(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill(2) only sends a signal; the group was created by spawn.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        let _ = child.kill();
    }
    let _ = child.wait();
}

/// Collects one pipe on a background thread.
struct Drain {
    buf: Arc<Mutex<String>>,
    handle: JoinHandle<()>,
}

impl Drain {
    fn start<R: Read + Send + 'static>(pipe: Option<R>, log_target: Option<&'static str>) -> Self {
        let buf = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let Some(pipe) = pipe else { return };
            let mut reader = BufReader::new(pipe);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                let line = String::from_utf8_lossy(&raw);
                if let Some(target) = log_target {
                    log::info!(target: target, "{}", line.trim_end());
                }
                if let Ok(mut out) = sink.lock() {
                    out.push_str(&line);
                }
            }
        });
        Self { buf, handle }
    }

    /// Wait for the pipe to close, or until `deadline`, and return what was read.
    fn finish(self, deadline: Option<Instant>) -> String {
        match deadline {
            None => {
                let _ = self.handle.join();
            }
            Some(deadline) => {
                while !self.handle.is_finished() && Instant::now() < deadline {
                    thread::sleep(Duration::from_millis(20));
                }
                if self.handle.is_finished() {
                    let _ = self.handle.join();
                } else {
                    log::debug!("output pipe still open after kill, leaving it");
                }
            }
        }
        match self.buf.lock() {
            Ok(out) => out.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

// =============================================================================
// Convenience functions
// =============================================================================

/// Check if a program exists in PATH.
///
/// Returns the full path if found, None otherwise.
pub fn which(program: &str) -> Option<String> {
    which::which(program)
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let result = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(result.success());
        assert!(!result.timed_out());
        assert_eq!(result.stdout_trimmed(), "hello");
    }

    #[test]
    fn test_run_captures_stderr() {
        let result = Cmd::new("ls")
            .arg("/nonexistent_path_12345")
            .allow_fail()
            .run()
            .unwrap();

        assert!(!result.success());
        assert!(!result.stderr.is_empty());
    }

    #[test]
    fn test_run_failure_includes_output() {
        let err = Cmd::new("sh")
            .args(["-c", "echo out-line; echo err-line >&2; exit 3"])
            .run()
            .unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("exit code 3"));
        assert!(msg.contains("out-line"));
        assert!(msg.contains("err-line"));
    }

    #[test]
    fn test_combined_output_orders_stdout_first() {
        let result = Cmd::new("sh")
            .args(["-c", "echo one; echo two >&2"])
            .run()
            .unwrap();
        assert_eq!(result.combined_output(), "one\ntwo");
    }

    #[test]
    fn test_which() {
        assert!(which("sh").is_some());
        assert!(which("nonexistent_program_12345").is_none());
    }

    #[test]
    fn test_allow_fail() {
        let result = Cmd::new("false").allow_fail().run().unwrap();

        assert!(!result.success());
        assert_eq!(result.code(), 1);
    }

    #[test]
    fn test_timeout_kills_command() {
        let result = Cmd::new("sleep")
            .arg("5")
            .timeout(Some(Duration::from_millis(200)))
            .allow_fail()
            .run()
            .unwrap();

        assert!(result.timed_out());
        assert!(!result.success());
        assert_eq!(result.code(), -1);
    }

    #[test]
    fn test_timeout_error_message() {
        let err = Cmd::new("sleep")
            .arg("5")
            .timeout(Some(Duration::from_millis(200)))
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_timeout_kills_forked_children() {
        // The shell forks `sleep`, which inherits the output pipes.
        let start = Instant::now();
        let result = Cmd::new("sh")
            .args(["-c", "sleep 8; echo done"])
            .timeout(Some(Duration::from_millis(300)))
            .allow_fail()
            .run()
            .unwrap();

        assert!(result.timed_out());
        assert!(start.elapsed() < Duration::from_secs(3), "took {:?}", start.elapsed());
        assert!(!result.stdout.contains("done"));
    }

    #[test]
    fn test_timeout_keeps_output_before_kill() {
        let result = Cmd::new("sh")
            .args(["-c", "echo started; sleep 8"])
            .timeout(Some(Duration::from_millis(500)))
            .allow_fail()
            .run()
            .unwrap();

        assert!(result.timed_out());
        assert_eq!(result.stdout_trimmed(), "started");
    }

    #[test]
    fn test_log_output_still_captures() {
        let result = Cmd::new("sh")
            .args(["-c", "echo a; echo b"])
            .log_output("lb")
            .run()
            .unwrap();
        assert_eq!(result.stdout, "a\nb\n");
    }
}
