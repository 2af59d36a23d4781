//! Bounded subprocess execution
//!
//! Readiness checks shell out for a handful of facts (VCS CLI auth status,
//! recent git history). Every call carries a timeout and any failure is
//! reported as `None`, which callers treat as a negative signal.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default per-command timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs external commands. Implemented by [`SystemRunner`]; tests substitute
/// canned output.
pub trait CommandRunner {
    /// Run `program args..` in `cwd`. `None` if it could not be spawned,
    /// failed while waiting, or timed out.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Option<CommandOutput>;

    /// True when the command ran and exited 0
    fn succeeds(&self, program: &str, args: &[&str], cwd: &Path) -> bool {
        self.run(program, args, cwd).is_some_and(|o| o.success)
    }
}

/// Spawns real processes with a polling timeout
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SystemRunner {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Option<CommandOutput> {
        let child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let child = match child {
            Ok(c) => c,
            Err(e) => {
                debug!("Failed to spawn {}: {}", program, e);
                return None;
            }
        };

        let output = wait_with_timeout(child, program, self.timeout);
        if let Some(ref out) = output {
            debug!("{} {:?} exited (success: {})", program, args, out.success);
        }
        output
    }
}

/// Poll the child until it exits or the timeout elapses, killing it on timeout
fn wait_with_timeout(mut child: Child, program: &str, timeout: Duration) -> Option<CommandOutput> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = read_pipe(child.stdout.take());
                let stderr = read_pipe(child.stderr.take());
                return Some(CommandOutput {
                    success: status.success(),
                    stdout,
                    stderr,
                });
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", program, timeout.as_secs());
                    return None;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                debug!("Failed to wait for {}: {}", program, e);
                return None;
            }
        }
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut p) = pipe {
        let _ = p.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
