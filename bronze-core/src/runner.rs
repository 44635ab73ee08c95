//! External command execution with a bounded time budget.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::domain::CheckResult;

/// A single command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest<'a> {
    /// Program followed by its arguments.
    pub argv: &'a [&'a str],
    /// Check name used in the result.
    pub name: &'a str,
    /// Time budget for the command.
    pub timeout: Duration,
    /// Whether a failure is advisory. Never changes the recorded result.
    pub allow_failure: bool,
}

/// Runs a command and translates every outcome into a [`CheckResult`].
///
/// Implementations must not return errors: a command that cannot be started,
/// times out, or exits non-zero is still a result.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run the command described by `request`.
    async fn run(&self, request: &RunRequest<'_>) -> CheckResult;
}

/// Runs commands as child processes inside the workspace root.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    workspace: PathBuf,
}

impl ProcessRunner {
    /// Create a runner whose commands execute in `workspace`.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    /// The working directory of spawned commands.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, request: &RunRequest<'_>) -> CheckResult {
        let name = request.name;
        let Some((program, args)) = request.argv.split_first() else {
            return CheckResult::error(name, "empty command");
        };
        // Spawning in a missing directory also reports NotFound, which would
        // otherwise be mistaken for a missing tool.
        if !self.workspace.is_dir() {
            return CheckResult::error(
                name,
                format!("workspace not found: {}", self.workspace.display()),
            );
        }

        info!("running {name}: {}", request.argv.join(" "));
        let started = Instant::now();

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&self.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The child leads a fresh process group so a timeout can reach
        // everything it started.
        #[cfg(unix)]
        command.process_group(0);
        let spawned = command.spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("{name}: command not found: {program}");
                return CheckResult::tool_missing(name, program);
            }
            Err(err) => {
                warn!("{name}: failed to start {program}: {err}");
                return CheckResult::error(name, err.to_string());
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let collect = async {
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_pipe(stdout), read_pipe(stderr));
            status.map(|status| (status, stdout, stderr))
        };
        let waited = tokio::time::timeout(request.timeout, collect).await;

        let result = match waited {
            Ok(Ok((status, stdout, stderr))) => {
                let stdout = String::from_utf8_lossy(&stdout).to_string();
                let stderr = String::from_utf8_lossy(&stderr).to_string();
                if status.success() {
                    CheckResult::success(name, stdout)
                } else {
                    debug!("{name} exited with {status}");
                    let details = if stderr.trim().is_empty() {
                        stdout
                    } else {
                        stderr
                    };
                    CheckResult::failure(name, details)
                }
            }
            Ok(Err(err)) => CheckResult::error(name, err.to_string()),
            Err(_) => {
                terminate(&mut child, name).await;
                CheckResult::timed_out(name, request.timeout)
            }
        };

        let elapsed = started.elapsed();
        if result.passed {
            info!("{name} passed in {elapsed:?}");
        } else if request.allow_failure {
            info!("{name} (advisory): {} after {elapsed:?}", result.message);
        } else {
            warn!("{name}: {} after {elapsed:?}", result.message);
        }
        result
    }
}

/// Kill the child's process group, then kill and reap the child itself.
async fn terminate(child: &mut Child, name: &str) {
    #[cfg(unix)]
    kill_group(child, name);
    if let Err(err) = child.kill().await {
        warn!("{name}: failed to kill timed out process: {err}");
    }
}

#[cfg(unix)]
fn kill_group(child: &Child, name: &str) {
    let Some(pid) = child.id() else {
        return;
    };
    match signal::killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!("{name}: failed to kill process group {pid}: {err}"),
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(err) = pipe.read_to_end(&mut buffer).await {
            debug!("stopped reading child output: {err}");
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::{CommandRunner, ProcessRunner, RunRequest};
    use crate::domain::Outcome;
    use std::time::{Duration, Instant};

    fn request<'a>(argv: &'a [&'a str], name: &'a str, timeout: Duration) -> RunRequest<'a> {
        RunRequest {
            argv,
            name,
            timeout,
            allow_failure: false,
        }
    }

    #[tokio::test]
    async fn zero_exit_passes_with_stdout() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());

        let result = runner
            .run(&request(&["echo", "hello"], "echo", Duration::from_secs(10)))
            .await;

        assert!(result.passed);
        assert_eq!(result.outcome, Outcome::Passed);
        assert_eq!(result.message, "echo passed");
        assert!(result.details.as_deref().unwrap_or_default().contains("hello"));
    }

    #[tokio::test]
    async fn non_zero_exit_fails_regardless_of_output() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());

        let result = runner
            .run(&request(
                &["sh", "-c", "echo all good; exit 3"],
                "liar",
                Duration::from_secs(10),
            ))
            .await;

        assert!(!result.passed);
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.message, "liar failed");
        // stderr is empty, so stdout is used.
        assert_eq!(result.details.as_deref(), Some("all good\n"));
    }

    #[tokio::test]
    async fn failure_details_prefer_stderr() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());

        let result = runner
            .run(&request(
                &["sh", "-c", "echo out; echo broken >&2; exit 1"],
                "lint",
                Duration::from_secs(10),
            ))
            .await;

        assert_eq!(result.details.as_deref(), Some("broken\n"));
    }

    #[tokio::test]
    async fn runs_inside_workspace() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::write(root.path().join("marker.txt"), "x").expect("marker");
        let runner = ProcessRunner::new(root.path());

        let result = runner
            .run(&request(&["ls"], "ls", Duration::from_secs(10)))
            .await;

        assert!(result.details.unwrap_or_default().contains("marker.txt"));
    }

    #[tokio::test]
    async fn missing_executable_is_reported_distinctly() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());

        let result = runner
            .run(&request(
                &["bronze-definitely-not-installed", "--check"],
                "ghost",
                Duration::from_secs(10),
            ))
            .await;

        assert!(!result.passed);
        assert_eq!(result.outcome, Outcome::ToolMissing);
        assert_eq!(
            result.message,
            "Command not found: bronze-definitely-not-installed"
        );
    }

    #[tokio::test]
    async fn empty_command_and_missing_workspace_are_errors() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());
        let result = runner
            .run(&request(&[], "nothing", Duration::from_secs(1)))
            .await;
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.message, "nothing error");

        let runner = ProcessRunner::new(root.path().join("missing"));
        let result = runner
            .run(&request(&["echo", "hi"], "echo", Duration::from_secs(1)))
            .await;
        assert_eq!(result.outcome, Outcome::Error);
    }

    #[tokio::test]
    async fn timeout_kills_the_process() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());
        let started = Instant::now();

        let result = runner
            .run(&request(
                &["sh", "-c", "echo $$ > pid; exec sleep 30"],
                "sleeper",
                Duration::from_millis(500),
            ))
            .await;

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!result.passed);
        assert_eq!(result.outcome, Outcome::TimedOut);
        assert!(result.message.contains("timed out"));

        #[cfg(target_os = "linux")]
        {
            let pid = std::fs::read_to_string(root.path().join("pid")).expect("pid file");
            let proc_entry = std::path::PathBuf::from(format!("/proc/{}", pid.trim()));
            assert!(!proc_entry.exists(), "process {} survived", pid.trim());
        }
    }

    /// Whether `pid` is still running. Zombies waiting for init count as gone.
    #[cfg(target_os = "linux")]
    fn running(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .map(|(_, rest)| !rest.trim_start().starts_with(['Z', 'X']))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_kills_background_children() {
        let root = tempfile::tempdir().expect("temp dir");
        let runner = ProcessRunner::new(root.path());

        let result = runner
            .run(&request(
                &["sh", "-c", "sleep 30 & echo $! > gpid; wait"],
                "wrapper",
                Duration::from_millis(500),
            ))
            .await;

        assert_eq!(result.outcome, Outcome::TimedOut);
        let gpid = std::fs::read_to_string(root.path().join("gpid")).expect("gpid file");
        let gpid = gpid.trim();
        let deadline = Instant::now() + Duration::from_secs(5);
        while running(gpid) && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!running(gpid), "background process {gpid} survived");
    }
}
