//! Git command runner for branch-clean.
//!
//! Provides a safe wrapper around git commands with captured stdout/stderr
//! and structured error handling. All git operations should go through this module.

use crate::error::{CleanError, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    /// Create a new GitOutput from raw output bytes.
    fn from_output(output: &Output) -> Self {
        Self::from_bytes(&output.stdout, &output.stderr)
    }

    fn from_bytes(stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            stdout: String::from_utf8_lossy(stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Returns stdout lines as a vector.
    pub fn lines(&self) -> Vec<&str> {
        if self.stdout.is_empty() {
            Vec::new()
        } else {
            self.stdout.lines().collect()
        }
    }

    /// The most useful failure text: stderr, or stdout when stderr is empty.
    pub fn failure_text(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Outcome of a git command run under a deadline.
#[derive(Debug, Clone)]
pub enum BoundedRun {
    /// The process exited on its own.
    Exited { success: bool, output: GitOutput },
    /// The deadline passed and the process was killed.
    TimedOut,
}

/// Run a git command with the specified working directory.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(CleanError::GitError)` - On spawn failure or non-zero exit code
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            CleanError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        Err(CleanError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            output.status.code().unwrap_or(-1),
            git_output.failure_text()
        )))
    }
}

/// Run a git command that must finish within `timeout`.
///
/// Unlike [`run_git`], a non-zero exit is not an error here: the caller gets
/// the captured output and decides. `Err` is returned only when git cannot be
/// started at all (binary missing, working directory gone), which callers
/// treat as fatal. Optional `stdin` is fed to the child while it runs.
///
/// Terminal prompts are disabled so a push waiting for credentials fails
/// instead of hanging until the deadline.
pub fn run_git_bounded<P: AsRef<Path>>(
    cwd: P,
    args: &[&str],
    stdin: Option<&str>,
    timeout: Duration,
) -> Result<BoundedRun> {
    let cwd = cwd.as_ref();

    let mut command = Command::new("git");
    command
        .current_dir(cwd)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    let mut child = command.spawn().map_err(|e| {
        CleanError::GitError(format!(
            "failed to execute git {} in '{}': {} (is git installed?)",
            args.first().unwrap_or(&""),
            cwd.display(),
            e
        ))
    })?;

    // Every pipe is serviced on its own thread while the deadline is polled;
    // a child blocked on a full pipe would otherwise never exit.
    let stdin_writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_string();
            // A write error means git already exited; its status reports why.
            Some(thread::spawn(move || {
                let _ = pipe.write_all(input.as_bytes());
            }))
        }
        _ => None,
    };
    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let Some(status) = wait_with_timeout(&mut child, timeout)? else {
        // Readers are left detached: a helper git spawned (ssh, a credential
        // helper) may still hold the pipes open after git itself is killed.
        return Ok(BoundedRun::TimedOut);
    };

    if let Some(writer) = stdin_writer {
        let _ = writer.join();
    }
    let stdout = collect(stdout_reader);
    let stderr = collect(stderr_reader);

    Ok(BoundedRun::Exited {
        success: status.success(),
        output: GitOutput::from_bytes(&stdout, &stderr),
    })
}

/// Read a pipe to its end on a background thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Wait for a child process with timeout.
///
/// Returns the exit status, or `None` when the deadline passed and the
/// process was killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(20);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }
                thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(CleanError::GitError(format!(
                    "failed to check git process status: {}",
                    e
                )));
            }
        }
    }
}

/// Get the repository root directory using `git rev-parse --show-toplevel`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The absolute path to the repository root
/// * `Err(CleanError::UserError)` - If not inside a git repository (exit code 1)
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(|e| {
            CleanError::UserError(format!("failed to execute git: {} (is git installed?)", e))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(PathBuf::from(&git_output.stdout))
    } else {
        // "not a git repository" is a clean user error (exit 1), not a git error (exit 3).
        Err(CleanError::UserError(
            "not inside a git repository. Run this command from within a git repository."
                .to_string(),
        ))
    }
}

/// Name of the checked-out branch, or `None` on a detached HEAD.
pub fn current_branch<P: AsRef<Path>>(repo_root: P) -> Result<Option<String>> {
    let output = run_git(repo_root, &["branch", "--show-current"])?;
    if output.stdout.is_empty() {
        Ok(None)
    } else {
        Ok(Some(output.stdout))
    }
}

/// URL of the named remote, or `None` if the remote is not configured.
pub fn remote_url<P: AsRef<Path>>(repo_root: P, remote: &str) -> Option<String> {
    run_git(repo_root, &["remote", "get-url", remote])
        .ok()
        .map(|output| output.stdout)
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_repo;
    use tempfile::TempDir;

    #[test]
    fn test_run_git_success() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["status", "--porcelain"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_git_failure_returns_git_error() {
        let temp_dir = create_test_repo();
        let result = run_git(temp_dir.path(), &["checkout", "nonexistent-branch"]);
        let err = result.unwrap_err();
        assert!(matches!(err, CleanError::GitError(_)));
    }

    #[test]
    fn test_get_repo_root_from_subdirectory() {
        let temp_dir = create_test_repo();
        let subdir = temp_dir.path().join("subdir").join("nested");
        std::fs::create_dir_all(&subdir).unwrap();

        let root = get_repo_root(&subdir).unwrap();
        let expected = temp_dir.path().canonicalize().unwrap();
        assert_eq!(root.canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_get_repo_root_outside_repo_returns_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = get_repo_root(temp_dir.path()).unwrap_err();
        assert!(matches!(err, CleanError::UserError(_)));
        assert!(err.to_string().contains("not inside a git repository"));
    }

    #[test]
    fn test_current_branch_is_main() {
        let temp_dir = create_test_repo();
        let branch = current_branch(temp_dir.path()).unwrap();
        assert_eq!(branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_remote_url_missing_remote() {
        let temp_dir = create_test_repo();
        assert_eq!(remote_url(temp_dir.path(), "origin"), None);
    }

    #[test]
    fn test_run_git_bounded_reports_failure_without_error() {
        let temp_dir = create_test_repo();
        let run = run_git_bounded(
            temp_dir.path(),
            &["branch", "-D", "does-not-exist"],
            None,
            Duration::from_secs(30),
        )
        .unwrap();

        match run {
            BoundedRun::Exited { success, output } => {
                assert!(!success);
                assert!(output.failure_text().contains("does-not-exist"));
            }
            BoundedRun::TimedOut => panic!("branch -D should not time out"),
        }
    }

    #[test]
    fn test_run_git_bounded_feeds_stdin() {
        let temp_dir = create_test_repo();
        let run = run_git_bounded(
            temp_dir.path(),
            &["hash-object", "--stdin"],
            Some("hello\n"),
            Duration::from_secs(30),
        )
        .unwrap();

        match run {
            BoundedRun::Exited { success, output } => {
                assert!(success);
                assert_eq!(output.stdout, "ce013625030ba8dba906f756967f9e9ca394464a");
            }
            BoundedRun::TimedOut => panic!("hash-object should not time out"),
        }
    }

    #[test]
    fn test_run_git_bounded_handles_output_larger_than_a_pipe() {
        let temp_dir = create_test_repo();
        let content = "0123456789abcdef\n".repeat(12_500);

        let stored = run_git_bounded(
            temp_dir.path(),
            &["hash-object", "-w", "--stdin"],
            Some(&content),
            Duration::from_secs(30),
        )
        .unwrap();
        let object_id = match stored {
            BoundedRun::Exited { success, output } => {
                assert!(success);
                output.stdout
            }
            BoundedRun::TimedOut => panic!("hash-object should not time out"),
        };

        let started = Instant::now();
        let run = run_git_bounded(
            temp_dir.path(),
            &["cat-file", "-p", &object_id],
            None,
            Duration::from_secs(30),
        )
        .unwrap();

        match run {
            BoundedRun::Exited { success, output } => {
                assert!(success);
                assert_eq!(output.stdout, content.trim_end());
            }
            BoundedRun::TimedOut => panic!("cat-file of a 200 KB blob should not time out"),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_run_git_bounded_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");
        let err = run_git_bounded(&missing, &["status"], None, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, CleanError::GitError(_)));
    }

    #[test]
    fn test_git_output_lines_empty() {
        let output = GitOutput {
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_failure_text_prefers_stderr() {
        let output = GitOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.failure_text(), "err");

        let output = GitOutput {
            stdout: "out".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.failure_text(), "out");
    }
}
