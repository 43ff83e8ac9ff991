//! Deletion executors.
//!
//! [`RefDeleter`] is the seam between the batching engine and whatever
//! actually removes refs. [`GitRefDeleter`] drives the git binary; tests
//! drive the engine with in-memory fakes.

use super::types::DeleteScope;
use crate::error::CleanError;
use crate::git::{BoundedRun, GitOutput, run_git_bounded};
use crate::refs::RefKind;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Arguments kept when a command line is rendered into a message.
const MAX_SHOWN_ARGS: usize = 6;

/// Why a deletion request did not succeed.
#[derive(Error, Debug)]
pub enum DeleteFailure {
    /// The request ran and was refused; carries the raw message verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The request exceeded its deadline and was killed.
    #[error("Command timed out after {}s: {command}", timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    /// The executor cannot run at all. Aborts the whole run.
    #[error(transparent)]
    Fatal(#[from] CleanError),
}

/// Capability to delete refs of one kind.
///
/// Implementations must be fail-fast: no retries, raw messages passed through.
pub trait RefDeleter: Sync {
    /// Delete a single ref.
    fn delete_one(&self, name: &str) -> Result<(), DeleteFailure>;

    /// Delete several refs in one request. Either every name is deleted or
    /// the request fails as a whole.
    fn delete_batch(&self, names: &[&str]) -> Result<(), DeleteFailure>;
}

/// Deletes refs by running git in a repository.
#[derive(Debug, Clone)]
pub struct GitRefDeleter {
    repo_root: PathBuf,
    kind: RefKind,
    remote: String,
    timeout: Duration,
}

impl GitRefDeleter {
    pub fn new(
        repo_root: impl Into<PathBuf>,
        kind: RefKind,
        remote: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            repo_root: repo_root.into(),
            kind,
            remote: remote.into(),
            timeout,
        }
    }

    /// Arguments deleting one ref. Uses the porcelain commands so local
    /// branch deletion also drops the branch's config section.
    fn single_args(&self, name: &str) -> Vec<String> {
        match self.kind {
            RefKind::LocalBranch => vec!["branch".into(), "-D".into(), name.into()],
            RefKind::LocalTag => vec!["tag".into(), "-d".into(), name.into()],
            RefKind::RemoteBranch | RefKind::RemoteTag => vec![
                "push".into(),
                self.remote.clone(),
                "--delete".into(),
                self.kind.full_refname(name),
            ],
        }
    }

    /// Delete local refs in one all-or-nothing transaction.
    ///
    /// `git branch -D a b c` deletes what it can and reports the rest, which
    /// would leave a failed batch half-applied. Instead the current values are
    /// resolved first (any missing name fails the whole batch) and then fed
    /// to `update-ref --stdin` as expected old values, which git applies
    /// atomically. `update-ref` does not refuse checked-out branches the way
    /// `branch -D` does, so those fail the batch up front.
    fn delete_local_batch(&self, names: &[&str]) -> Result<(), DeleteFailure> {
        if self.kind == RefKind::LocalBranch {
            let checked_out = self.checked_out_branches()?;
            if let Some(name) = names.iter().find(|name| checked_out.contains(**name)) {
                return Err(DeleteFailure::Rejected(format!(
                    "Command failed: git update-ref --stdin\n\
                     error: cannot delete branch '{}' checked out in a worktree",
                    name
                )));
            }
        }

        let refnames: Vec<String> = names.iter().map(|name| self.kind.full_refname(name)).collect();

        let mut rev_parse = vec!["rev-parse".to_string()];
        rev_parse.extend(refnames.iter().cloned());
        rev_parse.push("--".to_string());
        let resolved = self.run(&rev_parse, None)?;
        let object_ids: Vec<&str> = resolved
            .lines()
            .into_iter()
            .filter(|line| *line != "--")
            .collect();
        if object_ids.len() != refnames.len() {
            return Err(DeleteFailure::Rejected(format!(
                "Command failed: {}\nexpected {} object ids, got {}",
                render_command_owned(&rev_parse),
                refnames.len(),
                object_ids.len()
            )));
        }

        let mut input = String::new();
        for (refname, object_id) in refnames.iter().zip(object_ids) {
            input.push_str(&format!("delete {} {}\n", refname, object_id));
        }
        self.run(&["update-ref".to_string(), "--stdin".to_string()], Some(&input))?;
        Ok(())
    }

    /// Branches checked out in any worktree of the repository.
    fn checked_out_branches(&self) -> Result<HashSet<String>, DeleteFailure> {
        let output = self.run(
            &[
                "worktree".to_string(),
                "list".to_string(),
                "--porcelain".to_string(),
            ],
            None,
        )?;
        Ok(output
            .lines()
            .into_iter()
            .filter_map(|line| line.strip_prefix("branch refs/heads/"))
            .map(str::to_string)
            .collect())
    }

    /// Delete remote refs with one atomic push.
    fn delete_remote_batch(&self, names: &[&str]) -> Result<(), DeleteFailure> {
        let mut args = vec![
            "push".to_string(),
            "--atomic".to_string(),
            self.remote.clone(),
            "--delete".to_string(),
        ];
        args.extend(names.iter().map(|name| self.kind.full_refname(name)));
        self.run(&args, None)?;
        Ok(())
    }

    /// Run one bounded git command, turning a non-zero exit or a timeout
    /// into the matching [`DeleteFailure`].
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<GitOutput, DeleteFailure> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = render_command(&args);
        debug!(kind = %self.kind, command = %command, "running git");

        match run_git_bounded(&self.repo_root, &args, stdin, self.timeout)? {
            BoundedRun::Exited {
                success: true,
                output,
            } => Ok(output),
            BoundedRun::Exited { output, .. } => Err(DeleteFailure::Rejected(format!(
                "Command failed: {}\n{}",
                command,
                output.failure_text()
            ))),
            BoundedRun::TimedOut => Err(DeleteFailure::TimedOut {
                command,
                timeout: self.timeout,
            }),
        }
    }
}

impl RefDeleter for GitRefDeleter {
    fn delete_one(&self, name: &str) -> Result<(), DeleteFailure> {
        self.run(&self.single_args(name), None)?;
        Ok(())
    }

    fn delete_batch(&self, names: &[&str]) -> Result<(), DeleteFailure> {
        match (names, self.kind.scope()) {
            ([], _) => Ok(()),
            ([name], _) => self.delete_one(name),
            (_, DeleteScope::Local) => self.delete_local_batch(names),
            (_, DeleteScope::Remote) => self.delete_remote_batch(names),
        }
    }
}

fn render_command_owned(args: &[String]) -> String {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    render_command(&args)
}

/// Render `git <args>` the way a user would type it. Batch commands carry
/// one argument per ref, so only the first [`MAX_SHOWN_ARGS`] are shown.
fn render_command(args: &[&str]) -> String {
    let shown = args.len().min(MAX_SHOWN_ARGS);
    let mut words = Vec::with_capacity(shown + 1);
    words.push("git");
    words.extend_from_slice(&args[..shown]);
    let rendered = shell_words::join(words);

    match args.len() - shown {
        0 => rendered,
        hidden => format!("{} ... (+{} more)", rendered, hidden),
    }
}
