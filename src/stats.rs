//! Repository statistics and post-delete maintenance.

use crate::error::{CleanError, Result};
use crate::git::{remote_url, run_git};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Counts shown before and after a cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryStats {
    pub commits: u64,
    pub local_branches: u64,
    pub remote_branches: u64,
    pub tags: u64,
    /// Loose plus packed object storage, in KiB.
    pub size_kib: u64,
}

impl RepositoryStats {
    /// Gather statistics. Any failure is logged and yields zeroed stats.
    pub fn collect(repo_root: &Path) -> Self {
        match Self::try_collect(repo_root) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "could not gather repository statistics");
                Self::default()
            }
        }
    }

    fn try_collect(repo_root: &Path) -> Result<Self> {
        let commits = run_git(repo_root, &["rev-list", "--count", "HEAD"])?;
        let commits = commits.stdout.parse::<u64>().map_err(|e| {
            CleanError::GitError(format!("unexpected rev-list output '{}': {}", commits.stdout, e))
        })?;

        let count_refs = |namespace: &str| -> Result<u64> {
            let output = run_git(repo_root, &["for-each-ref", "--format=%(refname)", namespace])?;
            Ok(output
                .lines()
                .into_iter()
                .filter(|line| !line.ends_with("/HEAD"))
                .count() as u64)
        };

        let objects = run_git(repo_root, &["count-objects", "-v"])?;

        Ok(Self {
            commits,
            local_branches: count_refs("refs/heads")?,
            remote_branches: count_refs("refs/remotes")?,
            tags: count_refs("refs/tags")?,
            size_kib: storage_kib(&objects.stdout),
        })
    }

    pub fn branches(&self) -> u64 {
        self.local_branches + self.remote_branches
    }
}

/// Sum of `size` and `size-pack` from `git count-objects -v`.
fn storage_kib(count_objects: &str) -> u64 {
    count_objects
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| matches!(key.trim(), "size" | "size-pack"))
        .filter_map(|(_, value)| value.trim().parse::<u64>().ok())
        .sum()
}

/// KiB rendered with a binary unit, e.g. `1.5 MiB`.
pub fn human_size(kib: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    let mut value = kib as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", kib, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

impl fmt::Display for RepositoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Commits:  {}", self.commits)?;
        writeln!(
            f,
            "  Branches: {} ({} local, {} remote)",
            self.branches(),
            self.local_branches,
            self.remote_branches
        )?;
        writeln!(f, "  Tags:     {}", self.tags)?;
        write!(f, "  Storage:  {}", human_size(self.size_kib))
    }
}

/// Refresh remote-tracking refs and compact the object store.
///
/// Runs `fetch <remote> --prune --prune-tags` when the remote exists, then
/// `gc --prune=now`.
pub fn perform_maintenance(repo_root: &Path, remote: &str) -> Result<()> {
    if remote_url(repo_root, remote).is_some() {
        info!(remote, "pruning remote-tracking refs");
        run_git(repo_root, &["fetch", remote, "--prune", "--prune-tags"])
            .map_err(maintenance_error)?;
    }

    info!("collecting garbage");
    run_git(repo_root, &["gc", "--prune=now", "--quiet"]).map_err(maintenance_error)?;

    Ok(())
}

fn maintenance_error(err: CleanError) -> CleanError {
    match err {
        CleanError::GitError(detail) => CleanError::GitError(format!("maintenance failed: {}", detail)),
        other => other,
    }
}
