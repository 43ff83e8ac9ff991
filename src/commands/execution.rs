//! Deletion of planned refs with progress reporting.

use super::types::KindResult;
use crate::config::CleanConfig;
use crate::deletion::{BatchDeleter, BatchProgress, GitRefDeleter};
use crate::error::Result;
use crate::refs::{CleanupPlan, RefKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Delete every planned ref, kind by kind.
///
/// Local refs go first so a tag is removed locally before the remote copy.
/// Item failures are collected; a fatal executor error stops the run.
pub fn execute_plan(
    repo_root: &Path,
    config: &CleanConfig,
    plan: &CleanupPlan,
) -> Result<Vec<KindResult>> {
    let mut results = Vec::new();

    for kind in [
        RefKind::LocalBranch,
        RefKind::LocalTag,
        RefKind::RemoteBranch,
        RefKind::RemoteTag,
    ] {
        let items = plan.candidates(kind);
        if items.is_empty() {
            continue;
        }

        let policy = config.deletion_policy(kind.scope());
        let deleter = GitRefDeleter::new(repo_root, kind, &config.remote_name, policy.timeout);

        let spinner = spinner(format!("Deleting {} {}...", items.len(), kind.label().to_lowercase()));
        let observer = |progress: BatchProgress| {
            spinner.set_message(format!(
                "{}: batch {}/{}, {}/{} processed, {} failed",
                kind.label(),
                progress.batch,
                progress.batches,
                progress.processed,
                progress.total,
                progress.failed
            ));
        };

        let outcome = BatchDeleter::new(&deleter, policy, kind.scope())
            .with_observer(&observer)
            .run(items);
        spinner.finish_and_clear();
        let result = outcome?;

        info!(
            kind = %kind,
            deleted = result.success_count,
            failed = result.failed_count,
            "deletion finished"
        );
        results.push(KindResult { kind, result });
    }

    Ok(results)
}

/// Steady-ticking spinner on stderr; hidden when stderr is not a terminal.
pub fn spinner(message: String) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        progress.set_style(style);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
