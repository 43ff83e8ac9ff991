//! Implementation of the clean command.
//!
//! The run is a fixed sequence:
//! - resolve the repository and load the config
//! - snapshot repository statistics
//! - list and plan candidates per ref kind
//! - preview, then stop in preview mode or ask for confirmation
//! - delete through the batch engine, kind by kind
//! - report, prune and garbage-collect, compare statistics
//!
//! Failed refs do not stop the run. They are reported grouped by cause and
//! turn the final result into [`CleanError::PartialFailure`].

mod confirm;
mod display;
mod execution;
mod types;


use crate::cli::Cli;
use crate::config::CleanConfig;
use crate::error::{CleanError, Result};
use crate::git::{current_branch, get_repo_root, remote_url};
use crate::refs::build_cleanup_plan;
use crate::stats::{RepositoryStats, perform_maintenance};
use chrono::Utc;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::{debug, info};

use types::{CleanSummary, RunOptions, RunOutcome};

use confirm::confirm;
use display::{render_comparison, render_preview, render_repo_info, render_results};
use execution::{execute_plan, spinner};

/// Execute a clean run for the repository containing the current directory.
pub fn cmd_clean(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        CleanError::UserError(format!("failed to determine current directory: {}", e))
    })?;
    let repo_root = get_repo_root(&cwd)?;

    let mut config = CleanConfig::resolve(&repo_root, cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides())?;
    debug!(?config, "effective config");

    let options = RunOptions {
        yes: cli.yes,
        verbose: cli.verbose,
    };
    let summary = run_clean(&repo_root, &config, options, &mut io::stdin().lock())?;
    info!(
        outcome = ?summary.outcome,
        deleted = summary.deleted_count(),
        failed = summary.failed_count(),
        "clean finished"
    );

    match summary.failed_count() {
        0 => Ok(()),
        failed => Err(CleanError::PartialFailure { failed }),
    }
}

/// Run the clean flow against `repo_root`, reading the confirmation from
/// `input`.
pub fn run_clean<R: BufRead>(
    repo_root: &Path,
    config: &CleanConfig,
    options: RunOptions,
    input: &mut R,
) -> Result<CleanSummary> {
    let branch = current_branch(repo_root)?;
    let url = remote_url(repo_root, &config.remote_name);
    println!(
        "{}",
        render_repo_info(repo_root, branch.as_deref(), &config.remote_name, url.as_deref())
    );
    println!();

    let before = collect_stats(repo_root);
    println!("Before cleanup:");
    println!("{}", before);
    println!();

    let plan = build_cleanup_plan(repo_root, config, Utc::now())?;
    if plan.is_empty() {
        println!(
            "Nothing to clean: no unprotected refs older than {} days.",
            config.days
        );
        return Ok(CleanSummary::without_deletions(RunOutcome::NothingToClean));
    }

    println!("{}", render_preview(&plan, options.verbose));
    println!();

    if config.dry_run {
        println!("Preview only: nothing was deleted.");
        return Ok(CleanSummary::without_deletions(RunOutcome::Previewed));
    }

    if !options.yes {
        let question = format!("Delete {} ref(s)?", plan.total());
        if !confirm(&question, input, &mut io::stdout())? {
            println!("Cancelled.");
            return Ok(CleanSummary::without_deletions(RunOutcome::Cancelled));
        }
    }

    let results = execute_plan(repo_root, config, &plan)?;
    println!("{}", render_results(&results, options.verbose));
    println!();

    if config.cleanup_after_delete {
        let progress = spinner("Pruning and collecting garbage...".to_string());
        let maintenance = perform_maintenance(repo_root, &config.remote_name);
        progress.finish_and_clear();
        maintenance?;
    }

    let after = collect_stats(repo_root);
    println!("{}", render_comparison(&before, &after));

    Ok(CleanSummary {
        outcome: RunOutcome::Completed,
        results,
    })
}

fn collect_stats(repo_root: &Path) -> RepositoryStats {
    let progress = spinner("Gathering repository statistics...".to_string());
    let stats = RepositoryStats::collect(repo_root);
    progress.finish_and_clear();
    stats
}
