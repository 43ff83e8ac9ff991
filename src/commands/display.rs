//! Display and formatting utilities for clean command output.
//!
//! Everything here renders to a `String`; the caller decides where it goes.

use super::types::KindResult;
use crate::deletion::{FailureCategory, classify};
use crate::refs::{CleanupPlan, RefItem, RefKind};
use crate::stats::{RepositoryStats, human_size};
use chrono::DateTime;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Above this many candidates the preview is folded into counts unless verbose.
pub const PREVIEW_FOLD_THRESHOLD: usize = 10;

/// Above this many refs of one kind the preview groups them by day.
pub const DATE_GROUP_THRESHOLD: usize = 50;

/// Names listed per failure group before eliding the rest.
const MAX_NAMES_PER_GROUP: usize = 20;

pub fn render_repo_info(
    repo_root: &Path,
    branch: Option<&str>,
    remote: &str,
    remote_url: Option<&str>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}", repo_root.display());
    let _ = writeln!(out, "Branch:     {}", branch.unwrap_or("(detached HEAD)"));
    let _ = write!(
        out,
        "Remote:     {} ({})",
        remote,
        remote_url.unwrap_or("not configured")
    );
    out
}

/// Candidate preview. Large plans fold into per-kind counts unless `verbose`.
pub fn render_preview(plan: &CleanupPlan, verbose: bool) -> String {
    let total = plan.total();
    let mut out = String::new();

    if !verbose && total > PREVIEW_FOLD_THRESHOLD {
        let _ = writeln!(out, "Candidates ({} deletions):", total);
        for kind in RefKind::ALL {
            let count = plan.candidates(kind).len();
            if count > 0 {
                let _ = writeln!(out, "  {}: {}", kind.label(), count);
            }
        }
        let _ = write!(out, "\nRun with --verbose to list every ref.");
        return out;
    }

    for kind in RefKind::ALL {
        let items = plan.candidates(kind);
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} ({}):", kind.label(), items.len());
        out.push_str(&render_items(items));
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// One line per ref; grouped under day headings when there are many.
pub fn render_items(items: &[RefItem]) -> String {
    let mut out = String::new();

    if items.len() <= DATE_GROUP_THRESHOLD {
        for item in items {
            let _ = writeln!(out, "  - {}", describe(item));
        }
        return out;
    }

    let mut groups: BTreeMap<String, Vec<&RefItem>> = BTreeMap::new();
    for item in items {
        groups.entry(day_of(item.timestamp_unix)).or_default().push(item);
    }
    for (day, group) in groups {
        let _ = writeln!(out, "  {} ({}):", day, group.len());
        for item in group {
            let _ = writeln!(out, "    - {}", describe(item));
        }
    }
    out
}

fn describe(item: &RefItem) -> String {
    let mut line = format!("{} - {}", item.name, item.timestamp_display);
    if !item.subject.is_empty() {
        let _ = write!(line, " | {}", item.subject);
    }
    if !item.author.is_empty() {
        let _ = write!(line, " ({})", item.author);
    }
    line
}

/// `YYYY-MM-DD` in UTC.
fn day_of(timestamp_unix: i64) -> String {
    DateTime::from_timestamp(timestamp_unix, 0)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

/// Totals per kind, then failures grouped by cause with a hint for each.
pub fn render_results(results: &[KindResult], verbose: bool) -> String {
    let deleted: usize = results.iter().map(|r| r.result.success_count).sum();
    let failed: usize = results.iter().map(|r| r.result.failed_count).sum();

    let mut out = String::new();
    let _ = writeln!(out, "Results:");
    let _ = writeln!(out, "  Deleted: {}", deleted);
    let _ = writeln!(out, "  Failed:  {}", failed);
    for entry in results {
        let _ = writeln!(
            out,
            "  {}: {} deleted, {} failed",
            entry.kind.label(),
            entry.result.success_count,
            entry.result.failed_count
        );
    }

    if failed > 0 {
        out.push('\n');
        out.push_str(&render_failure_groups(results, verbose));
    }

    out.trim_end().to_string()
}

fn render_failure_groups(results: &[KindResult], verbose: bool) -> String {
    struct Group<'a> {
        names: Vec<String>,
        sample: &'a str,
    }

    let mut groups: BTreeMap<FailureCategory, Group<'_>> = BTreeMap::new();
    for entry in results {
        for item in &entry.result.failed_items {
            let group = groups.entry(classify(&item.error)).or_insert_with(|| Group {
                names: Vec::new(),
                sample: &item.error,
            });
            group.names.push(format!("{} ({})", item.name, entry.kind));
        }
    }

    let mut out = String::from("Failures by cause:\n");
    for (category, group) in &groups {
        let _ = writeln!(out, "  [{}] {} ref(s)", category, group.names.len());
        if let Some(hint) = category.hint() {
            let _ = writeln!(out, "    hint: {}", hint);
        }
        if verbose || category.known().is_none() {
            for line in group.sample.lines().take(3) {
                let _ = writeln!(out, "    > {}", line);
            }
        }

        let shown = if verbose {
            group.names.len()
        } else {
            MAX_NAMES_PER_GROUP
        };
        for name in group.names.iter().take(shown) {
            let _ = writeln!(out, "    - {}", name);
        }
        if group.names.len() > shown {
            let _ = writeln!(out, "    ... and {} more", group.names.len() - shown);
        }
    }
    out
}

/// Before/after statistics with the difference.
pub fn render_comparison(before: &RepositoryStats, after: &RepositoryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "After cleanup:");
    let _ = writeln!(out, "{}", after);
    let _ = writeln!(out, "Change:");
    let _ = writeln!(
        out,
        "  Branches: -{}",
        before.branches().saturating_sub(after.branches())
    );
    let _ = writeln!(out, "  Tags:     -{}", before.tags.saturating_sub(after.tags));
    let _ = write!(
        out,
        "  Storage:  {} -> {}",
        human_size(before.size_kib),
        human_size(after.size_kib)
    );
    out
}
