//! Candidate selection.
//!
//! Applies the age cutoff and the protection rules to listed refs and
//! gathers the result into a [`CleanupPlan`], oldest refs first.

use super::{RefItem, RefKind, list_refs};
use crate::config::CleanConfig;
use crate::deletion::DeleteScope;
use crate::error::Result;
use crate::git::{current_branch, remote_url};
use crate::protection::{ProtectionConfig, ProtectionFilter};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{debug, warn};

/// Unix timestamp before which refs are stale.
pub fn cutoff_timestamp(days: u32, now: DateTime<Utc>) -> i64 {
    (now - Duration::days(i64::from(days))).timestamp()
}

/// Refs strictly older than `cutoff` that are not protected, oldest first.
/// Refs with the same timestamp keep their listing order.
pub fn select_candidates(
    items: Vec<RefItem>,
    cutoff: i64,
    protection: &ProtectionConfig,
) -> Vec<RefItem> {
    let filter = ProtectionFilter::new(protection);

    let mut candidates: Vec<RefItem> = items
        .into_iter()
        .filter(|item| item.timestamp_unix < cutoff)
        .filter(|item| {
            let protected = filter.is_protected(&item.name);
            if protected {
                debug!(name = %item.name, "skipping protected ref");
            }
            !protected
        })
        .collect();

    candidates.sort_by_key(|item| item.timestamp_unix);
    candidates
}

/// Deletion candidates for every ref kind of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    pub local_branches: Vec<RefItem>,
    pub remote_branches: Vec<RefItem>,
    pub local_tags: Vec<RefItem>,
    pub remote_tags: Vec<RefItem>,
}

impl CleanupPlan {
    pub fn candidates(&self, kind: RefKind) -> &[RefItem] {
        match kind {
            RefKind::LocalBranch => &self.local_branches,
            RefKind::RemoteBranch => &self.remote_branches,
            RefKind::LocalTag => &self.local_tags,
            RefKind::RemoteTag => &self.remote_tags,
        }
    }

    fn candidates_mut(&mut self, kind: RefKind) -> &mut Vec<RefItem> {
        match kind {
            RefKind::LocalBranch => &mut self.local_branches,
            RefKind::RemoteBranch => &mut self.remote_branches,
            RefKind::LocalTag => &mut self.local_tags,
            RefKind::RemoteTag => &mut self.remote_tags,
        }
    }

    /// Deletions the plan will issue, counting a tag once per place it lives.
    pub fn total(&self) -> usize {
        RefKind::ALL
            .iter()
            .map(|kind| self.candidates(*kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// List and filter every kind the config selects.
///
/// The checked-out branch is never a candidate. Remote kinds are skipped
/// with a warning when the configured remote does not exist.
pub fn build_cleanup_plan(
    repo_root: &Path,
    config: &CleanConfig,
    now: DateTime<Utc>,
) -> Result<CleanupPlan> {
    let cutoff = cutoff_timestamp(config.days, now);
    let remote_exists = remote_url(repo_root, &config.remote_name).is_some();
    let checked_out = current_branch(repo_root)?;
    let mut plan = CleanupPlan::default();

    for kind in RefKind::ALL {
        if !config.cleans(kind) {
            continue;
        }
        if kind.scope() == DeleteScope::Remote && !remote_exists {
            warn!(
                remote = %config.remote_name,
                kind = %kind,
                "remote is not configured, skipping"
            );
            continue;
        }

        let mut items = list_refs(repo_root, kind, &config.remote_name)?;
        if kind == RefKind::LocalBranch
            && let Some(branch) = &checked_out
        {
            items.retain(|item| &item.name != branch);
        }

        let listed = items.len();
        let candidates = select_candidates(items, cutoff, &config.protection_for(kind));
        debug!(kind = %kind, listed, candidates = candidates.len(), "planned");
        *plan.candidates_mut(kind) = candidates;
    }

    Ok(plan)
}
