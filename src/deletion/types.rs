//! Data types shared by the deletion engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where a deletion happens. Remote deletions are slower and load a server,
/// so each scope carries its own [`DeletionPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteScope {
    Local,
    Remote,
}

impl fmt::Display for DeleteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteScope::Local => write!(f, "local"),
            DeleteScope::Remote => write!(f, "remote"),
        }
    }
}

/// Batching and throttling parameters for one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionPolicy {
    /// Names grouped into one batch deletion request.
    pub batch_size: usize,
    /// Upper bound on deletion requests in flight at once.
    pub max_concurrency: usize,
    /// Pause between consecutive batches (never after the last one).
    pub inter_batch_delay: Duration,
    /// Deadline for each individual deletion request.
    pub timeout: Duration,
}

impl DeletionPolicy {
    /// Defaults for the local ref store: large batches, no throttling.
    pub fn local_defaults() -> Self {
        Self {
            batch_size: 100,
            max_concurrency: 8,
            inter_batch_delay: Duration::ZERO,
            timeout: Duration::from_secs(30),
        }
    }

    /// Defaults for a remote: smaller batches, few parallel pushes, a pause
    /// between batches.
    pub fn remote_defaults() -> Self {
        Self {
            batch_size: 50,
            max_concurrency: 3,
            inter_batch_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn defaults_for(scope: DeleteScope) -> Self {
        match scope {
            DeleteScope::Local => Self::local_defaults(),
            DeleteScope::Remote => Self::remote_defaults(),
        }
    }
}

/// Result of one attempt to delete one ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub name: String,
    pub success: bool,
    pub raw_error: Option<String>,
}

impl DeletionOutcome {
    pub fn succeeded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            raw_error: None,
        }
    }

    pub fn failed(name: impl Into<String>, raw_error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            raw_error: Some(raw_error.into()),
        }
    }
}

/// A ref that could not be deleted, with the raw message that explains why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub name: String,
    pub error: String,
    pub scope: DeleteScope,
}

/// Totals for one deletion run.
///
/// `success_count + failed_count` always equals the number of submitted
/// items, and `failed_items` holds exactly `failed_count` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub failed_items: Vec<FailedItem>,
}

impl AggregateResult {
    /// Fold one outcome into the totals.
    pub fn record(&mut self, outcome: DeletionOutcome, scope: DeleteScope) {
        if outcome.success {
            self.success_count += 1;
        } else {
            self.failed_count += 1;
            self.failed_items.push(FailedItem {
                name: outcome.name,
                error: outcome.raw_error.unwrap_or_default(),
                scope,
            });
        }
    }

    /// Combine another run's totals into this one.
    pub fn merge(&mut self, other: AggregateResult) {
        self.success_count += other.success_count;
        self.failed_count += other.failed_count;
        self.failed_items.extend(other.failed_items);
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }
}
