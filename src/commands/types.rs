//! Types for the clean command.

use crate::deletion::AggregateResult;
use crate::refs::RefKind;

/// Run options that only affect the command flow, not the config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// List every candidate and every failed ref.
    pub verbose: bool,
}

/// Deletion totals for one ref kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindResult {
    pub kind: RefKind,
    pub result: AggregateResult,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No ref matched the selection.
    NothingToClean,
    /// Candidates were listed; nothing was deleted.
    Previewed,
    /// The user declined the confirmation prompt.
    Cancelled,
    /// Deletions ran (possibly with failures).
    Completed,
}

/// Summary of a clean run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSummary {
    pub outcome: RunOutcome,
    pub results: Vec<KindResult>,
}

impl CleanSummary {
    pub fn without_deletions(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            results: Vec::new(),
        }
    }

    pub fn deleted_count(&self) -> usize {
        self.results.iter().map(|r| r.result.success_count).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().map(|r| r.result.failed_count).sum()
    }
}
