//! Batched, bounded-concurrency deletion.
//!
//! Items are cut into consecutive batches. Each batch is first deleted with a
//! single request; when that request fails, every item of the batch is
//! retried on its own, at most `max_concurrency` at a time, so each failure
//! is pinned on the ref that caused it. Results are folded into one
//! [`AggregateResult`] by this control flow only, after each wave joins.

use super::executor::{DeleteFailure, RefDeleter};
use super::types::{AggregateResult, DeleteScope, DeletionOutcome, DeletionPolicy};
use crate::error::{CleanError, Result};
use crate::refs::RefItem;
use std::thread;
use tracing::{debug, info, warn};

/// Progress snapshot handed to the observer after each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub batch: usize,
    pub batches: usize,
    pub processed: usize,
    pub failed: usize,
    pub total: usize,
}

/// Deletes many refs of one kind according to a [`DeletionPolicy`].
pub struct BatchDeleter<'a, D: RefDeleter + ?Sized> {
    deleter: &'a D,
    policy: DeletionPolicy,
    scope: DeleteScope,
    observer: Option<&'a (dyn Fn(BatchProgress) + Sync)>,
}

impl<'a, D: RefDeleter + ?Sized> BatchDeleter<'a, D> {
    pub fn new(deleter: &'a D, policy: DeletionPolicy, scope: DeleteScope) -> Self {
        Self {
            deleter,
            policy,
            scope,
            observer: None,
        }
    }

    /// Report progress to `observer` after every batch.
    pub fn with_observer(mut self, observer: &'a (dyn Fn(BatchProgress) + Sync)) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Delete every item and report the totals.
    ///
    /// Item failures are recorded in the result and never stop the run.
    /// `Err` means the executor itself could not run; nothing after that
    /// point was attempted.
    pub fn run(&self, items: &[RefItem]) -> Result<AggregateResult> {
        let mut result = AggregateResult::default();
        if items.is_empty() {
            return Ok(result);
        }

        let batch_size = self.policy.batch_size.max(1);
        let batches = items.len().div_ceil(batch_size);

        for (index, batch) in items.chunks(batch_size).enumerate() {
            let names: Vec<&str> = batch.iter().map(|item| item.name.as_str()).collect();
            let batch_result = self.delete_batch(&names)?;

            result.merge(batch_result);
            info!(
                scope = %self.scope,
                batch = index + 1,
                batches,
                deleted = result.success_count,
                failed = result.failed_count,
                remaining = items.len() - result.total(),
                "batch finished"
            );
            if let Some(observer) = self.observer {
                observer(BatchProgress {
                    batch: index + 1,
                    batches,
                    processed: result.total(),
                    failed: result.failed_count,
                    total: items.len(),
                });
            }

            if index + 1 < batches && !self.policy.inter_batch_delay.is_zero() {
                thread::sleep(self.policy.inter_batch_delay);
            }
        }

        Ok(result)
    }

    fn delete_batch(&self, names: &[&str]) -> Result<AggregateResult> {
        let mut result = AggregateResult::default();

        match self.deleter.delete_batch(names) {
            Ok(()) => {
                for name in names {
                    result.record(DeletionOutcome::succeeded(*name), self.scope);
                }
                return Ok(result);
            }
            Err(DeleteFailure::Fatal(err)) => return Err(err),
            Err(failure) => {
                let message = failure.to_string();
                warn!(
                    scope = %self.scope,
                    size = names.len(),
                    error = %first_line(&message),
                    "batch deletion failed, retrying refs one at a time"
                );
            }
        }

        for wave in names.chunks(self.policy.max_concurrency.max(1)) {
            for outcome in self.run_wave(wave)? {
                result.record(outcome, self.scope);
            }
        }

        Ok(result)
    }

    /// Delete each name on its own thread and wait for all of them.
    fn run_wave(&self, names: &[&str]) -> Result<Vec<DeletionOutcome>> {
        debug!(scope = %self.scope, size = names.len(), "starting wave");

        let attempts: Vec<(&str, std::result::Result<(), DeleteFailure>)> = thread::scope(|s| {
            let handles: Vec<_> = names
                .iter()
                .map(|&name| (name, s.spawn(move || self.deleter.delete_one(name))))
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| {
                    let attempt = handle.join().unwrap_or_else(|_| {
                        Err(DeleteFailure::Rejected(format!(
                            "deletion of '{}' panicked",
                            name
                        )))
                    });
                    (name, attempt)
                })
                .collect()
        });

        let mut outcomes = Vec::with_capacity(attempts.len());
        let mut fatal: Option<CleanError> = None;
        for (name, attempt) in attempts {
            match attempt {
                Ok(()) => outcomes.push(DeletionOutcome::succeeded(name)),
                Err(DeleteFailure::Fatal(err)) => {
                    fatal.get_or_insert(err);
                }
                Err(failure) => outcomes.push(DeletionOutcome::failed(name, failure.to_string())),
            }
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(outcomes),
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
