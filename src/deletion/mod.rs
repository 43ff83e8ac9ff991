//! Bulk ref deletion engine.
//!
//! - [`executor`]: the [`RefDeleter`] capability and its git implementation
//! - [`batch`]: batching, per-item fallback and bounded concurrency
//! - [`classify`]: grouping keys for failure messages
//!
//! The engine never treats a single failed ref as an error. Failures are
//! returned as data in [`AggregateResult`]; only an executor that cannot run
//! at all aborts a run.

pub mod batch;
pub mod classify;
pub mod executor;
mod types;


pub use batch::{BatchDeleter, BatchProgress};
pub use classify::{FailureCategory, KnownCause, classify};
pub use executor::{DeleteFailure, GitRefDeleter, RefDeleter};
pub use types::{AggregateResult, DeleteScope, DeletionOutcome, DeletionPolicy, FailedItem};
