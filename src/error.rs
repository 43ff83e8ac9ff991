//! Error types for the branch-clean CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Per-ref deletion failures are never errors; they are collected as data in
//! [`crate::deletion::AggregateResult`]. Only conditions that abort a run live here.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for branch-clean operations.
#[derive(Error, Debug)]
pub enum CleanError {
    /// User provided invalid arguments or configuration, or ran outside a repository.
    #[error("{0}")]
    UserError(String),

    /// Git could not be run, or a git operation the run depends on failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// The run completed but some refs could not be deleted.
    #[error("{failed} ref(s) could not be deleted")]
    PartialFailure { failed: usize },
}

impl CleanError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CleanError::UserError(_) => exit_codes::USER_ERROR,
            CleanError::GitError(_) => exit_codes::GIT_FAILURE,
            CleanError::PartialFailure { .. } => exit_codes::PARTIAL_FAILURE,
        }
    }
}

/// Result type alias for branch-clean operations.
pub type Result<T> = std::result::Result<T, CleanError>;
