//! Exit code constants for the branch-clean CLI.
//!
//! - 0: Success (including "nothing to clean" and preview-only runs)
//! - 1: User error (bad args, bad config, not inside a repository)
//! - 2: Partial failure (the run completed but some refs could not be deleted)
//! - 3: Git operation failure (git could not be run, or maintenance failed)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or not inside a git repository.
pub const USER_ERROR: i32 = 1;

/// The deletion run finished but at least one ref failed to delete.
pub const PARTIAL_FAILURE: i32 = 2;

/// Git operation failure: git missing, listing refs failed, maintenance failed.
pub const GIT_FAILURE: i32 = 3;
