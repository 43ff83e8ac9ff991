//! CleanConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a cleanup run.
///
/// This struct represents the contents of `branch-clean.config.json` (or its
/// YAML twin). Keys are camelCase; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanConfig {
    // =========================================================================
    // Selection
    // =========================================================================
    /// Refs older than this many days are candidates.
    #[serde(default = "default_days")]
    pub days: u32,

    /// Which kinds of refs to clean.
    #[serde(default = "default_clean_targets")]
    pub clean_targets: Vec<CleanTarget>,

    /// Whether tags are cleaned at all.
    #[serde(default = "default_true")]
    pub include_tags: bool,

    // =========================================================================
    // Protection
    // =========================================================================
    #[serde(default = "default_protected_branches")]
    pub protected_branches: Vec<String>,

    /// Branch patterns deleted even when they match a protected pattern.
    pub force_delete_branches: Vec<String>,

    pub protected_tags: Vec<String>,

    pub force_delete_tags: Vec<String>,

    // =========================================================================
    // Remote and run mode
    // =========================================================================
    #[serde(default = "default_remote_name")]
    pub remote_name: String,

    /// List candidates without deleting anything.
    pub dry_run: bool,

    /// Prune and garbage-collect after deleting.
    #[serde(default = "default_true")]
    pub cleanup_after_delete: bool,

    // =========================================================================
    // Deletion engine
    // =========================================================================
    pub local_deletion: PolicyOverrides,

    pub remote_deletion: PolicyOverrides,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            clean_targets: default_clean_targets(),
            include_tags: default_true(),
            protected_branches: default_protected_branches(),
            force_delete_branches: Vec::new(),
            protected_tags: Vec::new(),
            force_delete_tags: Vec::new(),
            remote_name: default_remote_name(),
            dry_run: false,
            cleanup_after_delete: default_true(),
            local_deletion: PolicyOverrides::default(),
            remote_deletion: PolicyOverrides::default(),
        }
    }
}
