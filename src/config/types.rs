//! Configuration types and defaults.
//!
//! This module defines enums, override structs, and default value functions
//! used by the CleanConfig struct.

use crate::deletion::{DeleteScope, DeletionPolicy};
use crate::refs::RefKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which kinds of refs a run cleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanTarget {
    /// Every kind below.
    All,
    /// Local branches.
    Local,
    /// Remote branches.
    Remote,
    /// Tags, locally and on the remote.
    Tags,
}

impl CleanTarget {
    /// Parse a clean target from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            "tags" => Some(Self::Tags),
            _ => None,
        }
    }

    /// True if this target selects refs of `kind`.
    pub fn covers(self, kind: RefKind) -> bool {
        match self {
            CleanTarget::All => true,
            CleanTarget::Local => kind == RefKind::LocalBranch,
            CleanTarget::Remote => kind == RefKind::RemoteBranch,
            CleanTarget::Tags => kind.is_tag(),
        }
    }
}

/// Partial [`DeletionPolicy`] read from the config file. Missing fields
/// keep the scope's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inter_batch_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl PolicyOverrides {
    pub fn resolve(&self, scope: DeleteScope) -> DeletionPolicy {
        let defaults = DeletionPolicy::defaults_for(scope);
        DeletionPolicy {
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            inter_batch_delay: self
                .inter_batch_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.inter_batch_delay),
            timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Values given on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub days: Option<u32>,
    pub protected_branches: Option<Vec<String>>,
    pub force_delete_branches: Option<Vec<String>>,
    pub clean_targets: Option<Vec<CleanTarget>>,
    pub remote_name: Option<String>,
    pub dry_run: bool,
    pub skip_maintenance: bool,
}

/// File names searched, in order, under the repository root.
pub const CONFIG_FILE_CANDIDATES: &[&str] = &[
    "branch-clean.config.json",
    ".branch-clean.config.json",
    "config/branch-clean.config.json",
    "branch-clean.config.yaml",
];

pub fn default_days() -> u32 {
    365
}

pub fn default_protected_branches() -> Vec<String> {
    ["production", "staging", "master", "main", "develop"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_remote_name() -> String {
    "origin".to_string()
}

pub fn default_clean_targets() -> Vec<CleanTarget> {
    vec![CleanTarget::All]
}

pub fn default_true() -> bool {
    true
}
