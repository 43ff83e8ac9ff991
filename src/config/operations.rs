//! Config loading, validation, and derived settings.

use super::model::CleanConfig;
use super::types::{CONFIG_FILE_CANDIDATES, ConfigOverrides};
use crate::deletion::{DeleteScope, DeletionPolicy};
use crate::error::{CleanError, Result};
use crate::protection::ProtectionConfig;
use crate::refs::RefKind;
use std::path::{Path, PathBuf};
use tracing::debug;

impl CleanConfig {
    /// Load config from a file. `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON.
    ///
    /// # Returns
    ///
    /// * `Ok(CleanConfig)` - Successfully loaded and validated config
    /// * `Err(CleanError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            CleanError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        };
        config.map_err(|e| CleanError::UserError(format!("{} ({})", e, path.display())))
    }

    /// Parse config from a JSON string. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CleanConfig = serde_json::from_str(json)
            .map_err(|e| CleanError::UserError(format!("failed to parse config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse config from a YAML string. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: CleanConfig = if yaml.trim().is_empty() {
            CleanConfig::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| CleanError::UserError(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the explicit `path` if given, else the first discovered config
    /// file, else the defaults.
    pub fn resolve(repo_root: &Path, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match find_config_file(repo_root) {
                Some(found) => {
                    debug!(path = %found.display(), "using config file");
                    Self::load(found)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Apply command-line values on top of the file values, then re-validate.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(days) = overrides.days {
            self.days = days;
        }
        if let Some(patterns) = &overrides.protected_branches {
            self.protected_branches = patterns.clone();
        }
        if let Some(patterns) = &overrides.force_delete_branches {
            self.force_delete_branches = patterns.clone();
        }
        if let Some(targets) = &overrides.clean_targets {
            self.clean_targets = targets.clone();
        }
        if let Some(remote) = &overrides.remote_name {
            self.remote_name = remote.clone();
        }
        if overrides.dry_run {
            self.dry_run = true;
        }
        if overrides.skip_maintenance {
            self.cleanup_after_delete = false;
        }

        self.validate()
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `remoteName` must be non-empty
    /// - `cleanTargets` must be non-empty
    /// - batch size, concurrency and timeout must be positive in both scopes
    pub fn validate(&self) -> Result<()> {
        if self.remote_name.trim().is_empty() {
            return Err(CleanError::UserError(
                "config validation failed: remoteName must not be empty".to_string(),
            ));
        }

        if self.clean_targets.is_empty() {
            return Err(CleanError::UserError(
                "config validation failed: cleanTargets must name at least one target".to_string(),
            ));
        }

        for (section, overrides) in [
            ("localDeletion", &self.local_deletion),
            ("remoteDeletion", &self.remote_deletion),
        ] {
            for (field, value) in [
                ("batchSize", overrides.batch_size.map(|v| v as u64)),
                ("maxConcurrency", overrides.max_concurrency.map(|v| v as u64)),
                ("timeoutMs", overrides.timeout_ms),
            ] {
                if value == Some(0) {
                    return Err(CleanError::UserError(format!(
                        "config validation failed: {}.{} must be greater than 0",
                        section, field
                    )));
                }
            }
        }

        Ok(())
    }

    /// True if this run cleans refs of `kind`.
    pub fn cleans(&self, kind: RefKind) -> bool {
        if kind.is_tag() && !self.include_tags {
            return false;
        }
        self.clean_targets.iter().any(|target| target.covers(kind))
    }

    pub fn deletion_policy(&self, scope: DeleteScope) -> DeletionPolicy {
        match scope {
            DeleteScope::Local => self.local_deletion.resolve(scope),
            DeleteScope::Remote => self.remote_deletion.resolve(scope),
        }
    }

    pub fn branch_protection(&self) -> ProtectionConfig {
        ProtectionConfig {
            protected_patterns: self.protected_branches.clone(),
            force_delete_patterns: self.force_delete_branches.clone(),
        }
    }

    pub fn tag_protection(&self) -> ProtectionConfig {
        ProtectionConfig {
            protected_patterns: self.protected_tags.clone(),
            force_delete_patterns: self.force_delete_tags.clone(),
        }
    }

    /// Protection rules that apply to refs of `kind`.
    pub fn protection_for(&self, kind: RefKind) -> ProtectionConfig {
        if kind.is_tag() {
            self.tag_protection()
        } else {
            self.branch_protection()
        }
    }
}

/// First existing config file under `repo_root`, if any.
pub fn find_config_file(repo_root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_CANDIDATES
        .iter()
        .map(|candidate| repo_root.join(candidate))
        .find(|path| path.is_file())
}
