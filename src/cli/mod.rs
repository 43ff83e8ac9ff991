//! CLI argument parsing for branch-clean.
//!
//! Uses clap derive macros for declarative argument definitions.
//! The cleanup itself lives in the `commands` module.

use crate::config::{CleanTarget, ConfigOverrides};
use clap::Parser;
use std::path::PathBuf;

/// Branch-clean: delete stale git branches and tags.
///
/// Refs older than the age cutoff that match no protected pattern are
/// listed, confirmed, and deleted locally and on the remote in batches.
#[derive(Parser, Debug)]
#[command(name = "branch-clean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (JSON, or YAML by extension). Defaults to the first of
    /// branch-clean.config.json, .branch-clean.config.json,
    /// config/branch-clean.config.json, branch-clean.config.yaml.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Delete refs older than this many days.
    #[arg(short, long, value_name = "N")]
    pub days: Option<u32>,

    /// Protected branch patterns (comma-separated, `*` wildcards).
    #[arg(short, long, value_delimiter = ',', value_name = "LIST")]
    pub protected: Option<Vec<String>>,

    /// Branch patterns deleted even when protected (comma-separated).
    #[arg(short, long, value_delimiter = ',', value_name = "LIST")]
    pub force_delete: Option<Vec<String>>,

    /// What to clean: all, local, remote, tags (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "LIST", value_parser = parse_clean_target)]
    pub targets: Option<Vec<CleanTarget>>,

    /// Remote to delete from.
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// List the candidates and exit without deleting.
    #[arg(long)]
    pub preview_only: bool,

    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,

    /// Show every candidate and debug logs.
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip `fetch --prune` and `gc` after deleting.
    #[arg(long)]
    pub no_maintenance: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Config values given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            days: self.days,
            protected_branches: self.protected.as_ref().map(|p| trimmed(p)),
            force_delete_branches: self.force_delete.as_ref().map(|p| trimmed(p)),
            clean_targets: self.targets.clone(),
            remote_name: self.remote.clone(),
            dry_run: self.preview_only,
            skip_maintenance: self.no_maintenance,
        }
    }
}

fn parse_clean_target(s: &str) -> Result<CleanTarget, String> {
    CleanTarget::from_str(s).ok_or_else(|| {
        format!(
            "invalid target '{}' (expected one of: all, local, remote, tags)",
            s.trim()
        )
    })
}

fn trimmed(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
