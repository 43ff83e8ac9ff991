//! Configuration model for branch-clean.
//!
//! This module defines the CleanConfig struct that represents
//! `branch-clean.config.json`. It supports forward-compatible parsing (unknown
//! keys are ignored), the defaults of an unconfigured run, command-line
//! overrides, and validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::CleanConfig;
pub use operations::find_config_file;
pub use types::{CleanTarget, ConfigOverrides, PolicyOverrides};
