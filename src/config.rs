//! Run configuration loaded from TOML.
//!
//! Lookup order: an explicit `--config` file (which must exist), then
//! `.ownmap.toml` in the analysis root, then built-in defaults.
//! Command-line flags are applied on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analyzer::default_concurrency;
use crate::error::OwnershipError;
use crate::report::ReportMode;

pub const CONFIG_FILE_NAME: &str = ".ownmap.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const UNMAPPED_FILE_NAME: &str = "unmapped_users.csv";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Alias table (`display name, team, alias...`).
    pub mapping_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Defaults to `<output_dir>/unmapped_users.csv`.
    pub unmapped_file: Option<PathBuf>,
    /// Entry names skipped at every level of the tree.
    pub ignore: Vec<String>,
    pub concurrency: Option<usize>,
    pub report: ReportMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapping_file: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            unmapped_file: None,
            ignore: vec![".git".to_string()],
            concurrency: None,
            report: ReportMode::User,
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, OwnershipError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, OwnershipError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            OwnershipError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&contents)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, else `<root>/.ownmap.toml` if present,
    /// else defaults.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self, OwnershipError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Self::from_file(&candidate);
        }
        log::debug!("no {CONFIG_FILE_NAME} in {}, using defaults", root.display());
        Ok(Self::default())
    }

    /// Worker count, at least 1.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency
            .map(|n| n.max(1))
            .unwrap_or_else(default_concurrency)
    }

    pub fn unmapped_file_path(&self) -> PathBuf {
        self.unmapped_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(UNMAPPED_FILE_NAME))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
