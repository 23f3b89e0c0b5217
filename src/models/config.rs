//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Check cycle settings
    #[serde(default)]
    pub checker: CheckerConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Snapshot write protection
    #[serde(default)]
    pub guard: GuardConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.checker.max_results == 0 {
            return Err(AppError::validation("checker.max_results must be > 0"));
        }
        if self.checker.max_concurrent == 0 {
            return Err(AppError::validation("checker.max_concurrent must be > 0"));
        }
        if self.guard.max_drop_percent > 100 {
            return Err(AppError::validation(
                "guard.max_drop_percent must be <= 100",
            ));
        }
        if self.paths.storage_dir.as_os_str().is_empty() {
            return Err(AppError::validation("paths.storage_dir is empty"));
        }
        Ok(())
    }
}

/// Check cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Upper bound of teasers requested per source
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Allow crawlers to reuse detail lookups (also enables video future filtering)
    #[serde(default = "defaults::use_cache")]
    pub use_cache: bool,

    /// Maximum number of monitors checked at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Delay after each finished check in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_results: defaults::max_results(),
            use_cache: defaults::use_cache(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
        }
    }
}

/// File locations, relative to the working directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of `<code>.toml` organisation files
    #[serde(default = "defaults::organisations_dir")]
    pub organisations_dir: PathBuf,

    /// Root of monitor state and snapshots
    #[serde(default = "defaults::storage_dir")]
    pub storage_dir: PathBuf,

    /// Root of captured listings read by the local crawler
    #[serde(default = "defaults::listings_dir")]
    pub listings_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            organisations_dir: defaults::organisations_dir(),
            storage_dir: defaults::storage_dir(),
            listings_dir: defaults::listings_dir(),
        }
    }
}

/// Snapshot guard thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Maximum allowed drop in item count, in percent
    #[serde(default = "defaults::max_drop_percent")]
    pub max_drop_percent: u8,

    /// Previous item count below which the drop check is skipped
    #[serde(default = "defaults::min_baseline")]
    pub min_baseline: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_drop_percent: defaults::max_drop_percent(),
            min_baseline: defaults::min_baseline(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn max_results() -> usize {
        20
    }
    pub fn use_cache() -> bool {
        true
    }
    pub fn max_concurrent() -> usize {
        4
    }

    pub fn organisations_dir() -> PathBuf {
        PathBuf::from("data/organisations")
    }
    pub fn storage_dir() -> PathBuf {
        PathBuf::from("storage")
    }
    pub fn listings_dir() -> PathBuf {
        PathBuf::from("data/listings")
    }

    pub fn max_drop_percent() -> u8 {
        50
    }
    pub fn min_baseline() -> usize {
        5
    }
}
