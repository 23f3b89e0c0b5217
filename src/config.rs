// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading the application
//! configuration together with the organisation registry it points to.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::registry::OrganisationRegistry;

/// Resolve a configured path against the directory of the config file.
fn relative_to(base: &Path, path: &Path) -> std::path::PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load configuration and organisations, then validate both.
///
/// Relative paths in the configuration are taken relative to `base_path`.
pub fn load_all(config_path: &Path, base_path: &Path) -> Result<(Config, OrganisationRegistry)> {
    let mut config = Config::load_or_default(config_path);
    config.paths.organisations_dir = relative_to(base_path, &config.paths.organisations_dir);
    config.paths.storage_dir = relative_to(base_path, &config.paths.storage_dir);
    config.paths.listings_dir = relative_to(base_path, &config.paths.listings_dir);

    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    let registry = OrganisationRegistry::load_dir(&config.paths.organisations_dir)?;
    registry
        .validate()
        .map_err(|e| AppError::config(format!("Invalid organisation data: {e}")))?;

    Ok((config, registry))
}
