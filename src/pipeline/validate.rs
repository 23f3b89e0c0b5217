// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::registry::OrganisationRegistry;

/// Validate configuration and organisation files.
pub fn run_validate(config: &Config, registry: &OrganisationRegistry) -> Result<()> {
    log::info!("Validating configuration...");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");
    log::info!("    max_results: {}", config.checker.max_results);
    log::info!("    use_cache: {}", config.checker.use_cache);
    log::info!("    max_concurrent: {}", config.checker.max_concurrent);

    if let Err(e) = registry.validate() {
        log::error!("Organisation validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Organisations OK");
    for org in registry.organisations() {
        log::info!(
            "    {}: {} pages, {} channels",
            org.code,
            org.pages.len(),
            org.channels.len()
        );
    }

    Ok(())
}
