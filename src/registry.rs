// src/registry.rs

//! Organisation registry and source lookup.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ContentType, OrganisationConfig, SourceConfig};

/// Read-only lookup of a monitor's source configuration.
pub trait SourceResolver: Send + Sync {
    /// Resolve the named page or channel of an organisation.
    ///
    /// Returns `None` when the organisation or the source is not configured.
    fn resolve(&self, code: &str, content_type: ContentType, name: &str) -> Option<SourceConfig>;
}

/// All configured organisations, keyed by code.
#[derive(Debug, Clone, Default)]
pub struct OrganisationRegistry {
    organisations: BTreeMap<String, OrganisationConfig>,
}

impl OrganisationRegistry {
    pub fn new(organisations: impl IntoIterator<Item = OrganisationConfig>) -> Self {
        Self {
            organisations: organisations
                .into_iter()
                .map(|org| (org.code.clone(), org))
                .collect(),
        }
    }

    /// Load every `*.toml` file in a directory as one organisation.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut organisations = Vec::new();

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        for path in paths {
            let org = OrganisationConfig::load(&path)
                .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;
            log::debug!(
                "Loaded organisation {} ({} sources) from {}",
                org.code,
                org.source_count(),
                path.display()
            );
            organisations.push(org);
        }

        let registry = Self::new(organisations);
        if registry.organisations.is_empty() {
            log::warn!("No organisation files found in {}", dir.display());
        }
        Ok(registry)
    }

    pub fn get(&self, code: &str) -> Option<&OrganisationConfig> {
        self.organisations.get(code)
    }

    pub fn organisations(&self) -> impl Iterator<Item = &OrganisationConfig> {
        self.organisations.values()
    }

    pub fn len(&self) -> usize {
        self.organisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisations.is_empty()
    }

    /// Validate all organisations.
    pub fn validate(&self) -> Result<()> {
        for org in self.organisations.values() {
            if org.code.trim().is_empty() {
                return Err(AppError::validation("Organisation with empty code"));
            }

            let mut names = HashSet::new();
            for page in &org.pages {
                if !names.insert(page.name.as_str()) {
                    return Err(AppError::validation(format!(
                        "{}: duplicate page '{}'",
                        org.code, page.name
                    )));
                }
                Url::parse(&page.url).map_err(|e| {
                    AppError::validation(format!("{}: page '{}' url: {e}", org.code, page.name))
                })?;
            }

            names.clear();
            for channel in &org.channels {
                if !names.insert(channel.name.as_str()) {
                    return Err(AppError::validation(format!(
                        "{}: duplicate channel '{}'",
                        org.code, channel.name
                    )));
                }
                if channel.channel_id.trim().is_empty() {
                    return Err(AppError::validation(format!(
                        "{}: channel '{}' has no channel_id",
                        org.code, channel.name
                    )));
                }
                Url::parse(&channel.url()).map_err(|e| {
                    AppError::validation(format!(
                        "{}: channel '{}' url: {e}",
                        org.code, channel.name
                    ))
                })?;
            }
        }
        Ok(())
    }
}

impl SourceResolver for OrganisationRegistry {
    fn resolve(&self, code: &str, content_type: ContentType, name: &str) -> Option<SourceConfig> {
        let org = self.get(code)?;
        match content_type {
            ContentType::Publication => org.page(name).map(|page| org.page_source(page)),
            ContentType::Video => org.channel(name).map(|channel| org.channel_source(channel)),
        }
    }
}
