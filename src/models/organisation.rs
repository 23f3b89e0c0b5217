//! Per-organisation source definitions.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An organisation and the sources it tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganisationConfig {
    /// Short organisation code (e.g., "acme")
    pub code: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Target sites used by sources that do not name their own
    #[serde(default)]
    pub sites: BTreeSet<String>,

    /// Publication listing pages
    #[serde(default)]
    pub pages: Vec<PageConfig>,

    /// Video channels
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl OrganisationConfig {
    /// Load one organisation from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn page(&self, name: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.name == name)
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Total number of configured sources.
    pub fn source_count(&self) -> usize {
        self.pages.len() + self.channels.len()
    }

    fn sites_or_default(&self, sites: &BTreeSet<String>) -> BTreeSet<String> {
        if sites.is_empty() {
            self.sites.clone()
        } else {
            sites.clone()
        }
    }

    /// Resolve a page into the source view a monitor consumes.
    pub fn page_source(&self, page: &PageConfig) -> SourceConfig {
        SourceConfig {
            name: page.name.clone(),
            title: page.title.clone(),
            url: page.url.clone(),
            sites: self.sites_or_default(&page.sites),
            keywords: BTreeSet::new(),
            channel_id: None,
        }
    }

    /// Resolve a channel into the source view a monitor consumes.
    pub fn channel_source(&self, channel: &ChannelConfig) -> SourceConfig {
        SourceConfig {
            name: channel.name.clone(),
            title: channel.title.clone(),
            url: channel.url(),
            sites: self.sites_or_default(&channel.sites),
            keywords: channel.keywords.clone(),
            channel_id: Some(channel.channel_id.clone()),
        }
    }
}

/// A publication listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page name, unique within the organisation
    pub name: String,

    /// URL of the listing page
    pub url: String,

    /// Optional display title
    #[serde(default)]
    pub title: Option<String>,

    /// Target sites; empty means the organisation default
    #[serde(default)]
    pub sites: BTreeSet<String>,
}

/// A video channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, unique within the organisation
    pub name: String,

    /// Platform channel identifier
    pub channel_id: String,

    /// Channel URL; derived from the channel id when omitted
    #[serde(default)]
    pub url: Option<String>,

    /// Optional display title
    #[serde(default)]
    pub title: Option<String>,

    /// Target sites; empty means the organisation default
    #[serde(default)]
    pub sites: BTreeSet<String>,

    /// Keywords attached to items of this channel
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl ChannelConfig {
    /// Canonical channel URL.
    pub fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("https://www.youtube.com/channel/{}", self.channel_id))
    }
}

/// Resolved configuration of a single page or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub title: Option<String>,
    pub url: String,
    pub sites: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
    /// Set for video channels only
    pub channel_id: Option<String>,
}
