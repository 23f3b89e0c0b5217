//! Content monitors and the check cycle.
//!
//! A [`ContentMonitor`] tracks one page or channel of an organisation. Each
//! call to [`ContentMonitor::check`] fetches the current listing, applies the
//! rules of the monitor's content type and returns a fresh
//! [`ContentSnapshot`]:
//!
//! - publications are sorted newest first ([`publication`])
//! - videos merge pending subscribed items and drop videos that are not live
//!   yet ([`video`])
//!
//! `check` takes `&mut self`, so a monitor cannot be checked twice at once.

pub mod publication;
pub mod video;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::crawler::{CrawlerFactory, CrawlerSession};
use crate::error::{AppError, Result};
use crate::models::{
    CheckerConfig, ContentItem, ContentSnapshot, ContentType, SourceConfig, SourceKey,
};
use crate::registry::SourceResolver;
use crate::utils::get_domain;

pub use publication::{compare_publications, sort_publications};
pub use video::{UNLISTED_SUFFIX, VideoState};

/// Options for a single check.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// Upper bound of teasers requested from the crawler
    pub max_results: usize,
    /// Let the crawler reuse detail lookups; enables video future filtering
    pub use_cache: bool,
    /// Log every teaser
    pub debug: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self::from(&CheckerConfig::default())
    }
}

impl From<&CheckerConfig> for CheckOptions {
    fn from(config: &CheckerConfig) -> Self {
        Self {
            max_results: config.max_results,
            use_cache: config.use_cache,
            debug: false,
        }
    }
}

/// Content-type specific monitor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "lowercase")]
pub enum MonitorKind {
    Publication,
    Video(VideoState),
}

/// Monitor of one organisation source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMonitor {
    code: String,
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    sites: BTreeSet<String>,
    #[serde(default)]
    keywords: BTreeSet<String>,
    #[serde(flatten)]
    kind: MonitorKind,
}

impl ContentMonitor {
    fn with_kind(code: impl Into<String>, name: impl Into<String>, kind: MonitorKind) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            title: String::new(),
            url: String::new(),
            sites: BTreeSet::new(),
            keywords: BTreeSet::new(),
            kind,
        }
    }

    /// Create a monitor for a publication listing page.
    pub fn new_publication(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(code, name, MonitorKind::Publication)
    }

    /// Create a monitor for a video channel.
    pub fn new_video(
        code: impl Into<String>,
        name: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self::with_kind(code, name, MonitorKind::Video(VideoState::new(channel_id)))
    }

    /// Create a monitor of the given type for a resolved source.
    pub fn for_source(code: impl Into<String>, content_type: ContentType, source: &SourceConfig) -> Self {
        let mut monitor = match content_type {
            ContentType::Publication => Self::new_publication(code, &source.name),
            ContentType::Video => Self::new_video(
                code,
                &source.name,
                source.channel_id.clone().unwrap_or_default(),
            ),
        };
        monitor.refresh(source, None);
        monitor
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn sites(&self) -> &BTreeSet<String> {
        &self.sites
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn kind(&self) -> &MonitorKind {
        &self.kind
    }

    pub fn content_type(&self) -> ContentType {
        match self.kind {
            MonitorKind::Publication => ContentType::Publication,
            MonitorKind::Video(_) => ContentType::Video,
        }
    }

    pub fn key(&self) -> SourceKey {
        SourceKey::new(&self.code, self.content_type(), &self.name)
    }

    /// Channel identifier of a video monitor.
    pub fn channel_id(&self) -> Option<&str> {
        match &self.kind {
            MonitorKind::Video(state) => Some(state.channel_id.as_str()),
            MonitorKind::Publication => None,
        }
    }

    /// Subscribed items waiting for the next check.
    pub fn subscribed(&self) -> &[ContentItem] {
        match &self.kind {
            MonitorKind::Video(state) => &state.subscribed,
            MonitorKind::Publication => &[],
        }
    }

    /// Queue an item learned from a push subscription.
    ///
    /// Only video monitors accept subscribed items.
    pub fn subscribe(&mut self, item: ContentItem) -> Result<()> {
        match &mut self.kind {
            MonitorKind::Video(state) => {
                log::debug!("[{}/{}] subscribed item {}", self.code, self.name, item.id);
                state.subscribe(item);
                Ok(())
            }
            MonitorKind::Publication => Err(AppError::validation(format!(
                "Publication monitor {}/{} does not take subscriptions",
                self.code, self.name
            ))),
        }
    }

    /// Run one check cycle.
    ///
    /// The crawler opened for this check is closed on every path. Monitor
    /// fields only change when the check succeeds.
    pub async fn check(
        &mut self,
        resolver: &dyn SourceResolver,
        crawlers: &dyn CrawlerFactory,
        options: &CheckOptions,
    ) -> Result<ContentSnapshot> {
        let key = self.key();
        let mut crawler = CrawlerSession::new(crawlers.open(
            &key,
            options.max_results,
            options.use_cache,
        )?);

        let result = self.check_with(&key, resolver, &mut crawler, options).await;
        crawler.release();
        result
    }

    async fn check_with(
        &mut self,
        key: &SourceKey,
        resolver: &dyn SourceResolver,
        crawler: &mut CrawlerSession,
        options: &CheckOptions,
    ) -> Result<ContentSnapshot> {
        let source = resolver
            .resolve(&key.code, key.content_type, &key.name)
            .ok_or_else(|| AppError::configuration_missing(&key.code, key.content_type, &key.name))?;

        let listing = crawler.fetch_teasers(&source, options.max_results).await?;
        if options.debug {
            for teaser in &listing.items {
                log::info!(
                    "[{}] teaser {} '{}' published={} duration={}",
                    key,
                    teaser.id,
                    teaser.title,
                    teaser.published,
                    teaser.duration
                );
            }
        }

        let listing_title = listing.title;
        let items = match &mut self.kind {
            MonitorKind::Publication => {
                let mut items = listing.items;
                sort_publications(&mut items);
                items
            }
            MonitorKind::Video(state) => {
                let subscribed = std::mem::take(&mut state.subscribed);
                let items = video::merge_subscribed(listing.items, subscribed);
                if options.use_cache && !items.is_empty() {
                    video::drop_unreleased(items, &mut **crawler).await
                } else {
                    items
                }
            }
        };

        self.refresh(&source, listing_title);

        log::info!("[{}] check found {} items", key, items.len());
        Ok(ContentSnapshot::new(key.content_type, items))
    }

    /// Refresh descriptive fields from the resolved source.
    fn refresh(&mut self, source: &SourceConfig, listing_title: Option<String>) {
        let title = listing_title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| source.title.clone())
            .or_else(|| (!self.title.is_empty()).then(|| self.title.clone()))
            .or_else(|| get_domain(&source.url))
            .unwrap_or_else(|| source.name.clone());

        self.title = title.trim().to_string();
        self.url = source.url.clone();
        self.sites = source.sites.clone();

        if let MonitorKind::Video(state) = &mut self.kind {
            self.keywords = source.keywords.clone();
            if let Some(channel_id) = &source.channel_id {
                state.channel_id = channel_id.clone();
            }
        }
    }
}
