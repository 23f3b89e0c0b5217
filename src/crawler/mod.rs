//! Crawler abstraction consumed by monitor checks.
//!
//! A crawler is opened for one source per check and must be closed when the
//! check ends. [`CrawlerSession`] owns an open crawler and closes it exactly
//! once, on explicit release or on drop, so early returns through `?` never
//! leak it.

pub mod local;

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ContentItem, Listing, SourceConfig, SourceKey};

pub use local::{LocalCrawler, LocalCrawlerFactory};

/// An open crawler scoped to a single source.
#[async_trait]
pub trait Crawler: Send {
    /// Fetch up to `max_results` teasers from the source listing.
    async fn fetch_teasers(&mut self, source: &SourceConfig, max_results: usize)
    -> Result<Listing>;

    /// Resolve full details of one item, `None` when the item is unknown.
    async fn resolve_details(&mut self, id: &str) -> Result<Option<ContentItem>>;

    /// Release connections, handles and caches held by the crawler.
    fn close(&mut self);
}

/// Opens crawlers for monitored sources.
pub trait CrawlerFactory: Send + Sync {
    /// Open a crawler for `key`, bounded by `max_results`.
    ///
    /// `use_cache` allows the crawler to reuse earlier detail lookups.
    fn open(&self, key: &SourceKey, max_results: usize, use_cache: bool)
    -> Result<Box<dyn Crawler>>;
}

/// Owns an open crawler and closes it exactly once.
pub struct CrawlerSession {
    crawler: Box<dyn Crawler>,
    released: bool,
}

impl CrawlerSession {
    pub fn new(crawler: Box<dyn Crawler>) -> Self {
        Self {
            crawler,
            released: false,
        }
    }

    /// Close the crawler now.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.released {
            self.released = true;
            self.crawler.close();
        }
    }
}

impl Deref for CrawlerSession {
    type Target = dyn Crawler;

    fn deref(&self) -> &Self::Target {
        self.crawler.as_ref()
    }
}

impl DerefMut for CrawlerSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.crawler.as_mut()
    }
}

impl Drop for CrawlerSession {
    fn drop(&mut self) {
        self.close_once();
    }
}
