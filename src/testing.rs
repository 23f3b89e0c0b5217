//! Test doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::crawler::{Crawler, CrawlerFactory};
use crate::error::{AppError, Result};
use crate::models::{
    ChannelConfig, ContentItem, Listing, OrganisationConfig, PageConfig, SourceConfig, SourceKey,
};
use crate::registry::OrganisationRegistry;

/// Scripted crawler.
#[derive(Debug, Clone, Default)]
pub struct FakeCrawler {
    pub listing: Listing,
    pub fail_fetch: bool,
    /// Per-id detail results; `Err` entries make the lookup fail
    pub details: HashMap<String, std::result::Result<ContentItem, String>>,
    closes: Arc<AtomicUsize>,
    lookups: Arc<AtomicUsize>,
}

impl FakeCrawler {
    pub fn with_items(items: Vec<ContentItem>) -> Self {
        Self {
            listing: Listing { title: None, items },
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_fetch: true,
            ..Self::default()
        }
    }

    pub fn detail(mut self, item: ContentItem) -> Self {
        self.details.insert(item.id.clone(), Ok(item));
        self
    }

    pub fn failing_detail(mut self, id: &str) -> Self {
        self.details.insert(id.to_string(), Err("boom".to_string()));
        self
    }
}

#[async_trait]
impl Crawler for FakeCrawler {
    async fn fetch_teasers(
        &mut self,
        source: &SourceConfig,
        max_results: usize,
    ) -> Result<Listing> {
        if self.fail_fetch {
            return Err(AppError::fetch(&source.name, "connection refused"));
        }
        let mut listing = self.listing.clone();
        listing.items.truncate(max_results);
        Ok(listing)
    }

    async fn resolve_details(&mut self, id: &str) -> Result<Option<ContentItem>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.details.get(id) {
            Some(Ok(item)) => Ok(Some(item.clone())),
            Some(Err(message)) => Err(AppError::detail(id, message)),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out clones of one scripted crawler and counts closes.
#[derive(Debug, Default)]
pub struct FakeCrawlerFactory {
    template: FakeCrawler,
    opens: AtomicUsize,
}

impl FakeCrawlerFactory {
    pub fn new(template: FakeCrawler) -> Self {
        Self {
            template,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.template.closes.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> usize {
        self.template.lookups.load(Ordering::SeqCst)
    }
}

impl CrawlerFactory for FakeCrawlerFactory {
    fn open(
        &self,
        _key: &SourceKey,
        _max_results: usize,
        _use_cache: bool,
    ) -> Result<Box<dyn Crawler>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.template.clone()))
    }
}

/// Registry with one organisation `acme`, page `press` and channel `main`.
pub fn sample_registry() -> OrganisationRegistry {
    OrganisationRegistry::new([OrganisationConfig {
        code: "acme".to_string(),
        name: "Acme".to_string(),
        sites: ["news".to_string()].into(),
        pages: vec![PageConfig {
            name: "press".to_string(),
            url: "https://acme.example/press".to_string(),
            title: Some("Acme Press".to_string()),
            sites: Default::default(),
        }],
        channels: vec![ChannelConfig {
            name: "main".to_string(),
            channel_id: "UC123".to_string(),
            url: None,
            title: None,
            sites: ["video".to_string()].into(),
            keywords: ["launch".to_string()].into(),
        }],
    }])
}
