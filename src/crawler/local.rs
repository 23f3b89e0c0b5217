//! Crawler backed by captured listings on the local filesystem.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── {code}/
//! │   ├── publication/{name}.json   # { "title": .., "items": [..] }
//! │   └── video/{name}.json
//! └── details/
//!     └── {item_id}.json            # one resolved ContentItem
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::crawler::{Crawler, CrawlerFactory};
use crate::error::{AppError, Result};
use crate::models::{ContentItem, Listing, SourceConfig, SourceKey};
use crate::utils::{is_safe_segment, resolve_url};

/// Opens [`LocalCrawler`] sessions over a listings directory.
#[derive(Debug, Clone)]
pub struct LocalCrawlerFactory {
    root_dir: PathBuf,
}

impl LocalCrawlerFactory {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

impl CrawlerFactory for LocalCrawlerFactory {
    fn open(
        &self,
        key: &SourceKey,
        max_results: usize,
        use_cache: bool,
    ) -> Result<Box<dyn Crawler>> {
        for segment in [&key.code, &key.name] {
            if !is_safe_segment(segment) {
                return Err(AppError::validation(format!(
                    "Invalid path segment '{segment}' in source {key}"
                )));
            }
        }
        Ok(Box::new(LocalCrawler {
            root_dir: self.root_dir.clone(),
            key: key.clone(),
            max_results,
            use_cache,
            cache: HashMap::new(),
        }))
    }
}

/// Reads one source's captured listing and item details.
#[derive(Debug)]
pub struct LocalCrawler {
    root_dir: PathBuf,
    key: SourceKey,
    max_results: usize,
    use_cache: bool,
    cache: HashMap<String, Option<ContentItem>>,
}

impl LocalCrawler {
    fn listing_path(&self) -> PathBuf {
        self.root_dir
            .join(&self.key.code)
            .join(self.key.content_type.as_str())
            .join(format!("{}.json", self.key.name))
    }

    fn detail_path(&self, id: &str) -> PathBuf {
        self.root_dir.join("details").join(format!("{id}.json"))
    }

    async fn read_detail(&self, id: &str) -> Result<Option<ContentItem>> {
        if !is_safe_segment(id) {
            return Err(AppError::detail(id, "unsafe item id"));
        }
        let path = self.detail_path(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::detail(id, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::detail(id, e)),
        }
    }
}

#[async_trait]
impl Crawler for LocalCrawler {
    async fn fetch_teasers(
        &mut self,
        source: &SourceConfig,
        max_results: usize,
    ) -> Result<Listing> {
        let path = self.listing_path();
        let context = self.key.to_string();

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::fetch(&context, format!("{}: {e}", path.display())))?;
        let mut listing: Listing =
            serde_json::from_slice(&bytes).map_err(|e| AppError::fetch(&context, e))?;

        listing.items.truncate(max_results.min(self.max_results));
        for item in &mut listing.items {
            if let Some(url) = &item.url {
                item.url = Some(resolve_url(&source.url, url));
            }
        }

        log::debug!(
            "Read {} teasers for {} from {}",
            listing.items.len(),
            context,
            path.display()
        );
        Ok(listing)
    }

    async fn resolve_details(&mut self, id: &str) -> Result<Option<ContentItem>> {
        if self.use_cache {
            if let Some(cached) = self.cache.get(id) {
                return Ok(cached.clone());
            }
        }

        let detail = self.read_detail(id).await?;
        if self.use_cache {
            self.cache.insert(id.to_string(), detail.clone());
        }
        Ok(detail)
    }

    fn close(&mut self) {
        log::debug!(
            "Closing crawler for {} ({} cached details)",
            self.key,
            self.cache.len()
        );
        self.cache.clear();
    }
}
