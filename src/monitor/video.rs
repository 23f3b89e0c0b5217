//! Reconciliation rules for video channels.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::crawler::Crawler;
use crate::models::ContentItem;

/// Title suffix of subscribed videos missing from the channel listing.
pub const UNLISTED_SUFFIX: &str = "**UNLISTED**";

/// Channel state carried by video monitors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoState {
    /// Platform channel identifier
    #[serde(default)]
    pub channel_id: String,

    /// Items pushed by a subscription, pending merge into the next check
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscribed: Vec<ContentItem>,
}

impl VideoState {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            subscribed: Vec::new(),
        }
    }

    /// Queue a pushed item, replacing a pending one with the same id.
    pub fn subscribe(&mut self, item: ContentItem) {
        match self.subscribed.iter_mut().find(|s| s.id == item.id) {
            Some(pending) => *pending = item,
            None => self.subscribed.push(item),
        }
    }
}

fn mark_unlisted(mut item: ContentItem) -> ContentItem {
    if !item.title.ends_with(UNLISTED_SUFFIX) {
        item.title = format!("{} {}", item.title, UNLISTED_SUFFIX);
    }
    item
}

/// Merge subscribed items into crawled teasers.
///
/// Subscribed items the crawl already returned are dropped in favour of the
/// crawled copy. The rest are marked unlisted and each put in front of the
/// result in turn, so the last subscribed item ends up first.
pub fn merge_subscribed(
    teasers: Vec<ContentItem>,
    subscribed: Vec<ContentItem>,
) -> Vec<ContentItem> {
    if subscribed.is_empty() {
        return teasers;
    }

    let unlisted: Vec<ContentItem> = {
        let crawled: HashSet<&str> = teasers.iter().map(|t| t.id.as_str()).collect();
        subscribed
            .into_iter()
            .filter(|item| !crawled.contains(item.id.as_str()))
            .map(mark_unlisted)
            .collect()
    };

    if !unlisted.is_empty() {
        log::info!("Merging {} unlisted subscribed videos", unlisted.len());
    }

    let mut merged: Vec<ContentItem> = unlisted.into_iter().rev().collect();
    merged.extend(teasers);
    merged
}

/// Drop videos whose resolved duration is zero.
///
/// Such videos are announced but not live yet. Items whose details cannot be
/// resolved are kept.
pub async fn drop_unreleased(
    items: Vec<ContentItem>,
    crawler: &mut dyn Crawler,
) -> Vec<ContentItem> {
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        match crawler.resolve_details(&item.id).await {
            Ok(Some(details)) if details.duration == 0 => {
                log::info!("Skipping video {} ({}): not live yet", item.id, item.title);
            }
            Ok(_) => kept.push(item),
            Err(e) => {
                log::warn!("Keeping video {} unfiltered: {}", item.id, e);
                kept.push(item);
            }
        }
    }

    kept
}
