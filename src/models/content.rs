//! Content items, snapshots and source keys.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kind of content a monitor tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Items listed on a publication page
    Publication,
    /// Uploads of a video channel
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Publication => "publication",
            ContentType::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "publication" | "page" => Ok(ContentType::Publication),
            "video" | "channel" => Ok(ContentType::Video),
            other => Err(AppError::validation(format!("Unknown content type '{other}'"))),
        }
    }
}

/// Identity of a monitored source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    /// Organisation code
    pub code: String,

    /// Content type of the source
    pub content_type: ContentType,

    /// Source name, unique within code and content type
    pub name: String,
}

impl SourceKey {
    pub fn new(code: impl Into<String>, content_type: ContentType, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            content_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.code, self.content_type, self.name)
    }
}

/// A piece of content returned by a crawl.
///
/// A crawl returns these as teasers; detail lookups return them fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Source specific identifier (e.g. a video id)
    pub id: String,

    /// Display title
    pub title: String,

    /// Published timestamp in unix seconds, 0 when unknown
    #[serde(default)]
    pub published: i64,

    /// Link to the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Video duration in seconds, 0 when not yet known
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl ContentItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            published: 0,
            url: None,
            duration: 0,
        }
    }

    pub fn with_published(mut self, published: i64) -> Self {
        self.published = published;
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether the published date is known.
    pub fn has_published(&self) -> bool {
        self.published != 0
    }
}

/// A raw listing returned by a crawler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Title of the listing page or channel, when the crawler found one
    #[serde(default)]
    pub title: Option<String>,

    /// Teasers in crawl order
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

/// Ordered result of one monitor check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    content_type: ContentType,
    taken_at: DateTime<Utc>,
    items: Vec<ContentItem>,
}

impl ContentSnapshot {
    pub fn new(content_type: ContentType, items: Vec<ContentItem>) -> Self {
        Self {
            content_type,
            taken_at: Utc::now(),
            items,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
