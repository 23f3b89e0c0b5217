//! Ordering rules for publication listings.

use std::cmp::Ordering;

use crate::models::ContentItem;

/// Compare two publications for newest-first display.
///
/// Items without a published date sink below dated ones regardless of side.
/// Otherwise the later date comes first, and equal dates fall back to the
/// title compared in the same descending direction.
pub fn compare_publications(a: &ContentItem, b: &ContentItem) -> Ordering {
    match (a.has_published(), b.has_published()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b
            .published
            .cmp(&a.published)
            .then_with(|| b.title.cmp(&a.title)),
    }
}

/// Sort teasers newest first.
///
/// A listing where no item carries a date keeps its crawl order.
pub fn sort_publications(items: &mut [ContentItem]) {
    if items.iter().any(ContentItem::has_published) {
        items.sort_by(compare_publications);
    }
}
