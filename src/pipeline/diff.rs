//! Diff calculation between consecutive snapshots.
//!
//! Identifies new, updated and removed items of a source so downstream
//! notification can report what changed since the previous check.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::ContentItem;

/// Item ids that changed between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Diff {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

/// Extended diff result with full item data.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiffResult {
    /// Basic diff (IDs only)
    pub diff: Diff,
    /// Full items for added ids (for notifications)
    pub added_items: Vec<ContentItem>,
    /// Full items for updated ids
    pub updated_items: Vec<ContentItem>,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.diff.added.is_empty()
            || !self.diff.updated.is_empty()
            || !self.diff.removed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.diff.added.len() + self.diff.updated.len() + self.diff.removed.len()
    }
}

/// Calculator for computing diffs between snapshots.
#[derive(Debug, Clone)]
pub struct DiffCalculator {
    /// Whether to detect updates (title changes for same ID)
    detect_updates: bool,
}

impl Default for DiffCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffCalculator {
    /// Create a new diff calculator.
    pub fn new() -> Self {
        Self {
            detect_updates: true,
        }
    }

    /// Create a diff calculator that only detects additions/removals.
    pub fn additions_only() -> Self {
        Self {
            detect_updates: false,
        }
    }

    /// Calculate the diff between previous and current items.
    ///
    /// Added and updated ids follow the order of `current`, removed ids the
    /// order of `previous`.
    pub fn calculate(&self, previous: &[ContentItem], current: &[ContentItem]) -> DiffResult {
        let prev_map: HashMap<&str, &ContentItem> =
            previous.iter().map(|i| (i.id.as_str(), i)).collect();
        let curr_ids: HashSet<&str> = current.iter().map(|i| i.id.as_str()).collect();

        let mut result = DiffResult::default();
        let mut seen = HashSet::new();

        for item in current {
            if !seen.insert(item.id.as_str()) {
                continue;
            }
            match prev_map.get(item.id.as_str()) {
                None => {
                    result.diff.added.push(item.id.clone());
                    result.added_items.push(item.clone());
                }
                Some(prev) if self.detect_updates && prev.title != item.title => {
                    result.diff.updated.push(item.id.clone());
                    result.updated_items.push(item.clone());
                }
                Some(_) => {}
            }
        }

        let mut removed_seen = HashSet::new();
        result.diff.removed = previous
            .iter()
            .map(|i| i.id.as_str())
            .filter(|id| !curr_ids.contains(id) && removed_seen.insert(*id))
            .map(str::to_string)
            .collect();

        result
    }
}

/// Convenience function to calculate diff.
pub fn calculate_diff(previous: &[ContentItem], current: &[ContentItem]) -> DiffResult {
    DiffCalculator::new().calculate(previous, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(id: &str, title: &str) -> ContentItem {
        ContentItem::new(id, title).with_url(format!("https://example.com/{}", id))
    }

    #[test]
    fn test_no_changes() {
        let prev = vec![make_item("001", "Title 1"), make_item("002", "Title 2")];
        let curr = prev.clone();

        let result = calculate_diff(&prev, &curr);
        assert!(!result.has_changes());
        assert_eq!(result.change_count(), 0);
    }

    #[test]
    fn test_additions() {
        let prev = vec![make_item("001", "Title 1")];
        let curr = vec![
            make_item("003", "Title 3"),
            make_item("002", "Title 2"),
            make_item("001", "Title 1"),
        ];

        let result = calculate_diff(&prev, &curr);
        assert!(result.has_changes());
        assert_eq!(result.diff.added, vec!["003", "002"]);
        assert_eq!(result.added_items.len(), 2);
    }

    #[test]
    fn test_removals() {
        let prev = vec![make_item("001", "Title 1"), make_item("002", "Title 2")];
        let curr = vec![make_item("001", "Title 1")];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(result.diff.removed, vec!["002"]);
    }

    #[test]
    fn test_updates() {
        let prev = vec![make_item("001", "Old Title")];
        let curr = vec![make_item("001", "New Title")];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(result.diff.updated, vec!["001"]);
        assert_eq!(result.updated_items[0].title, "New Title");
    }

    #[test]
    fn test_unlisted_mark_counts_as_update() {
        let prev = vec![make_item("v1", "Launch")];
        let curr = vec![make_item("v1", "Launch **UNLISTED**")];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(result.diff.updated, vec!["v1"]);
    }

    #[test]
    fn test_additions_only_ignores_title_changes() {
        let prev = vec![make_item("001", "Old Title")];
        let curr = vec![make_item("001", "New Title"), make_item("002", "Other")];

        let result = DiffCalculator::additions_only().calculate(&prev, &curr);
        assert!(result.diff.updated.is_empty());
        assert_eq!(result.diff.added, vec!["002"]);
    }

    #[test]
    fn test_mixed_changes() {
        let prev = vec![
            make_item("001", "Keep"),
            make_item("002", "Update Me"),
            make_item("003", "Remove Me"),
        ];
        let curr = vec![
            make_item("001", "Keep"),
            make_item("002", "Updated"),
            make_item("004", "New Item"),
        ];

        let result = calculate_diff(&prev, &curr);
        assert_eq!(result.diff.added, vec!["004"]);
        assert_eq!(result.diff.updated, vec!["002"]);
        assert_eq!(result.diff.removed, vec!["003"]);
    }

    #[test]
    fn test_empty_to_full() {
        let curr = vec![make_item("001", "First")];

        let result = calculate_diff(&[], &curr);
        assert_eq!(result.diff.added.len(), 1);
        assert!(result.diff.removed.is_empty());
    }

    #[test]
    fn test_full_to_empty() {
        let prev = vec![make_item("001", "Last")];

        let result = calculate_diff(&prev, &[]);
        assert!(result.diff.added.is_empty());
        assert_eq!(result.diff.removed.len(), 1);
    }
}
