//! Caller-owned memo of deep progress results.
//!
//! Entries are keyed by item id and carry a fingerprint of the subtree's
//! shape and the statuses of every descendant. A lookup whose fingerprint
//! differs is recomputed, so a stale entry is never returned. Owners call
//! [`ProgressCache::invalidate`] or [`ProgressCache::clear`] to drop
//! entries for documents they no longer display.
//!
//! Computing the fingerprint visits every descendant, which is the same
//! walk [`calculate_deep_progress`] does. A hit therefore saves the tally,
//! not the traversal. The cache exists to hand back a stable value for an
//! unchanged subtree and to never serve one for a changed subtree; it is
//! not a way to make deep progress sub-linear.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::{calculate_deep_progress, ParentProgress};
use crate::model::{status_of, StatusMap, TrackableItem};

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    fingerprint: u64,
    progress: ParentProgress,
}

/// Memoized [`calculate_deep_progress`] results.
#[derive(Debug, Default)]
pub struct ProgressCache {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

fn fingerprint(item: &TrackableItem, statuses: &StatusMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    for descendant in item.descendants() {
        descendant.id.hash(&mut hasher);
        descendant.children.len().hash(&mut hasher);
        status_of(statuses, &descendant.id).hash(&mut hasher);
    }
    hasher.finish()
}

impl ProgressCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep progress for `item`, reusing the cached value when neither the
    /// subtree nor any descendant status has changed.
    ///
    /// Always walks the subtree once to fingerprint it.
    pub fn deep_progress(&mut self, item: &TrackableItem, statuses: &StatusMap) -> ParentProgress {
        let fp = fingerprint(item, statuses);
        if let Some(entry) = self.entries.get(&item.id) {
            if entry.fingerprint == fp {
                self.hits += 1;
                return entry.progress;
            }
        }

        self.misses += 1;
        let progress = calculate_deep_progress(item, statuses);
        self.entries.insert(
            item.id.clone(),
            CacheEntry {
                fingerprint: fp,
                progress,
            },
        );
        progress
    }

    /// Drop the entry for `item_id`. Returns true if one existed.
    pub fn invalidate(&mut self, item_id: &str) -> bool {
        self.entries.remove(item_id).is_some()
    }

    /// Drop every entry and reset hit/miss counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation or the last [`clear`](Self::clear).
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemKind, TrackingStatus};
    use crate::testing::fixtures;

    #[test]
    fn test_repeat_lookup_hits() {
        let parent = fixtures::three_child_parent();
        let statuses = StatusMap::new();
        let mut cache = ProgressCache::new();

        let first = cache.deep_progress(&parent, &statuses);
        let second = cache.deep_progress(&parent, &statuses);

        assert_eq!(first, second);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_status_change_misses() {
        let parent = fixtures::three_child_parent();
        let mut statuses = StatusMap::new();
        let mut cache = ProgressCache::new();

        assert_eq!(cache.deep_progress(&parent, &statuses).complete, 0);
        statuses.insert("child-1".to_string(), TrackingStatus::Complete);
        assert_eq!(cache.deep_progress(&parent, &statuses).complete, 1);
        assert_eq!(cache.stats(), (0, 2));
    }

    #[test]
    fn test_unrelated_status_still_hits() {
        let parent = fixtures::three_child_parent();
        let mut statuses = StatusMap::new();
        let mut cache = ProgressCache::new();

        cache.deep_progress(&parent, &statuses);
        statuses.insert("elsewhere".to_string(), TrackingStatus::Complete);
        cache.deep_progress(&parent, &statuses);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_structure_change_misses() {
        let parent = fixtures::three_child_parent();
        let statuses = StatusMap::new();
        let mut cache = ProgressCache::new();
        cache.deep_progress(&parent, &statuses);

        let mut grown = parent.clone();
        grown
            .children
            .push(TrackableItem::new("child-4", ItemKind::Checkbox, "four"));
        let progress = cache.deep_progress(&grown, &statuses);
        assert_eq!(progress.total, 4);
        assert_eq!(cache.stats(), (0, 2));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let tree = fixtures::propagation_tree();
        let statuses = StatusMap::new();
        let mut cache = ProgressCache::new();

        cache.deep_progress(&tree[0], &statuses);
        cache.deep_progress(&tree[0].children[0], &statuses);
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate("grandparent"));
        assert!(!cache.invalidate("grandparent"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }
}
