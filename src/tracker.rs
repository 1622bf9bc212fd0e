//! Session facade tying the store and the progress engine together.
//!
//! A [`ProgressTracker`] is what a host application holds per state
//! directory. It turns one user action (set or cycle an item) into one
//! load, one propagation pass and one save, so the item change and every
//! ancestor change land in the same atomic write.
//!
//! Callers must serialize mutations per source path; the tracker does not
//! lock.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::hasher::{compute_content_hash, compute_normalized_hash};
use crate::model::{walk, FileTrackingState, TrackableItem, TrackingStatus};
use crate::progress::{propagate_status_change, ParentProgress, ProgressCache, StatusUpdates};
use crate::store::StateStore;

/// Which content hash is stored and compared during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashMode {
    /// Any byte change counts as a modification.
    #[default]
    Exact,
    /// Whitespace and line-ending drift is ignored.
    Normalized,
}

impl HashMode {
    /// Hash `text` according to this mode.
    #[must_use]
    pub fn hash(self, text: &str) -> String {
        match self {
            Self::Exact => compute_content_hash(text),
            Self::Normalized => compute_normalized_hash(text),
        }
    }
}

/// Outcome of comparing a document against its stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentChange {
    /// The file was not tracked before; state was created.
    New,
    /// The stored hash matches.
    Unchanged,
    /// The content differs; the stored hash was updated.
    Modified,
}

/// Result of [`ProgressTracker::reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub change: ContentChange,
    pub state: FileTrackingState,
}

/// Result of a status change with its propagated ancestor updates.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// The item the caller changed.
    pub item_id: String,
    /// The item's new status.
    pub status: TrackingStatus,
    /// Ancestors whose derived status changed as a consequence.
    pub propagated: StatusUpdates,
    /// State as persisted after the change.
    pub state: FileTrackingState,
}

/// Deep progress for one parent item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub item_id: String,
    pub content: String,
    pub depth: u32,
    pub status: TrackingStatus,
    pub progress: ParentProgress,
}

/// Store plus progress engine for one state directory.
#[derive(Debug)]
pub struct ProgressTracker {
    store: StateStore,
    cache: ProgressCache,
    hash_mode: HashMode,
}

impl ProgressTracker {
    /// Create a tracker over `store` using exact content hashes.
    #[must_use]
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            cache: ProgressCache::new(),
            hash_mode: HashMode::default(),
        }
    }

    /// Set which hash [`reconcile`](Self::reconcile) stores and compares.
    #[must_use]
    pub fn with_hash_mode(mut self, mode: HashMode) -> Self {
        self.hash_mode = mode;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// The progress cache.
    #[must_use]
    pub fn cache(&self) -> &ProgressCache {
        &self.cache
    }

    /// Set `item_id` to `status`, propagate to ancestors and persist the
    /// whole change with one save.
    ///
    /// Returns `None` if `source_path` is not tracked.
    pub async fn set_status(
        &self,
        source_path: &str,
        items: &[TrackableItem],
        item_id: &str,
        status: TrackingStatus,
    ) -> Result<Option<StatusChange>> {
        let Some(state) = self.store.load_file_state(source_path).await? else {
            return Ok(None);
        };
        self.apply(state, items, item_id, status).await.map(Some)
    }

    /// Advance `item_id` to its next status in the cycle, then behave like
    /// [`set_status`](Self::set_status).
    pub async fn cycle_status(
        &self,
        source_path: &str,
        items: &[TrackableItem],
        item_id: &str,
    ) -> Result<Option<StatusChange>> {
        let Some(state) = self.store.load_file_state(source_path).await? else {
            return Ok(None);
        };
        let next = state.status(item_id).next();
        self.apply(state, items, item_id, next).await.map(Some)
    }

    async fn apply(
        &self,
        mut state: FileTrackingState,
        items: &[TrackableItem],
        item_id: &str,
        status: TrackingStatus,
    ) -> Result<StatusChange> {
        let mut statuses = state.status_map();
        statuses.insert(item_id.to_string(), status);
        let propagated = propagate_status_change(item_id, items, &statuses);

        state.set_status(item_id, status);
        for (ancestor_id, ancestor_status) in &propagated {
            state.set_status(ancestor_id, *ancestor_status);
        }
        self.store.save_file_state(&mut state).await?;

        debug!(
            "Set {} to {} in {} ({} ancestors updated)",
            item_id,
            status,
            state.source_path,
            propagated.len()
        );

        Ok(StatusChange {
            item_id: item_id.to_string(),
            status,
            propagated,
            state,
        })
    }

    /// Compare `text` against the stored hash for `source_path`.
    ///
    /// Untracked files get fresh state. A changed document has its stored
    /// hash replaced; deciding whether to re-parse is up to the caller.
    pub async fn reconcile(&self, source_path: &str, text: &str) -> Result<Reconciliation> {
        let hash = self.hash_mode.hash(text);

        let Some(mut state) = self.store.load_file_state(source_path).await? else {
            let state = self.store.get_or_create_file_state(source_path, &hash).await?;
            return Ok(Reconciliation {
                change: ContentChange::New,
                state,
            });
        };

        if state.content_hash == hash {
            return Ok(Reconciliation {
                change: ContentChange::Unchanged,
                state,
            });
        }

        info!("Content of {} changed since last reconcile", source_path);
        state.content_hash = hash;
        self.store.save_file_state(&mut state).await?;
        Ok(Reconciliation {
            change: ContentChange::Modified,
            state,
        })
    }

    /// Drop tracking records for ids no longer present in `items`.
    ///
    /// Returns the number removed, or `None` if the file is untracked.
    pub async fn prune_missing(
        &self,
        source_path: &str,
        items: &[TrackableItem],
    ) -> Result<Option<usize>> {
        let Some(mut state) = self.store.load_file_state(source_path).await? else {
            return Ok(None);
        };

        let live: HashSet<&str> = walk(items).map(|item| item.id.as_str()).collect();
        let before = state.items.len();
        state.items.retain(|id, _| live.contains(id.as_str()));
        let removed = before - state.items.len();

        if removed > 0 {
            self.store.save_file_state(&mut state).await?;
            info!("Pruned {} stale items from {}", removed, source_path);
        }
        Ok(Some(removed))
    }

    /// Deep progress for every item with children, in document order.
    ///
    /// Returns `None` if the file is untracked.
    pub async fn tree_progress(
        &mut self,
        source_path: &str,
        items: &[TrackableItem],
    ) -> Result<Option<Vec<ItemProgress>>> {
        let Some(state) = self.store.load_file_state(source_path).await? else {
            return Ok(None);
        };
        let statuses = state.status_map();

        let report = walk(items)
            .filter(|item| item.has_children())
            .map(|item| ItemProgress {
                item_id: item.id.clone(),
                content: item.content.clone(),
                depth: item.depth,
                status: state.status(&item.id),
                progress: self.cache.deep_progress(item, &statuses),
            })
            .collect();
        Ok(Some(report))
    }

    /// Delete stored state for `source_path` and drop cached progress.
    pub async fn forget(&mut self, source_path: &str) -> Result<()> {
        self.store.delete_file_state(source_path).await?;
        self.cache.clear();
        Ok(())
    }

    /// Delete all tracking data. Returns the number of files removed.
    pub async fn clear_all(&mut self) -> Result<usize> {
        let removed = self.store.clear_all().await?;
        self.cache.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, StoreFixture};

    const SOURCE: &str = "/notes/plan.md";

    fn tracker(fixture: &StoreFixture) -> ProgressTracker {
        ProgressTracker::new(fixture.store().clone())
    }

    #[tokio::test]
    async fn test_set_status_untracked_returns_none() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);
        let tree = fixtures::propagation_tree();

        let result = tracker
            .set_status(SOURCE, &tree, "child-1", TrackingStatus::Complete)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_status_persists_propagation() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);
        let tree = fixtures::propagation_tree();
        tracker.reconcile(SOURCE, "# doc").await.unwrap();

        tracker
            .set_status(SOURCE, &tree, "child-1", TrackingStatus::Complete)
            .await
            .unwrap();
        let change = tracker
            .set_status(SOURCE, &tree, "child-2", TrackingStatus::Complete)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.propagated.get("parent"), Some(&TrackingStatus::Complete));
        assert!(!change.propagated.contains_key("grandparent"));

        let stored = fixture.store().load_file_state(SOURCE).await.unwrap().unwrap();
        assert_eq!(stored.status("parent"), TrackingStatus::Complete);
        assert_eq!(stored.status("grandparent"), TrackingStatus::Pending);

        let change = tracker
            .set_status(SOURCE, &tree, "cousin", TrackingStatus::Complete)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            change.propagated.get("grandparent"),
            Some(&TrackingStatus::Complete)
        );
        assert_eq!(change.state.status("aunt"), TrackingStatus::Complete);
    }

    #[tokio::test]
    async fn test_cycle_status() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);
        let tree = fixtures::propagation_tree();
        tracker.reconcile(SOURCE, "# doc").await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let change = tracker
                .cycle_status(SOURCE, &tree, "cousin")
                .await
                .unwrap()
                .unwrap();
            seen.push(change.status);
        }
        assert_eq!(
            seen,
            vec![
                TrackingStatus::InProgress,
                TrackingStatus::Complete,
                TrackingStatus::Pending,
                TrackingStatus::InProgress,
            ]
        );
    }

    #[tokio::test]
    async fn test_reconcile_lifecycle() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);

        let first = tracker.reconcile(SOURCE, "- [ ] one").await.unwrap();
        assert_eq!(first.change, ContentChange::New);
        assert_eq!(first.state.content_hash, compute_content_hash("- [ ] one"));

        let same = tracker.reconcile(SOURCE, "- [ ] one").await.unwrap();
        assert_eq!(same.change, ContentChange::Unchanged);

        let edited = tracker.reconcile(SOURCE, "- [ ] one\n- [ ] two").await.unwrap();
        assert_eq!(edited.change, ContentChange::Modified);

        let stored = fixture.store().load_file_state(SOURCE).await.unwrap().unwrap();
        assert_eq!(stored.content_hash, compute_content_hash("- [ ] one\n- [ ] two"));
    }

    #[tokio::test]
    async fn test_reconcile_source_on_disk() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);
        let key = fixture.write_source("plan.md", "# Plan\n- [ ] one\n");

        let text = tokio::fs::read_to_string(&key).await.unwrap();
        let first = tracker.reconcile(&key, &text).await.unwrap();
        assert_eq!(first.change, ContentChange::New);
        assert_eq!(fixture.store().list_tracked_files().await.unwrap(), vec![key.clone()]);

        assert_eq!(fixture.write_source("plan.md", "# Plan\n- [x] one\n"), key);
        let text = tokio::fs::read_to_string(&key).await.unwrap();
        let second = tracker.reconcile(&key, &text).await.unwrap();
        assert_eq!(second.change, ContentChange::Modified);
        assert_eq!(second.state.content_hash, compute_content_hash(&text));
    }

    #[tokio::test]
    async fn test_reconcile_normalized_ignores_whitespace() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture).with_hash_mode(HashMode::Normalized);

        tracker.reconcile(SOURCE, "- [ ] one\n- [ ] two").await.unwrap();
        let reflowed = tracker
            .reconcile(SOURCE, "- [ ]   one  \r\n- [ ] two\r\n")
            .await
            .unwrap();
        assert_eq!(reflowed.change, ContentChange::Unchanged);
    }

    #[tokio::test]
    async fn test_reconcile_keeps_item_statuses() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);
        let tree = fixtures::propagation_tree();

        tracker.reconcile(SOURCE, "v1").await.unwrap();
        tracker
            .set_status(SOURCE, &tree, "cousin", TrackingStatus::Complete)
            .await
            .unwrap();
        let result = tracker.reconcile(SOURCE, "v2").await.unwrap();

        assert_eq!(result.change, ContentChange::Modified);
        assert_eq!(result.state.status("cousin"), TrackingStatus::Complete);
    }

    #[tokio::test]
    async fn test_prune_missing() {
        let fixture = StoreFixture::new();
        let tracker = tracker(&fixture);
        let tree = fixtures::propagation_tree();

        assert!(tracker.prune_missing(SOURCE, &tree).await.unwrap().is_none());

        tracker.reconcile(SOURCE, "doc").await.unwrap();
        fixture
            .store()
            .update_item_statuses(
                SOURCE,
                vec![
                    ("cousin".to_string(), TrackingStatus::Complete),
                    ("deleted-heading".to_string(), TrackingStatus::InProgress),
                ],
            )
            .await
            .unwrap();

        assert_eq!(tracker.prune_missing(SOURCE, &tree).await.unwrap(), Some(1));
        assert_eq!(tracker.prune_missing(SOURCE, &tree).await.unwrap(), Some(0));

        let stored = fixture.store().load_file_state(SOURCE).await.unwrap().unwrap();
        assert!(stored.items.contains_key("cousin"));
        assert!(!stored.items.contains_key("deleted-heading"));
    }

    #[tokio::test]
    async fn test_tree_progress_lists_parents_in_order() {
        let fixture = StoreFixture::new();
        let mut tracker = tracker(&fixture);
        let tree = fixtures::propagation_tree();

        tracker.reconcile(SOURCE, "doc").await.unwrap();
        tracker
            .set_status(SOURCE, &tree, "child-1", TrackingStatus::Complete)
            .await
            .unwrap();

        let report = tracker.tree_progress(SOURCE, &tree).await.unwrap().unwrap();
        let ids: Vec<&str> = report.iter().map(|p| p.item_id.as_str()).collect();
        assert_eq!(ids, vec!["grandparent", "parent", "aunt"]);
        assert_eq!(report[1].progress.summary(), "1/2 (50%)");
        assert_eq!(report[0].progress.complete, 1);

        // Second pass is served from the cache.
        tracker.tree_progress(SOURCE, &tree).await.unwrap();
        assert_eq!(tracker.cache().stats(), (3, 3));
    }

    #[tokio::test]
    async fn test_forget_and_clear_all() {
        let fixture = StoreFixture::new();
        let mut tracker = tracker(&fixture);

        tracker.reconcile("/a.md", "a").await.unwrap();
        tracker.reconcile("/b.md", "b").await.unwrap();

        tracker.forget("/a.md").await.unwrap();
        assert!(!fixture.store().has_tracking_state("/a.md").await.unwrap());

        assert_eq!(tracker.clear_all().await.unwrap(), 1);
        assert!(fixture.store().list_tracked_files().await.unwrap().is_empty());
    }
}
