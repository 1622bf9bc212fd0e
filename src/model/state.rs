//! Persisted tracking state shapes.
//!
//! Field names are camelCase on disk (`sourcePath`, `contentHash`, ...).
//! Unknown fields are tolerated on read and dropped on the next write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::status::{StatusMap, TrackingStatus};

/// Current schema version for the logical [`AppState`].
pub const APP_STATE_VERSION: u32 = 1;

/// Minimum supported version for backward compatibility.
pub const MIN_APP_STATE_VERSION: u32 = 1;

/// Tracking record for one item within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTrackingState {
    pub item_id: String,
    pub status: TrackingStatus,
    pub updated_at: DateTime<Utc>,
}

impl ItemTrackingState {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(item_id: impl Into<String>, status: TrackingStatus) -> Self {
        Self {
            item_id: item_id.into(),
            status,
            updated_at: Utc::now(),
        }
    }

    /// Create a `Pending` record.
    #[must_use]
    pub fn pending(item_id: impl Into<String>) -> Self {
        Self::new(item_id, TrackingStatus::Pending)
    }
}

/// Tracking record for one source document.
///
/// `source_path` is the natural key. `content_hash` is whatever the caller
/// last reconciled against; this type never recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTrackingState {
    pub source_path: String,
    pub content_hash: String,
    pub items: HashMap<String, ItemTrackingState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileTrackingState {
    /// Create an empty state for a newly tracked file.
    #[must_use]
    pub fn new(source_path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            source_path: source_path.into(),
            content_hash: content_hash.into(),
            items: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Stored status for `item_id`, `Pending` if untracked.
    #[must_use]
    pub fn status(&self, item_id: &str) -> TrackingStatus {
        self.items
            .get(item_id)
            .map(|item| item.status)
            .unwrap_or_default()
    }

    /// Upsert an item record with a fresh timestamp.
    pub fn set_status(&mut self, item_id: &str, status: TrackingStatus) {
        self.items
            .insert(item_id.to_string(), ItemTrackingState::new(item_id, status));
    }

    /// Project stored items into a [`StatusMap`].
    #[must_use]
    pub fn status_map(&self) -> StatusMap {
        self.items
            .iter()
            .map(|(id, item)| (id.clone(), item.status))
            .collect()
    }

    /// Count stored items with the given status.
    #[must_use]
    pub fn count_with_status(&self, status: TrackingStatus) -> usize {
        self.items.values().filter(|i| i.status == status).count()
    }
}

/// Logical union of every tracked file plus a schema version.
///
/// Never written as one blob; each [`FileTrackingState`] is its own unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub version: u32,
    pub files: HashMap<String, FileTrackingState>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: APP_STATE_VERSION,
            files: HashMap::new(),
        }
    }
}

/// Build an empty [`FileTrackingState`] for `source_path`.
#[must_use]
pub fn create_file_tracking_state(source_path: &str, content_hash: &str) -> FileTrackingState {
    FileTrackingState::new(source_path, content_hash)
}

/// Build an [`ItemTrackingState`]; `None` means `Pending`.
#[must_use]
pub fn create_item_tracking_state(
    item_id: &str,
    status: Option<TrackingStatus>,
) -> ItemTrackingState {
    ItemTrackingState::new(item_id, status.unwrap_or_default())
}

/// Build an empty [`AppState`] at the current schema version.
#[must_use]
pub fn create_empty_app_state() -> AppState {
    AppState::default()
}
