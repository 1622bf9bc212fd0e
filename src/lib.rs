//! trackmark - progress tracking for structured documents
//!
//! Tracks completion of headings, list entries and checkboxes extracted
//! from text documents, persists that progress independently of the
//! documents, and keeps derived parent statuses consistent as leaf items
//! change.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`hasher`] - content fingerprints for change detection
//! - [`model`] - tracking statuses, item trees, persisted state and validation
//! - [`store`] - durable per-file state with backups and recovery
//! - [`progress`] - aggregate progress, derived statuses and propagation
//! - [`tracker`] - session facade combining the store and the engine
//! - [`config`] - configuration loading and state directory resolution
//! - [`error`] - custom error types and handling
//! - [`testing`] - shared fixtures
//!
//! Only [`store`] touches disk. Everything in [`progress`] is pure.
//!
//! # Example
//!
//! ```rust,no_run
//! use trackmark::testing::fixtures;
//! use trackmark::{ProgressTracker, StateStore, TrackingStatus};
//!
//! # async fn run() -> trackmark::Result<()> {
//! let tracker = ProgressTracker::new(StateStore::new("/tmp/trackmark-state"));
//! let items = fixtures::propagation_tree();
//!
//! tracker.reconcile("/notes/plan.md", "# Plan\n- [ ] one\n").await?;
//! if let Some(change) = tracker
//!     .set_status("/notes/plan.md", &items, "child-1", TrackingStatus::Complete)
//!     .await?
//! {
//!     println!("{} ancestors updated", change.propagated.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod hasher;
pub mod model;
pub mod progress;
pub mod store;
pub mod testing;
pub mod tracker;

// Re-export commonly used types
pub use error::{Result, TrackError};

pub use config::TrackerConfig;

pub use hasher::{
    compute_content_hash, compute_normalized_hash, has_content_changed, has_meaningful_change,
};

pub use model::{
    status_of, AppState, FileTrackingState, ItemKind, ItemTrackingState, SourceSpan, StatusMap,
    TrackableItem, TrackingStatus,
};

pub use progress::{
    calculate_children_progress, calculate_deep_progress, derive_deep_parent_status,
    derive_parent_status, find_ancestors, propagate_status_change, ParentProgress, ProgressCache,
    StatusUpdates,
};

pub use store::StateStore;

pub use tracker::{
    ContentChange, HashMode, ItemProgress, ProgressTracker, Reconciliation, StatusChange,
};
