//! Aggregate progress and derived parent statuses.
//!
//! Everything in this module is pure: inputs are a read-only item tree and
//! a [`StatusMap`], and nothing is written anywhere. Missing statuses are
//! read as `Pending` via [`status_of`].
//!
//! # Derivation rules
//!
//! [`derive_parent_status`] looks at direct children only:
//!
//! ```text
//! no children            -> Pending
//! all Complete           -> Complete
//! any InProgress         -> InProgress
//! otherwise              -> Pending
//! ```
//!
//! [`derive_deep_parent_status`] looks at every descendant and adds one
//! sticky rule: a parent that is already `InProgress` stays there while at
//! least one descendant is `Complete`, even if none is `InProgress`. It only
//! drops back to `Pending` once every descendant is `Pending` again.

pub mod cache;
pub mod propagation;

pub use cache::ProgressCache;
pub use propagation::{find_ancestors, propagate_status_change, StatusUpdates};

use serde::{Deserialize, Serialize};

use crate::model::{status_of, StatusMap, TrackableItem, TrackingStatus};

/// Counts of items by status plus a rounded completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParentProgress {
    pub total: usize,
    pub complete: usize,
    pub in_progress: usize,
    pub pending: usize,
    /// `round(complete / total * 100)`, `0` when `total` is `0`.
    pub percentage: u8,
}

impl ParentProgress {
    fn tally<'a>(items: impl Iterator<Item = &'a TrackableItem>, statuses: &StatusMap) -> Self {
        let mut progress = Self::default();
        for item in items {
            progress.total += 1;
            match status_of(statuses, &item.id) {
                TrackingStatus::Complete => progress.complete += 1,
                TrackingStatus::InProgress => progress.in_progress += 1,
                TrackingStatus::Pending => progress.pending += 1,
            }
        }
        progress.percentage = percentage(progress.complete, progress.total);
        progress
    }

    /// Check if there is at least one item and every item is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.complete == self.total
    }

    /// Short human-readable summary, e.g. `2/3 (67%)`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{}/{} ({}%)", self.complete, self.total, self.percentage)
    }
}

fn percentage(complete: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (complete as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Progress over direct children only.
#[must_use]
pub fn calculate_children_progress(
    children: &[TrackableItem],
    statuses: &StatusMap,
) -> ParentProgress {
    ParentProgress::tally(children.iter(), statuses)
}

/// Progress over every descendant of `item`.
#[must_use]
pub fn calculate_deep_progress(item: &TrackableItem, statuses: &StatusMap) -> ParentProgress {
    ParentProgress::tally(item.descendants(), statuses)
}

fn derive_from(progress: &ParentProgress) -> TrackingStatus {
    if progress.total == 0 {
        TrackingStatus::Pending
    } else if progress.complete == progress.total {
        TrackingStatus::Complete
    } else if progress.in_progress > 0 {
        TrackingStatus::InProgress
    } else {
        TrackingStatus::Pending
    }
}

/// Status implied by direct children.
#[must_use]
pub fn derive_parent_status(children: &[TrackableItem], statuses: &StatusMap) -> TrackingStatus {
    derive_from(&calculate_children_progress(children, statuses))
}

/// Status implied by every descendant, with sticky `InProgress`.
///
/// `current` is the parent's status before this derivation; `None` is
/// treated as `Pending`.
///
/// # Example
///
/// ```
/// use trackmark::progress::derive_deep_parent_status;
/// use trackmark::{ItemKind, StatusMap, TrackableItem, TrackingStatus};
///
/// let parent = TrackableItem::new("p", ItemKind::Heading, "Parent").with_children(vec![
///     TrackableItem::new("a", ItemKind::Checkbox, "a"),
///     TrackableItem::new("b", ItemKind::Checkbox, "b"),
/// ]);
/// let mut statuses = StatusMap::new();
/// statuses.insert("a".into(), TrackingStatus::Complete);
///
/// // Partial completion alone does not start a pending parent...
/// assert_eq!(
///     derive_deep_parent_status(&parent, &statuses, Some(TrackingStatus::Pending)),
///     TrackingStatus::Pending
/// );
/// // ...but keeps an in-progress parent in progress.
/// assert_eq!(
///     derive_deep_parent_status(&parent, &statuses, Some(TrackingStatus::InProgress)),
///     TrackingStatus::InProgress
/// );
/// ```
#[must_use]
pub fn derive_deep_parent_status(
    item: &TrackableItem,
    statuses: &StatusMap,
    current: Option<TrackingStatus>,
) -> TrackingStatus {
    let progress = calculate_deep_progress(item, statuses);
    let derived = derive_from(&progress);

    let sticky = derived == TrackingStatus::Pending
        && current.unwrap_or_default() == TrackingStatus::InProgress
        && progress.complete > 0;

    if sticky {
        TrackingStatus::InProgress
    } else {
        derived
    }
}
