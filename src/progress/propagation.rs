//! Ancestor status propagation.
//!
//! When one item changes, every ancestor is re-derived nearest-first with
//! [`derive_deep_parent_status`]. Each derived change is written into a
//! working copy of the status map before the next ancestor is evaluated,
//! so a grandparent always sees its parent's new status.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::derive_deep_parent_status;
use crate::model::{status_of, walk, StatusMap, TrackableItem, TrackingStatus};

/// Ancestor status changes produced by one propagation, keyed by item id.
pub type StatusUpdates = HashMap<String, TrackingStatus>;

/// Ids of every ancestor of `item_id`, nearest first.
///
/// Returns an empty list for roots and for ids not in the tree. Trees with
/// repeated ids still terminate: the walk stops at the first id it has
/// already visited.
#[must_use]
pub fn find_ancestors(item_id: &str, items: &[TrackableItem]) -> Vec<String> {
    let parents = parent_index(items);

    let mut visited = HashSet::from([item_id]);
    let mut chain = Vec::new();
    let mut current = item_id;
    while let Some(&parent) = parents.get(current) {
        if !visited.insert(parent) {
            warn!("Item id {} repeats in its own ancestry; stopping there", parent);
            break;
        }
        chain.push(parent.to_string());
        current = parent;
    }
    chain
}

/// Child id to parent id. The first occurrence of a repeated id wins.
fn parent_index(items: &[TrackableItem]) -> HashMap<&str, &str> {
    let mut parents = HashMap::new();
    for item in walk(items) {
        for child in &item.children {
            parents.entry(child.id.as_str()).or_insert(item.id.as_str());
        }
    }
    parents
}

/// Re-derive every ancestor of `changed_item_id` and return the ones whose
/// status changed.
///
/// `statuses` must already contain the changed item's new status. Ancestors
/// whose derived status equals their current one are left out, so an empty
/// map means nothing needs persisting.
#[must_use]
pub fn propagate_status_change(
    changed_item_id: &str,
    items: &[TrackableItem],
    statuses: &StatusMap,
) -> StatusUpdates {
    let by_id: HashMap<&str, &TrackableItem> =
        walk(items).map(|item| (item.id.as_str(), item)).collect();

    let mut working = statuses.clone();
    let mut updates = StatusUpdates::new();

    for ancestor_id in find_ancestors(changed_item_id, items) {
        let Some(ancestor) = by_id.get(ancestor_id.as_str()) else {
            continue;
        };
        let current = status_of(&working, &ancestor_id);
        let derived = derive_deep_parent_status(ancestor, &working, Some(current));
        if derived != current {
            working.insert(ancestor_id.clone(), derived);
            updates.insert(ancestor_id, derived);
        }
    }

    updates
}
