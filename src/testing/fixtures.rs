//! Pre-built item trees for consistent testing.

use crate::model::{ItemKind, TrackableItem};

fn checkbox(id: &str) -> TrackableItem {
    TrackableItem::new(id, ItemKind::Checkbox, id)
}

/// The canonical propagation tree.
///
/// ```text
/// grandparent
///   ├── parent
///   │     ├── child-1
///   │     └── child-2
///   └── aunt
///         └── cousin
/// ```
#[must_use]
pub fn propagation_tree() -> Vec<TrackableItem> {
    let parent = TrackableItem::new("parent", ItemKind::ListItem, "Parent")
        .with_children(vec![checkbox("child-1"), checkbox("child-2")]);
    let aunt = TrackableItem::new("aunt", ItemKind::ListItem, "Aunt")
        .with_children(vec![checkbox("cousin")]);

    vec![TrackableItem::new("grandparent", ItemKind::Heading, "Grandparent")
        .with_children(vec![parent, aunt])]
}

/// A parent with three checkbox children `child-1` .. `child-3`.
#[must_use]
pub fn three_child_parent() -> TrackableItem {
    TrackableItem::new("parent", ItemKind::Heading, "Parent").with_children(vec![
        checkbox("child-1"),
        checkbox("child-2"),
        checkbox("child-3"),
    ])
}

/// A single chain `node-0 -> node-1 -> ... -> node-{length}`.
///
/// Built bottom-up without recursion so long chains are cheap to create.
#[must_use]
pub fn deep_chain(length: usize) -> TrackableItem {
    let mut node = checkbox(&format!("node-{length}"));
    node.depth = length as u32;
    for i in (0..length).rev() {
        let mut parent = TrackableItem::new(format!("node-{i}"), ItemKind::ListItem, "");
        parent.depth = i as u32;
        parent.children.push(node);
        node = parent;
    }
    node
}

/// `sections` headings, each with `items_per_section` checkboxes.
///
/// Ids are `section-{s}` and `section-{s}/item-{i}`.
#[must_use]
pub fn sectioned_document(sections: usize, items_per_section: usize) -> Vec<TrackableItem> {
    (0..sections)
        .map(|s| {
            let items = (0..items_per_section)
                .map(|i| checkbox(&format!("section-{s}/item-{i}")))
                .collect();
            TrackableItem::new(format!("section-{s}"), ItemKind::Heading, format!("Section {s}"))
                .with_children(items)
        })
        .collect()
}
