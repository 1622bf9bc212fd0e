//! Parsed document items consumed by the progress engine.
//!
//! Items are produced by an external document parser. The engine only
//! reads them, so nothing here mutates a tree after construction.

use serde::{Deserialize, Serialize};

/// Kind of trackable element in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A section heading (`# Title`)
    Heading,
    /// A plain list entry (`- entry`)
    ListItem,
    /// A checkbox list entry (`- [ ] task`)
    Checkbox,
}

/// Source position of an item, 1-based lines and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// One node in a parsed document hierarchy.
///
/// `id` is unique within a document. Children are owned, so the hierarchy
/// is always a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackableItem {
    pub id: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub position: SourceSpan,
    #[serde(default)]
    pub children: Vec<TrackableItem>,
}

impl TrackableItem {
    /// Create a leaf item with default position.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            depth: 0,
            content: content.into(),
            position: SourceSpan::default(),
            children: Vec::new(),
        }
    }

    /// Attach children, setting each child's depth below this item.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TrackableItem>) -> Self {
        self.children = children;
        self.reset_depths(self.depth);
        self
    }

    /// Set this item to `depth` and every descendant below it.
    fn reset_depths(&mut self, depth: u32) {
        self.depth = depth;
        let mut stack: Vec<(&mut TrackableItem, u32)> =
            self.children.iter_mut().map(|child| (child, depth + 1)).collect();
        while let Some((item, depth)) = stack.pop() {
            item.depth = depth;
            stack.extend(item.children.iter_mut().map(|child| (child, depth + 1)));
        }
    }

    /// Check if this item has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Pre-order iterator over every descendant, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator over a subtree, driven by an explicit stack so deep
/// documents do not grow the call stack.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a TrackableItem>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TrackableItem;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        self.stack.extend(item.children.iter().rev());
        Some(item)
    }
}

/// Pre-order iterator over a whole forest of root items.
pub fn walk(items: &[TrackableItem]) -> Descendants<'_> {
    Descendants {
        stack: items.iter().rev().collect(),
    }
}

/// Find an item anywhere in a forest by id.
#[must_use]
pub fn find_item<'a>(items: &'a [TrackableItem], item_id: &str) -> Option<&'a TrackableItem> {
    walk(items).find(|item| item.id == item_id)
}
