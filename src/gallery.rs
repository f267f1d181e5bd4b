//! The gallery data model: items and the ordered container that owns them.
//!
//! An item's position is never stored. It is the item's index in
//! [`GalleryContainer`] at the moment someone asks, which keeps the total
//! order invariant trivially true: a `Vec` cannot have gaps or duplicate
//! positions.
//!
//! ## Identity
//!
//! Items are compared by [`ItemId`], a small integer handed out by the
//! container that owns them. Ids are never reused within a container, even
//! after [`GalleryContainer::clear`], so a stale id held by a rendering
//! adapter can never alias a newer item.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a [`GalleryItem`] within its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// One displayed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: ItemId,
    /// URL or `data:` URI.
    pub source: String,
    /// Caption. `None` means "use the positional label at display time".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Human-readable size, present only for ingested files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
}

impl GalleryItem {
    /// Caption to display for this item at the given zero-based index.
    ///
    /// Falls back to `"{caption_prefix} {index + 1}"` when no caption was
    /// assigned, so the label follows the item's current rank.
    pub fn caption(&self, index: usize, caption_prefix: &str) -> String {
        match &self.alt_text {
            Some(alt) if !alt.is_empty() => alt.clone(),
            _ => positional_label(caption_prefix, index),
        }
    }
}

/// Positional caption for a zero-based index, e.g. `Photography work 3`.
pub fn positional_label(caption_prefix: &str, index: usize) -> String {
    format!("{} {}", caption_prefix, index + 1)
}

/// Fields for an item that has not been added to a container yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub source: String,
    pub alt_text: Option<String>,
    pub size_label: Option<String>,
}

impl NewItem {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alt_text: None,
            size_label: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    pub fn with_size_label(mut self, label: impl Into<String>) -> Self {
        self.size_label = Some(label.into());
        self
    }
}

/// Where a moved item lands relative to its drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Ordered, exclusively-owning sequence of gallery items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryContainer {
    items: Vec<GalleryItem>,
    next_id: u64,
}

impl GalleryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the end and return its freshly allocated id.
    pub fn push(&mut self, item: NewItem) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(GalleryItem {
            id,
            source: item.source,
            alt_text: item.alt_text,
            size_label: item.size_label,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalleryItem> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|i| i.id)
    }

    /// Current zero-based index of an item. O(n).
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&GalleryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Item at a zero-based index.
    pub fn at(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    /// Move `moved` so it sits directly before or after `target`.
    ///
    /// Both indices are looked up at call time. Returns the new index of the
    /// moved item, or `None` (leaving the order untouched) when either id is
    /// unknown or the two are the same item.
    pub fn move_relative(
        &mut self,
        moved: ItemId,
        target: ItemId,
        placement: Placement,
    ) -> Option<usize> {
        if moved == target {
            return None;
        }
        let from = self.index_of(moved)?;
        self.index_of(target)?;
        let item = self.items.remove(from);
        // Target index after the removal shifted everything past `from`.
        let target_index = self.index_of(target)?;
        let to = match placement {
            Placement::Before => target_index,
            Placement::After => target_index + 1,
        };
        self.items.insert(to, item);
        Some(to)
    }

    /// Remove every item. Id allocation keeps counting.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }
}
