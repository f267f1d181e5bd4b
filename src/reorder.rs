//! Drag-Reorder Engine.
//!
//! Owns the transient "currently dragged" reference and the set of items
//! wired for dragging. The engine is inert until [`DragReorderEngine::activate`]
//! is called (edit mode on) and goes inert again on
//! [`DragReorderEngine::deactivate`].
//!
//! ## Insert side
//!
//! On drop, both indices are read from the container at that moment. If
//! the dragged item sits before the target, it lands directly *after* the
//! target; otherwise directly *before*:
//!
//! ```text
//! [A, B, C, D]  drag A onto C (0 < 2)  →  [B, C, A, D]
//! [A, B, C, D]  drag D onto B (3 > 1)  →  [A, D, B, C]
//! ```
//!
//! Dragging down the list therefore passes the target, dragging up stops
//! in front of it.

use crate::gallery::{GalleryContainer, ItemId, Placement};
use std::collections::HashSet;

/// What a drag start did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStart {
    /// The item is now the dragged item. `superseded` is a previous drag
    /// that never ended; its marker must be cleared.
    Started { superseded: Option<ItemId> },
    /// Edit mode is off or the item is not wired. Nothing is marked.
    Inert,
}

/// What a drop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        item: ItemId,
        from: usize,
        to: usize,
    },
    /// Edit mode is off or the target is not wired.
    Inert,
    /// Nothing is being dragged.
    NothingDragged,
    /// Dropped onto itself.
    OntoSelf,
    /// The dragged item or the target left the container mid-gesture.
    Stale,
}

#[derive(Debug, Default)]
pub struct DragReorderEngine {
    active: bool,
    draggable: HashSet<ItemId>,
    dragged: Option<ItemId>,
}

impl DragReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wire every item currently in the container. Safe to call again: items
    /// added since the previous activation get wired too.
    pub fn activate(&mut self, gallery: &GalleryContainer) -> Vec<ItemId> {
        self.active = true;
        let mut wired = Vec::new();
        for id in gallery.ids() {
            if self.draggable.insert(id) {
                wired.push(id);
            }
        }
        log::debug!("drag engine active, {} newly draggable", wired.len());
        wired
    }

    /// Unwire everything and drop any in-progress drag. Returns the unwired
    /// items and the dragged item whose marker must now be cleared.
    pub fn deactivate(&mut self) -> (Vec<ItemId>, Option<ItemId>) {
        self.active = false;
        let dropped = self.dragged.take();
        if let Some(id) = dropped {
            log::debug!("drag of {} abandoned on deactivation", id);
        }
        let mut unwired: Vec<ItemId> = self.draggable.drain().collect();
        unwired.sort();
        (unwired, dropped)
    }

    /// Wire a single new item, as for a freshly ingested file.
    /// Returns `false` while inactive.
    pub fn wire(&mut self, id: ItemId) -> bool {
        if !self.active {
            return false;
        }
        self.draggable.insert(id)
    }

    /// Forget an item that left the container.
    pub fn unwire(&mut self, id: ItemId) {
        self.draggable.remove(&id);
        if self.dragged == Some(id) {
            self.dragged = None;
        }
    }

    pub fn is_draggable(&self, id: ItemId) -> bool {
        self.active && self.draggable.contains(&id)
    }

    pub fn dragged(&self) -> Option<ItemId> {
        self.dragged
    }

    /// Begin dragging `id` and mark it as being dragged.
    pub fn drag_start(&mut self, id: ItemId) -> DragStart {
        if !self.is_draggable(id) {
            return DragStart::Inert;
        }
        let superseded = self.dragged.replace(id).filter(|prev| *prev != id);
        log::trace!("drag start {}", id);
        DragStart::Started { superseded }
    }

    /// Whether a drop on `target` should be accepted (the platform's
    /// "no drop" default suppressed). Never mutates.
    pub fn drag_over(&self, target: ItemId) -> bool {
        self.is_draggable(target)
    }

    /// Drop the dragged item onto `target`, reordering `gallery` in place.
    pub fn drop_on(&mut self, gallery: &mut GalleryContainer, target: ItemId) -> DropOutcome {
        if !self.is_draggable(target) {
            return DropOutcome::Inert;
        }
        let Some(dragged) = self.dragged else {
            return DropOutcome::NothingDragged;
        };
        if dragged == target {
            return DropOutcome::OntoSelf;
        }
        let (Some(from), Some(target_index)) = (gallery.index_of(dragged), gallery.index_of(target))
        else {
            log::debug!("drop of {} onto {} with a stale item", dragged, target);
            return DropOutcome::Stale;
        };
        let placement = if from < target_index {
            Placement::After
        } else {
            Placement::Before
        };
        match gallery.move_relative(dragged, target, placement) {
            Some(to) => {
                log::debug!("moved {} from {} to {}", dragged, from, to);
                DropOutcome::Moved {
                    item: dragged,
                    from,
                    to,
                }
            }
            None => DropOutcome::Stale,
        }
    }

    /// End of the gesture, dropped or cancelled. Always clears the dragged
    /// reference; returns the item whose marker should be cleared.
    pub fn drag_end(&mut self, id: ItemId) -> Option<ItemId> {
        let cleared = self.dragged.take();
        log::trace!("drag end {} (was dragging {:?})", id, cleared);
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::NewItem;
    use crate::test_helpers::{container_of, id_at, sources};

    fn active_engine(gallery: &GalleryContainer) -> DragReorderEngine {
        let mut engine = DragReorderEngine::new();
        engine.activate(gallery);
        engine
    }

    /// Full gesture: start on `from`, drop on `onto`, end.
    fn drag(
        engine: &mut DragReorderEngine,
        gallery: &mut GalleryContainer,
        from: usize,
        onto: usize,
    ) -> DropOutcome {
        let dragged = id_at(gallery, from);
        let target = id_at(gallery, onto);
        assert!(matches!(engine.drag_start(dragged), DragStart::Started { .. }));
        assert!(engine.drag_over(target));
        let outcome = engine.drop_on(gallery, target);
        engine.drag_end(dragged);
        outcome
    }

    #[test]
    fn dragging_down_lands_after_target() {
        let mut g = container_of(&["A", "B", "C", "D"]);
        let mut e = active_engine(&g);
        let outcome = drag(&mut e, &mut g, 0, 2);
        assert!(matches!(outcome, DropOutcome::Moved { from: 0, to: 2, .. }));
        assert_eq!(sources(&g), ["B", "C", "A", "D"]);
    }

    #[test]
    fn dragging_up_lands_before_target() {
        let mut g = container_of(&["A", "B", "C", "D"]);
        let mut e = active_engine(&g);
        let outcome = drag(&mut e, &mut g, 3, 1);
        assert!(matches!(outcome, DropOutcome::Moved { from: 3, to: 1, .. }));
        assert_eq!(sources(&g), ["A", "D", "B", "C"]);
    }

    #[test]
    fn adjacent_swaps() {
        let mut g = container_of(&["A", "B", "C"]);
        let mut e = active_engine(&g);
        drag(&mut e, &mut g, 0, 1);
        assert_eq!(sources(&g), ["B", "A", "C"]);
        drag(&mut e, &mut g, 2, 1);
        assert_eq!(sources(&g), ["B", "C", "A"]);
    }

    #[test]
    fn drop_onto_self_is_noop() {
        let mut g = container_of(&["A", "B", "C"]);
        let mut e = active_engine(&g);
        assert_eq!(drag(&mut e, &mut g, 1, 1), DropOutcome::OntoSelf);
        assert_eq!(sources(&g), ["A", "B", "C"]);
    }

    #[test]
    fn drop_without_drag_is_noop() {
        let mut g = container_of(&["A", "B"]);
        let mut e = active_engine(&g);
        let target = id_at(&g, 1);
        assert_eq!(e.drop_on(&mut g, target), DropOutcome::NothingDragged);
        assert_eq!(sources(&g), ["A", "B"]);
    }

    #[test]
    fn every_drop_is_a_permutation() {
        let mut g = container_of(&["A", "B", "C", "D", "E", "F"]);
        let mut e = active_engine(&g);
        let mut expected: Vec<String> = sources(&g).iter().map(|s| s.to_string()).collect();
        expected.sort();
        let pairs = [(0, 5), (5, 0), (2, 3), (3, 2), (1, 4), (4, 4), (5, 1), (0, 2)];
        for (from, onto) in pairs {
            drag(&mut e, &mut g, from, onto);
            let mut now: Vec<String> = sources(&g).iter().map(|s| s.to_string()).collect();
            now.sort();
            assert_eq!(now, expected);
        }
    }

    #[test]
    fn inactive_engine_is_inert() {
        let mut g = container_of(&["A", "B"]);
        let mut e = DragReorderEngine::new();
        let a = id_at(&g, 0);
        let b = id_at(&g, 1);
        assert!(!e.is_draggable(a));
        assert_eq!(e.drag_start(a), DragStart::Inert);
        assert!(!e.drag_over(b));
        assert_eq!(e.drop_on(&mut g, b), DropOutcome::Inert);
        assert_eq!(sources(&g), ["A", "B"]);
    }

    #[test]
    fn deactivate_unwires_and_clears_drag() {
        let mut g = container_of(&["A", "B"]);
        let mut e = active_engine(&g);
        let a = id_at(&g, 0);
        e.drag_start(a);
        let (unwired, dropped) = e.deactivate();
        assert_eq!(unwired.len(), 2);
        assert_eq!(dropped, Some(a));
        assert_eq!(e.dragged(), None);
        assert_eq!(e.drag_end(a), None);
        let b = id_at(&g, 1);
        assert_eq!(e.drop_on(&mut g, b), DropOutcome::Inert);
    }

    #[test]
    fn drag_end_clears_reference_without_drop() {
        let g = container_of(&["A", "B"]);
        let mut e = active_engine(&g);
        let a = id_at(&g, 0);
        e.drag_start(a);
        assert_eq!(e.drag_end(a), Some(a));
        assert_eq!(e.drag_end(a), None);
        assert_eq!(e.dragged(), None);
    }

    #[test]
    fn at_most_one_item_dragged() {
        let g = container_of(&["A", "B"]);
        let mut e = active_engine(&g);
        let a = id_at(&g, 0);
        let b = id_at(&g, 1);
        assert_eq!(e.drag_start(a), DragStart::Started { superseded: None });
        // A drag that never ended is superseded and its marker reported.
        assert_eq!(
            e.drag_start(b),
            DragStart::Started {
                superseded: Some(a),
            }
        );
        assert_eq!(e.dragged(), Some(b));
    }

    #[test]
    fn reactivation_wires_new_items_only() {
        let mut g = container_of(&["A"]);
        let mut e = active_engine(&g);
        let b = g.push(NewItem::new("B"));
        assert!(!e.is_draggable(b));
        assert_eq!(e.activate(&g), vec![b]);
        assert!(e.is_draggable(b));
    }

    #[test]
    fn wire_only_while_active() {
        let mut g = container_of(&["A"]);
        let mut e = DragReorderEngine::new();
        let b = g.push(NewItem::new("B"));
        assert!(!e.wire(b));
        e.activate(&g);
        let c = g.push(NewItem::new("C"));
        assert!(e.wire(c));
        assert!(e.is_draggable(c));
    }

    #[test]
    fn indices_read_at_drop_time() {
        // An item appended between drag start and drop must not skew the move.
        let mut g = container_of(&["A", "B", "C"]);
        let mut e = active_engine(&g);
        let c = id_at(&g, 2);
        let a = id_at(&g, 0);
        e.drag_start(c);
        let z = g.push(NewItem::new("Z"));
        e.wire(z);
        e.drop_on(&mut g, a);
        assert_eq!(sources(&g), ["C", "A", "B", "Z"]);
    }

    #[test]
    fn dragged_item_removed_mid_gesture_is_stale() {
        let mut g = container_of(&["A", "B"]);
        let mut e = active_engine(&g);
        let a = id_at(&g, 0);
        e.drag_start(a);
        g.clear();
        let c = g.push(NewItem::new("C"));
        e.wire(c);
        assert_eq!(e.drop_on(&mut g, c), DropOutcome::Stale);
    }
}
