// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-axis sorting of items inside a container.
//!
//! The state here is per-session: a snapshot of sibling rectangles in visual
//! order, the cumulative axis offset applied to each, and the bookkeeping for
//! the directional tie-break that keeps sub-pixel jitter from oscillating a
//! swap back and forth.

use alloc::vec::Vec;

use kurbo::Point;

use crate::adapter::ElementId;
use crate::config::DragId;
use dragyard_geometry::{Direction, Orientation};

/// Tracks the pointer's direction of travel per axis. The sign only flips
/// once movement since the last flip exceeds the threshold, so tiny
/// counter-movements do not register as a direction change.
#[derive(Copy, Clone, Debug)]
pub(crate) struct DirectionTracker {
    threshold: f64,
    anchor: Point,
    delta: (i8, i8),
}

impl DirectionTracker {
    pub(crate) fn new(threshold: f64, start: Point) -> Self {
        Self {
            threshold,
            anchor: start,
            delta: (0, 0),
        }
    }

    pub(crate) fn update(&mut self, position: Point) {
        let change_x = position.x - self.anchor.x;
        if change_x.abs() > self.threshold {
            self.delta.0 = if change_x > 0.0 { 1 } else { -1 };
            self.anchor.x = position.x;
        }
        let change_y = position.y - self.anchor.y;
        if change_y.abs() > self.threshold {
            self.delta.1 = if change_y > 0.0 { 1 } else { -1 };
            self.anchor.y = position.y;
        }
    }

    pub(crate) fn delta(&self) -> (i8, i8) {
        self.delta
    }
}

/// One tracked slot in the sorted container: the item, the element that gets
/// offset when the slot shifts (the placeholder for the dragged item, the
/// root element for siblings), its cached rectangle, and the cumulative axis
/// offset currently applied.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SortEntry {
    pub(crate) item: DragId,
    pub(crate) element: ElementId,
    pub(crate) rect: kurbo::Rect,
    pub(crate) offset: f64,
}

impl SortEntry {
    pub(crate) fn new(item: DragId, element: ElementId, rect: kurbo::Rect) -> Self {
        Self {
            item,
            element,
            rect,
            offset: 0.0,
        }
    }
}

/// A committed swap: the index change plus the axis offsets to apply.
#[derive(Clone, Debug)]
pub(crate) struct SortCommit {
    pub(crate) previous_index: usize,
    pub(crate) current_index: usize,
    /// `(element, cumulative axis offset)` for every slot that shifted.
    pub(crate) moves: Vec<(ElementId, f64)>,
}

#[derive(Copy, Clone, Debug, Default)]
struct PreviousSwap {
    item: Option<DragId>,
    delta: i8,
    overlaps: bool,
}

/// Sort state for the container the drag is currently over.
#[derive(Clone, Debug)]
pub(crate) struct SortState {
    orientation: Orientation,
    direction: Direction,
    entries: Vec<SortEntry>,
    previous_swap: PreviousSwap,
}

impl SortState {
    pub(crate) fn new(orientation: Orientation, direction: Direction) -> Self {
        Self {
            orientation,
            direction,
            entries: Vec::new(),
            previous_swap: PreviousSwap::default(),
        }
    }

    /// Replaces the tracked slots with freshly measured ones, in visual
    /// layout order (lead edge ascending, direction-aware).
    pub(crate) fn rebuild(&mut self, mut entries: Vec<SortEntry>) {
        entries.sort_by(|a, b| {
            let ka = self.orientation.lead(a.rect, self.direction);
            let kb = self.orientation.lead(b.rect, self.direction);
            ka.partial_cmp(&kb).unwrap_or(core::cmp::Ordering::Equal)
        });
        self.entries = entries;
        self.previous_swap = PreviousSwap::default();
    }

    pub(crate) fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub(crate) fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Refreshes cached rectangles from fresh measurements, keeping order
    /// and offsets. Items that no longer measure keep their stale rect; a
    /// missing sibling degrades, it does not end the session.
    pub(crate) fn remeasure(&mut self, mut measure: impl FnMut(DragId) -> Option<kurbo::Rect>) {
        for entry in &mut self.entries {
            if let Some(rect) = measure(entry.item) {
                entry.rect = rect;
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn index_of(&self, item: DragId) -> Option<usize> {
        self.entries.iter().position(|e| e.item == item)
    }

    /// Inserts a freshly entering slot at `index`, deriving its rectangle
    /// from the neighbor it displaces and shifting the displaced slots along
    /// by the entering extent. This mirrors the reflow the host performs once
    /// the placeholder joins the container, so the state stays usable without
    /// waiting for a measurement of the new layout. `fallback` anchors the
    /// slot in an empty container. Returns the clamped index.
    pub(crate) fn insert_slot(
        &mut self,
        index: usize,
        item: DragId,
        element: ElementId,
        size: kurbo::Size,
        fallback: kurbo::Rect,
    ) -> usize {
        let index = index.min(self.entries.len());
        let lead = match (self.entries.get(index), self.entries.last()) {
            // The entering slot takes over the displaced neighbor's position.
            (Some(next), _) => self.orientation.lead(next.rect, self.direction),
            // Past the last slot: flush against its trailing edge.
            (None, Some(last)) => {
                self.orientation.lead(last.rect, self.direction)
                    + self.orientation.extent(last.rect)
            }
            // Empty container: the slot starts at the container's lead edge.
            (None, None) => self.orientation.lead(fallback, self.direction),
        };
        let anchor = self
            .entries
            .get(index)
            .or_else(|| self.entries.last())
            .map_or(fallback, |e| e.rect);
        let rect = match (self.orientation, self.direction) {
            (Orientation::Vertical, _) => {
                kurbo::Rect::from_origin_size((anchor.x0, lead), size)
            }
            (Orientation::Horizontal, Direction::Ltr) => {
                kurbo::Rect::from_origin_size((lead, anchor.y0), size)
            }
            // `lead` is the mirrored right edge.
            (Orientation::Horizontal, Direction::Rtl) => {
                kurbo::Rect::from_origin_size((-lead - size.width, anchor.y0), size)
            }
        };
        let extent = match self.orientation {
            Orientation::Vertical => size.height,
            Orientation::Horizontal => size.width,
        };
        let step = self
            .orientation
            .vec(self.orientation.in_layout_order(extent, self.direction));
        for entry in &mut self.entries[index..] {
            entry.rect = entry.rect + step;
        }
        self.entries.insert(index, SortEntry::new(item, element, rect));
        self.previous_swap = PreviousSwap::default();
        index
    }

    /// Shifts every cached rectangle, compensating for an ancestor scroll.
    pub(crate) fn shift_all(&mut self, delta: kurbo::Vec2) {
        for entry in &mut self.entries {
            entry.rect = entry.rect + delta;
        }
    }

    /// Index a freshly entering item should occupy, given the pointer
    /// position. A pointer over a tracked slot lands at that slot's index;
    /// before the first slot it lands at the start of the list (the end for
    /// reverse-visual-order containers), after the last at the end (the
    /// start for reverse order).
    pub(crate) fn entry_index(&self, pointer: Point, reverse_order: bool) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| self.orientation.contains(e.rect, pointer))
        {
            return index;
        }
        let pos = self
            .orientation
            .in_layout_order(self.orientation.of_point(pointer), self.direction);
        let first = self.orientation.lead(self.entries[0].rect, self.direction);
        if pos < first {
            return if reverse_order { self.entries.len() } else { 0 };
        }
        // A pointer in the margin gap between two slots resolves to the
        // boundary between them: the index of the slot that follows the gap.
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| self.orientation.lead(e.rect, self.direction) > pos)
        {
            return index;
        }
        if reverse_order { 0 } else { self.entries.len() }
    }

    /// Attempts a swap for the current pointer position.
    ///
    /// `pointer_delta` is the tracked direction of travel; `sort_allowed` is
    /// the container's sort predicate, consulted with the candidate index.
    /// Returns `None` when nothing changed: no slot under the pointer, the
    /// index is already current, the tie-break suppressed a re-swap, a
    /// single-slot container, or a predicate refusal.
    pub(crate) fn sort(
        &mut self,
        item: DragId,
        pointer: Point,
        pointer_delta: (i8, i8),
        sort_allowed: impl Fn(usize) -> bool,
    ) -> Option<SortCommit> {
        if self.entries.len() < 2 {
            return None;
        }
        let new_index = self.index_from_pointer(item, pointer, pointer_delta)?;
        let current_index = self.index_of(item)?;
        if new_index == current_index || !sort_allowed(new_index) {
            return None;
        }

        let swapped_item = self.entries[new_index].item;
        let current_rect = self.entries[current_index].rect;
        let new_rect = self.entries[new_index].rect;
        // Siblings shift opposite to the item: up/left when the item moves
        // down/right.
        let delta: i8 = if current_index > new_index { 1 } else { -1 };
        let item_offset = self.item_offset(current_rect, new_rect, delta);
        let sibling_offset = self.sibling_offset(current_index, delta);

        let old_order: Vec<DragId> = self.entries.iter().map(|e| e.item).collect();
        let entry = self.entries.remove(current_index);
        self.entries.insert(new_index, entry);

        let mut moves = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if old_order[index] == entry.item {
                continue;
            }
            let offset = if entry.item == item {
                item_offset
            } else {
                sibling_offset
            };
            entry.offset += offset;
            entry.rect = entry.rect + self.orientation.vec(offset);
            moves.push((entry.element, entry.offset));
        }

        // The swapped sibling's rect has shifted by now; overlap is judged
        // against where it ended up.
        let overlaps = self
            .index_of(swapped_item)
            .is_some_and(|i| self.orientation.contains(self.entries[i].rect, pointer));
        self.previous_swap = PreviousSwap {
            item: Some(swapped_item),
            delta: self.axis_component(pointer_delta),
            overlaps,
        };

        Some(SortCommit {
            previous_index: current_index,
            current_index: new_index,
            moves,
        })
    }

    fn axis_component(&self, delta: (i8, i8)) -> i8 {
        match self.orientation {
            Orientation::Horizontal => delta.0,
            Orientation::Vertical => delta.1,
        }
    }

    /// Index of the slot the pointer is over, honoring the tie-break: the
    /// sibling of the previous swap is skipped while the pointer still
    /// overlaps it and travels in the same direction as that swap.
    fn index_from_pointer(
        &self,
        item: DragId,
        pointer: Point,
        pointer_delta: (i8, i8),
    ) -> Option<usize> {
        let direction = self.axis_component(pointer_delta);
        self.entries.iter().position(|e| {
            if e.item == item {
                return false;
            }
            if self.previous_swap.item == Some(e.item)
                && self.previous_swap.overlaps
                && direction != 0
                && direction == self.previous_swap.delta
            {
                return false;
            }
            self.orientation.contains(e.rect, pointer)
        })
    }

    /// Axis offset for the dragged slot when it moves to the new index.
    fn item_offset(&self, current: kurbo::Rect, new: kurbo::Rect, delta: i8) -> f64 {
        let mut offset = match self.orientation {
            Orientation::Horizontal => new.x0 - current.x0,
            Orientation::Vertical => new.y0 - current.y0,
        };
        // Moving toward the end: line up with the far edge of the slot.
        if delta == -1 {
            offset += self.orientation.extent(new) - self.orientation.extent(current);
        }
        offset
    }

    /// Axis offset for the siblings the dragged slot passes: the slot's own
    /// extent plus the gap (margin) to its immediate neighbor in the travel
    /// direction.
    fn sibling_offset(&self, current_index: usize, delta: i8) -> f64 {
        let current = self.entries[current_index].rect;
        let mut offset = self.orientation.extent(current) * f64::from(delta);
        let neighbor_index = if delta == -1 {
            current_index.checked_add(1)
        } else {
            current_index.checked_sub(1)
        };
        if let Some(neighbor) = neighbor_index.and_then(|i| self.entries.get(i)) {
            let (start, end) = match self.orientation {
                Orientation::Horizontal => ((current.x0, current.x1), (neighbor.rect.x0, neighbor.rect.x1)),
                Orientation::Vertical => ((current.y0, current.y1), (neighbor.rect.y0, neighbor.rect.y1)),
            };
            if delta == -1 {
                offset -= end.0 - start.1;
            } else {
                offset += start.0 - end.1;
            }
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Rect;

    use super::*;

    fn id(raw: u64) -> DragId {
        DragId::from_raw(raw)
    }

    fn el(raw: u64) -> ElementId {
        ElementId::from_raw(raw)
    }

    fn vertical_stack(heights: &[f64]) -> SortState {
        let mut state = SortState::new(Orientation::Vertical, Direction::Ltr);
        let mut y = 0.0;
        let mut entries = Vec::new();
        for (i, h) in heights.iter().enumerate() {
            let raw = i as u64;
            entries.push(SortEntry::new(
                id(raw),
                el(raw),
                Rect::new(0.0, y, 100.0, y + h),
            ));
            y += h;
        }
        state.rebuild(entries);
        state
    }

    #[test]
    fn no_sort_in_single_slot_container() {
        let mut state = vertical_stack(&[50.0]);
        assert!(
            state
                .sort(id(0), Point::new(10.0, 25.0), (0, 1), |_| true)
                .is_none()
        );
    }

    #[test]
    fn pointer_over_own_slot_does_not_sort() {
        let mut state = vertical_stack(&[50.0, 50.0]);
        assert!(
            state
                .sort(id(0), Point::new(10.0, 25.0), (0, 1), |_| true)
                .is_none()
        );
    }

    #[test]
    fn dragging_down_swaps_and_offsets() {
        let mut state = vertical_stack(&[50.0, 50.0, 50.0]);
        let commit = state
            .sort(id(0), Point::new(10.0, 55.0), (0, 1), |_| true)
            .expect("pointer entered the second slot");
        assert_eq!(commit.previous_index, 0);
        assert_eq!(commit.current_index, 1);
        // The passed sibling shifts up by the item's extent, the item's slot
        // shifts down by the same amount.
        assert!(commit.moves.contains(&(el(1), -50.0)));
        assert!(commit.moves.contains(&(el(0), 50.0)));
        assert_eq!(state.index_of(id(0)), Some(1));
    }

    #[test]
    fn sibling_offset_includes_the_margin_gap() {
        let mut state = SortState::new(Orientation::Vertical, Direction::Ltr);
        state.rebuild(vec![
            SortEntry::new(id(0), el(0), Rect::new(0.0, 0.0, 100.0, 50.0)),
            // 10px margin between the two items.
            SortEntry::new(id(1), el(1), Rect::new(0.0, 60.0, 100.0, 110.0)),
        ]);
        let commit = state
            .sort(id(0), Point::new(10.0, 65.0), (0, 1), |_| true)
            .expect("pointer entered the second slot");
        assert!(commit.moves.contains(&(el(1), -60.0)));
    }

    #[test]
    fn sort_predicate_refusal_is_a_no_op() {
        let mut state = vertical_stack(&[50.0, 50.0]);
        assert!(
            state
                .sort(id(0), Point::new(10.0, 55.0), (0, 1), |_| false)
                .is_none()
        );
        assert_eq!(state.index_of(id(0)), Some(0));
    }

    #[test]
    fn same_direction_recross_is_suppressed_but_reverse_swaps_back() {
        // A short item dragged past a tall sibling: after the swap the
        // pointer still overlaps the sibling's shifted rect, which is the
        // exact setup the tie-break exists for.
        let mut state = SortState::new(Orientation::Vertical, Direction::Ltr);
        state.rebuild(vec![
            SortEntry::new(id(0), el(0), Rect::new(0.0, 0.0, 100.0, 40.0)),
            SortEntry::new(id(1), el(1), Rect::new(0.0, 40.0, 100.0, 140.0)),
        ]);

        let commit = state
            .sort(id(0), Point::new(10.0, 45.0), (0, 1), |_| true)
            .expect("crossing into the sibling swaps");
        assert_eq!((commit.previous_index, commit.current_index), (0, 1));

        // 1px further in the same direction: still over the sibling's new
        // rect, but the swap must not immediately re-trigger.
        assert!(
            state
                .sort(id(0), Point::new(10.0, 46.0), (0, 1), |_| true)
                .is_none()
        );

        // 1px back in the opposite direction swaps back.
        let back = state
            .sort(id(0), Point::new(10.0, 45.0), (0, -1), |_| true)
            .expect("opposite direction may swap back");
        assert_eq!((back.previous_index, back.current_index), (1, 0));
    }

    #[test]
    fn insert_slot_takes_over_the_displaced_position() {
        let mut state = vertical_stack(&[50.0, 50.0]);
        let index = state.insert_slot(
            0,
            id(9),
            el(9),
            kurbo::Size::new(100.0, 40.0),
            Rect::new(0.0, 0.0, 100.0, 200.0),
        );
        assert_eq!(index, 0);
        // The entering slot sits where the displaced neighbor was; the
        // former slots shift along by the entering extent.
        assert_eq!(state.entries()[0].rect, Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(state.entries()[1].rect, Rect::new(0.0, 40.0, 100.0, 90.0));
        assert_eq!(state.entries()[2].rect, Rect::new(0.0, 90.0, 100.0, 140.0));
    }

    #[test]
    fn insert_slot_appends_flush_after_the_last_slot() {
        let mut state = vertical_stack(&[50.0]);
        let index = state.insert_slot(
            7,
            id(9),
            el(9),
            kurbo::Size::new(100.0, 40.0),
            Rect::new(0.0, 0.0, 100.0, 200.0),
        );
        assert_eq!(index, 1);
        assert_eq!(state.entries()[1].rect, Rect::new(0.0, 50.0, 100.0, 90.0));
        // An empty container anchors the slot at its own lead edge.
        let mut empty = SortState::new(Orientation::Vertical, Direction::Ltr);
        empty.insert_slot(
            0,
            id(9),
            el(9),
            kurbo::Size::new(100.0, 40.0),
            Rect::new(20.0, 30.0, 120.0, 230.0),
        );
        assert_eq!(empty.entries()[0].rect, Rect::new(20.0, 30.0, 120.0, 70.0));
    }

    #[test]
    fn entry_index_resolves_margin_gaps_to_the_boundary() {
        let mut state = SortState::new(Orientation::Vertical, Direction::Ltr);
        state.rebuild(vec![
            SortEntry::new(id(0), el(0), Rect::new(0.0, 0.0, 100.0, 50.0)),
            SortEntry::new(id(1), el(1), Rect::new(0.0, 60.0, 100.0, 110.0)),
        ]);
        // In the 10px margin between the slots: the index between them, not
        // the end of the list.
        assert_eq!(state.entry_index(Point::new(10.0, 55.0), false), 1);
    }

    #[test]
    fn entry_index_maps_edges_and_reverse_order() {
        let state = vertical_stack(&[50.0, 50.0]);
        // Incoming item (not tracked) above the first slot.
        assert_eq!(state.entry_index(Point::new(10.0, -5.0), false), 0);
        assert_eq!(state.entry_index(Point::new(10.0, -5.0), true), 2);
        // Past the last slot.
        assert_eq!(state.entry_index(Point::new(10.0, 500.0), false), 2);
        assert_eq!(state.entry_index(Point::new(10.0, 500.0), true), 0);
        // Over a slot.
        assert_eq!(state.entry_index(Point::new(10.0, 75.0), false), 1);
    }

    #[test]
    fn horizontal_rtl_orders_by_visual_lead() {
        let mut state = SortState::new(Orientation::Horizontal, Direction::Rtl);
        // In RTL the first item sits at the right.
        state.rebuild(vec![
            SortEntry::new(id(1), el(1), Rect::new(0.0, 0.0, 50.0, 20.0)),
            SortEntry::new(id(0), el(0), Rect::new(50.0, 0.0, 100.0, 20.0)),
        ]);
        assert_eq!(state.index_of(id(0)), Some(0));
        assert_eq!(state.index_of(id(1)), Some(1));

        // Dragging leftwards (forward in RTL) into the second slot swaps.
        let commit = state
            .sort(id(0), Point::new(45.0, 10.0), (-1, 0), |_| true)
            .expect("pointer entered the second visual slot");
        assert_eq!((commit.previous_index, commit.current_index), (0, 1));
    }

    #[test]
    fn direction_tracker_flips_only_past_threshold() {
        let mut tracker = DirectionTracker::new(5.0, Point::new(0.0, 0.0));
        tracker.update(Point::new(0.0, 10.0));
        assert_eq!(tracker.delta(), (0, 1));
        // 3px back: below the threshold, the sign holds.
        tracker.update(Point::new(0.0, 7.0));
        assert_eq!(tracker.delta(), (0, 1));
        // 7px back: the sign flips.
        tracker.update(Point::new(0.0, 3.0));
        assert_eq!(tracker.delta(), (0, -1));
    }
}
