// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Last-known scroll offset tracking.
//!
//! A drag session snapshots the scroll offsets of the viewport and of every
//! scrollable ancestor at pickup time. Scroll events that arrive during the
//! drag update the snapshot and report a delta; the accumulated total is the
//! correction added to the pointer delta so the dragged element does not jump
//! when the page scrolls mid-gesture.
//!
//! The snapshot is only ever read or written whole, at the start of a pointer
//! move or scroll notification, never lazily mid-computation.

use alloc::vec::Vec;
use kurbo::Vec2;

/// Tracks the last known scroll offsets of the viewport and a set of
/// scrollable elements keyed by an application-defined handle.
#[derive(Clone, Debug)]
pub struct ScrollTracker<K> {
    viewport: Vec2,
    elements: Vec<(K, Vec2)>,
    total: Vec2,
}

impl<K: Copy + PartialEq> Default for ScrollTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + PartialEq> ScrollTracker<K> {
    /// Creates an empty tracker with zero accumulated delta.
    #[must_use]
    pub fn new() -> Self {
        Self {
            viewport: Vec2::ZERO,
            elements: Vec::new(),
            total: Vec2::ZERO,
        }
    }

    /// Takes the pickup-time snapshot, resetting the accumulated total.
    pub fn snapshot(&mut self, viewport: Vec2, elements: impl IntoIterator<Item = (K, Vec2)>) {
        self.viewport = viewport;
        self.elements.clear();
        self.elements.extend(elements);
        self.total = Vec2::ZERO;
    }

    /// Records a new viewport offset, returning the change since the last
    /// known offset and folding it into the accumulated total.
    pub fn viewport_scrolled(&mut self, new_offset: Vec2) -> Vec2 {
        let delta = new_offset - self.viewport;
        self.viewport = new_offset;
        self.total += delta;
        delta
    }

    /// Records a new offset for a tracked element.
    ///
    /// Returns the change since the last known offset, or `None` if the
    /// element was not part of the snapshot (an untracked scrollable cannot
    /// affect the drag and is ignored).
    pub fn element_scrolled(&mut self, key: K, new_offset: Vec2) -> Option<Vec2> {
        let slot = self.elements.iter_mut().find(|(k, _)| *k == key)?;
        let delta = new_offset - slot.1;
        slot.1 = new_offset;
        self.total += delta;
        Some(delta)
    }

    /// Accumulated scroll change since the snapshot.
    ///
    /// Added to the raw pointer delta so a scroll during the drag moves the
    /// element with the content instead of leaving it visually behind.
    #[must_use]
    pub fn total(&self) -> Vec2 {
        self.total
    }

    /// Last known viewport offset.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Last known offset for a tracked element.
    #[must_use]
    pub fn element(&self, key: K) -> Option<Vec2> {
        self.elements.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}
