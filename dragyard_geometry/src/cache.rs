// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-session rectangle cache.
//!
//! A drag session measures the dragged element and every sibling/candidate
//! once, then works against cached rectangles until an event that can move
//! layout wholesale (session start, container transfer, resize) forces a full
//! rebuild. Between rebuilds the only permitted mutation is a uniform shift
//! applied when an ancestor scrolls, plus explicit per-entry offsets applied
//! by the sort engine when siblings are translated.
//!
//! Never assume a cached rectangle is still valid across an asynchronous
//! boundary; rebuild instead of patching.

use alloc::vec::Vec;
use kurbo::{Rect, Vec2};

/// Cache of element rectangles keyed by an application-defined handle.
///
/// Keys are typically small `Copy` identifiers (drag item ids, container ids).
/// Entries keep insertion order, which callers rely on for stable iteration.
#[derive(Clone, Debug, Default)]
pub struct RectCache<K> {
    entries: Vec<(K, Rect)>,
}

impl<K: Copy + PartialEq> RectCache<K> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Discards all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the cache contents with freshly measured rectangles.
    pub fn rebuild(&mut self, measured: impl IntoIterator<Item = (K, Rect)>) {
        self.entries.clear();
        self.entries.extend(measured);
    }

    /// Inserts or replaces a single entry.
    pub fn put(&mut self, key: K, rect: Rect) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = rect;
        } else {
            self.entries.push((key, rect));
        }
    }

    /// Removes an entry, returning its rectangle if it was present.
    pub fn remove(&mut self, key: K) -> Option<Rect> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Returns the cached rectangle for `key`, if any.
    #[must_use]
    pub fn get(&self, key: K) -> Option<Rect> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, r)| *r)
    }

    /// Shifts every cached rectangle by `delta`.
    ///
    /// Used when an ancestor scrolls during the drag: content moves opposite
    /// the scroll delta, so callers pass the negated scroll change.
    pub fn shift_all(&mut self, delta: Vec2) {
        if delta.x == 0.0 && delta.y == 0.0 {
            return;
        }
        for (_, r) in &mut self.entries {
            *r = Rect::new(r.x0 + delta.x, r.y0 + delta.y, r.x1 + delta.x, r.y1 + delta.y);
        }
    }

    /// Shifts a single entry by `delta`. Missing keys are ignored.
    pub fn shift(&mut self, key: K, delta: Vec2) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            let r = slot.1;
            slot.1 = Rect::new(r.x0 + delta.x, r.y0 + delta.y, r.x1 + delta.x, r.y1 + delta.y);
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Rect)> + '_ {
        self.entries.iter().map(|(k, r)| (*k, *r))
    }
}
