// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop container model: element, configuration, and the ordered member
//! list.
//!
//! The member order is the engine's ordering model. It is always a
//! permutation of the items attached to the container, with no duplicates;
//! an item belongs to exactly one container at rest and transfers only when
//! a drop commits.

use alloc::vec::Vec;

use crate::adapter::ElementId;
use crate::config::{ContainerConfig, DragId};

#[derive(Debug)]
pub(crate) struct Container {
    pub(crate) element: ElementId,
    pub(crate) config: ContainerConfig,
    pub(crate) items: Vec<DragId>,
}

impl Container {
    pub(crate) fn new(element: ElementId, config: ContainerConfig) -> Self {
        Self {
            element,
            config,
            items: Vec::new(),
        }
    }

    pub(crate) fn index_of(&self, item: DragId) -> Option<usize> {
        self.items.iter().position(|i| *i == item)
    }

    /// Appends an item, keeping the no-duplicates invariant.
    pub(crate) fn push_item(&mut self, item: DragId) {
        if self.index_of(item).is_none() {
            self.items.push(item);
        }
    }

    /// Inserts an item at an index (clamped to the list), keeping the
    /// no-duplicates invariant.
    pub(crate) fn insert_item(&mut self, index: usize, item: DragId) {
        if self.index_of(item).is_some() {
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    pub(crate) fn remove_item(&mut self, item: DragId) -> Option<usize> {
        let index = self.index_of(item)?;
        self.items.remove(index);
        Some(index)
    }

    /// Moves a member to a new index, as a committed sort does.
    pub(crate) fn move_item(&mut self, item: DragId, to: usize) {
        let Some(from) = self.index_of(item) else {
            return;
        };
        let to = to.min(self.items.len().saturating_sub(1));
        if from == to {
            return;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
    }
}
