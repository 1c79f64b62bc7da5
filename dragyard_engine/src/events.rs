// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle events emitted by the engine.
//!
//! Events land in a queue the host drains after feeding input, so item-level
//! and container-level consumers observe one emission each instead of the
//! engine duplicating it per listener.

use kurbo::{Point, Vec2};

use crate::config::DragId;
use dragyard_graph::ContainerId;

/// One drag lifecycle event.
#[derive(Clone, Debug, PartialEq)]
pub enum DragDropEvent {
    /// The press passed its threshold and delay gates; a drag is underway.
    Started {
        /// The dragged item.
        item: DragId,
    },
    /// The pointer moved during a drag.
    Moved {
        /// The dragged item.
        item: DragId,
        /// Current pointer position.
        pointer_position: Point,
        /// Cumulative pointer travel since pickup.
        distance: Vec2,
    },
    /// The pointer was released. Fires before any drop transition settles.
    Released {
        /// The dragged item.
        item: DragId,
    },
    /// The drag finished and its visuals were torn down.
    Ended {
        /// The dragged item.
        item: DragId,
        /// Cumulative pointer travel over the whole drag.
        distance: Vec2,
        /// Pointer position at release.
        drop_point: Point,
    },
    /// The item moved into a container (including back into its origin).
    /// Observed by both the item and the container.
    Entered {
        /// The dragged item.
        item: DragId,
        /// The container entered.
        container: ContainerId,
        /// Index the item now occupies there.
        current_index: usize,
    },
    /// The item left the container it was over.
    Exited {
        /// The dragged item.
        item: DragId,
        /// The container left.
        container: ContainerId,
    },
    /// The item changed index inside the container it is over.
    Sorted {
        /// The dragged item.
        item: DragId,
        /// The container being sorted.
        container: ContainerId,
        /// Index before the swap.
        previous_index: usize,
        /// Index after the swap.
        current_index: usize,
    },
    /// A contained drag completed.
    Dropped {
        /// The dragged item.
        item: DragId,
        /// Container the item ended up in.
        container: ContainerId,
        /// Container the drag started in.
        previous_container: ContainerId,
        /// Index in the origin container at drag start.
        previous_index: usize,
        /// Index in the destination container.
        current_index: usize,
        /// Whether the pointer was over the destination at release.
        is_pointer_over_container: bool,
        /// Cumulative pointer travel over the whole drag.
        distance: Vec2,
        /// Pointer position at release.
        drop_point: Point,
    },
}
