// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration for drag items and drop containers.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;

use crate::adapter::ElementId;
use dragyard_gesture::StartDelay;
use dragyard_geometry::Orientation;
use dragyard_graph::ContainerId;

/// Identifier of a registered drag item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DragId(u64);

impl DragId {
    /// Constructs an id from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value of this id.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Axis a drag is locked to. Movement on the other axis is discarded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LockAxis {
    /// Only horizontal movement is applied.
    X,
    /// Only vertical movement is applied.
    Y,
}

/// Where the floating preview element is appended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PreviewContainer {
    /// The document body (or the nearest fullscreen element).
    #[default]
    Global,
    /// The drop container's own element.
    Parent,
    /// A specific element.
    Element(ElementId),
}

/// Visual configuration handed to the host when the preview is created.
/// The engine carries these opaquely; it does not interpret style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewSpec {
    /// Extra class names applied to the preview element.
    pub class_names: Vec<String>,
    /// `z-index` for the preview; hosts pick their own default when `None`.
    pub z_index: Option<i32>,
    /// A custom template element to use instead of cloning the source.
    /// A dead or empty template falls back to the clone silently.
    pub template: Option<ElementId>,
}

/// User override for the dragged element's position. Receives the unclamped
/// pointer-projected point and the item; its result replaces the boundary
/// clamp entirely.
pub type ConstrainPosition = fn(Point, DragId) -> Point;

/// Policy deciding whether an item may enter a container.
pub type EnterPredicate = fn(DragId, ContainerId) -> bool;

/// Policy deciding whether an item may be sorted to `index` in a container.
pub type SortPredicate = fn(usize, DragId, ContainerId) -> bool;

/// Per-item drag configuration.
#[derive(Clone, Debug)]
pub struct DragConfig {
    /// Pixels the pointer must travel from the press point before the drag
    /// starts. Below it the gesture is still a plain click.
    pub drag_start_threshold: f64,
    /// Pixels of axis travel before the tracked pointer direction flips.
    /// Governs the sort tie-break that stops sub-pixel jitter from
    /// oscillating swaps.
    pub pointer_direction_change_threshold: f64,
    /// Delay between press and the earliest drag start, per device kind.
    pub drag_start_delay: StartDelay,
    /// Axis lock for this item; overrides the container's lock.
    pub lock_axis: Option<LockAxis>,
    /// Position override applied after the boundary clamp.
    pub constrain_position: Option<ConstrainPosition>,
    /// Preview styling passed through to the host.
    pub preview: PreviewSpec,
    /// Where the preview element is appended.
    pub preview_container: PreviewContainer,
    /// Element whose box the dragged element must stay fully inside.
    pub boundary: Option<ElementId>,
    /// Custom placeholder template; falls back to the default stand-in.
    pub placeholder_template: Option<ElementId>,
    /// Disabled items never start a drag.
    pub disabled: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_start_threshold: 5.0,
            pointer_direction_change_threshold: 5.0,
            drag_start_delay: StartDelay::default(),
            lock_axis: None,
            constrain_position: None,
            preview: PreviewSpec::default(),
            preview_container: PreviewContainer::default(),
            boundary: None,
            placeholder_template: None,
            disabled: false,
        }
    }
}

/// Per-container configuration.
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    /// Primary axis items are laid out along.
    pub orientation: Orientation,
    /// When set, items inside keep their index while dragged over this
    /// container.
    pub sorting_disabled: bool,
    /// Disabled containers neither start nor receive drags.
    pub disabled: bool,
    /// Axis lock applied to drags starting here, unless the item overrides.
    pub lock_axis: Option<LockAxis>,
    /// Disables edge auto-scrolling while dragging over this container.
    pub auto_scroll_disabled: bool,
    /// Pixels scrolled per frame when auto-scrolling.
    pub auto_scroll_step: f64,
    /// The container displays its items in reverse visual order; entering
    /// from before the first visual item maps to the *last* index.
    pub reverse_order: bool,
    /// Policy for admitting items dragged in from connected containers.
    pub enter_predicate: Option<EnterPredicate>,
    /// Policy for admitting a sort to a given index.
    pub sort_predicate: Option<SortPredicate>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            sorting_disabled: false,
            disabled: false,
            lock_axis: None,
            auto_scroll_disabled: false,
            auto_scroll_step: 2.0,
            reverse_order: false,
            enter_predicate: None,
            sort_predicate: None,
        }
    }
}
