// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host boundary: element handles, visual state flags, and the [`DomHost`]
//! capability trait the engine drives instead of touching a document directly.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::config::PreviewSpec;
use dragyard_geometry::Direction;

/// Opaque handle to a host element (a DOM node or the headless equivalent).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Constructs a handle from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value of this handle.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

bitflags::bitflags! {
    /// Visual states the engine asks the host to reflect on elements,
    /// typically as CSS classes.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct VisualState: u8 {
        /// The element is the source of the active drag.
        const DRAGGING = 1 << 0;
        /// The container can receive the item currently being dragged.
        const RECEIVING = 1 << 1;
        /// Dragging from or into the element is disabled.
        const DISABLED = 1 << 2;
    }
}

/// Structural misuse detected at setup time.
///
/// These are raised synchronously from registration APIs; nothing on a
/// per-frame path ever returns one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The given handle does not refer to a live host element.
    NotAnElement(ElementId),
    /// The given item id was never registered or has been destroyed.
    UnknownItem(u64),
    /// The given container id was never registered or has been destroyed.
    UnknownContainer(u64),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnElement(el) => {
                write!(f, "handle {} does not refer to a live element", el.to_raw())
            }
            Self::UnknownItem(raw) => write!(f, "unknown drag item {raw}"),
            Self::UnknownContainer(raw) => write!(f, "unknown drop container {raw}"),
        }
    }
}

impl core::error::Error for SetupError {}

/// Narrow capability trait over the document the engine manipulates.
///
/// The engine holds no DOM knowledge of its own: every measurement, stacking
/// query, transform write, and node move goes through this trait. A real host
/// wires it to the platform; [`HeadlessHost`](crate::HeadlessHost) backs tests
/// and examples.
///
/// All rectangles and points are in viewport (client) coordinates.
///
/// Implementations must absorb stale handles gracefully: a query for a
/// removed element returns `None`/a default, never panics, so a mid-drag
/// removal degrades the session instead of ending the event stream.
pub trait DomHost {
    /// Whether the handle refers to a live element node.
    fn is_element(&self, el: ElementId) -> bool;

    /// Bounding rectangle of an element, if it is live.
    fn element_rect(&self, el: ElementId) -> Option<Rect>;

    /// Visible viewport rectangle.
    fn viewport_rect(&self) -> Rect;

    /// Current viewport scroll offset.
    fn viewport_scroll(&self) -> Vec2;

    /// Current scroll offset of a scrollable element.
    fn scroll_offset(&self, el: ElementId) -> Vec2;

    /// Maximum scroll offset of a scrollable element (or the viewport when
    /// `el` is `None`).
    fn scroll_extent(&self, el: Option<ElementId>) -> Vec2;

    /// Scrolls an element (or the viewport when `el` is `None`) by a delta,
    /// clamped to its extent.
    fn scroll_by(&mut self, el: Option<ElementId>, delta: Vec2);

    /// Scrollable elements from `el` (inclusive) upward, innermost first.
    /// The viewport is implied after the last entry and is not included.
    fn scrollable_ancestors(&self, el: ElementId) -> Vec<ElementId>;

    /// Topmost hit-testable element at a point, if any. Floating previews are
    /// transparent to this query, the way a real preview has
    /// `pointer-events: none`.
    fn topmost_at(&self, point: Point) -> Option<ElementId>;

    /// Whether `el` is `ancestor` itself or one of its descendants.
    fn is_descendant(&self, el: ElementId, ancestor: ElementId) -> bool;

    /// Text direction in effect for an element.
    fn direction(&self, el: ElementId) -> Direction;

    /// Whether the element participates in HTML5 native drag
    /// (`draggable=true`); presses on such elements are left to the platform.
    fn is_native_draggable(&self, el: ElementId) -> bool;

    /// Sets the drag translation of an element. The host composes
    /// `translate3d(x, y, 0)` in front of the element's pre-existing
    /// transform; successive calls replace the translation term only, never
    /// stack it. Coordinates arrive pre-rounded to integer pixels.
    fn set_translation(&mut self, el: ElementId, offset: Vec2);

    /// Removes the drag translation, restoring the pre-existing transform.
    fn clear_translation(&mut self, el: ElementId);

    /// Toggles a visual state flag on an element.
    fn set_visual_flag(&mut self, el: ElementId, flag: VisualState, on: bool);

    /// Creates the floating preview for a drag of `source` and appends it to
    /// `parent` (or the document body / fullscreen element when `None`).
    ///
    /// The default preview is a clone of `source` carrying its computed size
    /// and a rounded-pixel box, with every `id` stripped from the clone and
    /// its descendants, live form state (input/textarea/select/radio values
    /// and checkedness) transplanted, and canvas bitmaps copied pixel-wise
    /// (zero-area canvases skipped without error). A missing or empty custom
    /// template falls back to the clone silently.
    fn create_preview(
        &mut self,
        source: ElementId,
        spec: &PreviewSpec,
        parent: Option<ElementId>,
    ) -> ElementId;

    /// Creates the placeholder that stands in for `source` in container
    /// layout while the drag is active. A dead or empty `template` falls
    /// back to the default stand-in silently.
    fn create_placeholder(&mut self, source: ElementId, template: Option<ElementId>) -> ElementId;

    /// Inserts `el` as a child of `parent` at `index`, detaching it from its
    /// current parent first.
    fn insert_child(&mut self, parent: ElementId, index: usize, el: ElementId);

    /// Removes an element node.
    fn remove_node(&mut self, el: ElementId);

    /// Declared duration of a CSS transition on the element's `transform`
    /// property, in milliseconds; `0` when there is none.
    fn transform_transition_ms(&self, el: ElementId) -> u64;
}
