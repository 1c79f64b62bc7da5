// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-gesture session state and the free-drag position pipeline.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};

use crate::adapter::ElementId;
use crate::config::{DragConfig, DragId, LockAxis};
use crate::sort::{DirectionTracker, SortState};
use dragyard_gesture::PressGate;
use dragyard_geometry::{RectCache, ScrollTracker};
use dragyard_graph::ContainerId;

/// Lifecycle phase of the active session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Pressed, gates not yet passed. No visual or model change.
    Pending,
    /// Actively dragging.
    Dragging,
    /// Released, waiting out the preview's transform transition. The
    /// deadline equals the declared duration, so a dropped transition-end
    /// never hangs the session.
    Releasing {
        /// Timestamp after which the drop finalizes unconditionally.
        deadline: u64,
    },
}

/// Drop details computed at release, applied when the session finalizes.
#[derive(Clone, Debug)]
pub(crate) struct PendingDrop {
    pub(crate) pointer: Point,
    pub(crate) distance: Vec2,
    pub(crate) is_pointer_over_container: bool,
}

/// State of one pointer-down-to-pointer-up gesture. Exactly one exists at a
/// time, owned as an `Option` by the engine.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) item: DragId,
    pub(crate) source: ElementId,
    /// Item configuration resolved at press time; changes made to the item
    /// mid-gesture do not affect the running session.
    pub(crate) config: DragConfig,
    pub(crate) origin: Option<ContainerId>,
    pub(crate) origin_index: usize,
    pub(crate) current: Option<ContainerId>,
    pub(crate) gate: PressGate,
    pub(crate) phase: Phase,
    pub(crate) pickup: Point,
    pub(crate) last_pointer: Point,
    /// Last translation applied to the moving element, unrounded. The
    /// boundary clamp falls back to it when the boundary has no size.
    pub(crate) applied: Vec2,
    /// Source element rect at drag start, used for boundary clamping.
    pub(crate) initial_rect: Rect,
    pub(crate) scroll: ScrollTracker<ElementId>,
    pub(crate) container_rects: RectCache<ContainerId>,
    pub(crate) sort: SortState,
    pub(crate) pointer_direction: DirectionTracker,
    pub(crate) preview: Option<ElementId>,
    pub(crate) placeholder: Option<ElementId>,
    /// Auto-scroll target for the next frame: `None` element means the
    /// viewport; the vector is the signed per-frame step.
    pub(crate) scroll_target: Option<(Option<ElementId>, Vec2)>,
    /// Containers currently flagged with the receiving visual state.
    pub(crate) receiving: Vec<ContainerId>,
    pub(crate) pending_drop: Option<PendingDrop>,
}

impl Session {
    pub(crate) fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging)
    }

    /// The element that visually follows the pointer: the preview for
    /// contained drags, the source element for free drags.
    pub(crate) fn moving_element(&self) -> ElementId {
        self.preview.unwrap_or(self.source)
    }
}

/// Resolves the translation to apply for the current pointer position.
///
/// The pipeline is: raw delta with scroll compensation, axis lock, boundary
/// clamp, then the user's `constrain_position` override (which replaces the
/// clamped result entirely). Returns the unrounded translation; the caller
/// rounds to integer pixels before handing it to the host.
pub(crate) fn resolve_position(
    config: &DragConfig,
    container_lock: Option<LockAxis>,
    item: DragId,
    pickup: Point,
    pointer: Point,
    scroll_total: Vec2,
    initial_rect: Rect,
    boundary_rect: Option<Rect>,
    previous: Vec2,
) -> Vec2 {
    let raw = (pointer - pickup) + scroll_total;
    let mut delta = raw;
    match config.lock_axis.or(container_lock) {
        Some(LockAxis::X) => delta.y = 0.0,
        Some(LockAxis::Y) => delta.x = 0.0,
        None => {}
    }
    if let Some(boundary) = boundary_rect {
        if boundary.width() <= 0.0 || boundary.height() <= 0.0 {
            // Hidden boundary: keep the previous valid position.
            return previous;
        }
        delta.x = clamp_axis(
            delta.x,
            boundary.x0 - initial_rect.x0,
            boundary.x1 - initial_rect.x1,
            previous.x,
        );
        delta.y = clamp_axis(
            delta.y,
            boundary.y0 - initial_rect.y0,
            boundary.y1 - initial_rect.y1,
            previous.y,
        );
    }
    if let Some(constrain) = config.constrain_position {
        let constrained = constrain(pickup + raw, item);
        delta = constrained - pickup;
    }
    delta
}

/// Clamps one translation axis so the element stays inside the boundary.
/// An inverted range (boundary smaller than the element) keeps the previous
/// value; the reset-to-zero rule is applied on an explicit re-measure, not
/// mid-move.
fn clamp_axis(value: f64, min: f64, max: f64, previous: f64) -> f64 {
    if max < min { previous } else { value.clamp(min, max) }
}

/// Rounds a translation to integer pixels.
pub(crate) fn round_translation(v: Vec2) -> Vec2 {
    Vec2::new(v.x.round(), v.y.round())
}
