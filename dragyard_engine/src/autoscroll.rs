// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge auto-scrolling: picking which scrollable to move on each frame.
//!
//! The driver itself is host-ticked: the engine records a target here on
//! every pointer move, and `on_frame` applies one step of it. When the
//! pointer leaves all proximity bands the target is dropped, so scrolling
//! stops on the next tick with no residual motion.

use kurbo::{Point, Vec2};

use crate::adapter::{DomHost, ElementId};
use dragyard_geometry::EdgeProximity;

/// Resolves the scrollable that should move for the current pointer
/// position: the innermost scrollable on the chain from `over` upward whose
/// edge the pointer is near and that can still travel in that direction,
/// falling back outward and ultimately to the viewport (`None`).
///
/// Returns the target and the signed per-frame step vector.
pub(crate) fn resolve_scroll_target<H: DomHost>(
    host: &H,
    over: ElementId,
    pointer: Point,
    step: f64,
) -> Option<(Option<ElementId>, Vec2)> {
    for el in host.scrollable_ancestors(over) {
        let Some(rect) = host.element_rect(el) else {
            continue;
        };
        let vector = step_vector(
            EdgeProximity::classify(rect, pointer),
            host.scroll_offset(el),
            host.scroll_extent(Some(el)),
            step,
        );
        if vector != Vec2::ZERO {
            return Some((Some(el), vector));
        }
    }
    let vector = step_vector(
        EdgeProximity::classify(host.viewport_rect(), pointer),
        host.viewport_scroll(),
        host.scroll_extent(None),
        step,
    );
    (vector != Vec2::ZERO).then_some((None, vector))
}

/// Converts a proximity verdict into a step, zeroing any axis that has no
/// overflow or is already at its limit in the needed direction.
fn step_vector(proximity: EdgeProximity, offset: Vec2, extent: Vec2, step: f64) -> Vec2 {
    if proximity.is_idle() {
        return Vec2::ZERO;
    }
    let gate = |sign: f64, offset: f64, extent: f64| -> f64 {
        if sign < 0.0 && offset > 0.0 {
            -step
        } else if sign > 0.0 && offset < extent {
            step
        } else {
            0.0
        }
    };
    Vec2::new(
        gate(proximity.x.sign(), offset.x, extent.x),
        gate(proximity.y.sign(), offset.y, extent.y),
    )
}
