// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge-proximity classification for auto-scrolling.
//!
//! While a drag is active, a scrollable whose edge the pointer approaches
//! should scroll toward that edge. The proximity band is a fraction of the
//! scrollable's size on each axis, so small lists get proportionally small
//! bands rather than a fixed pixel gutter swallowing the whole element.

use kurbo::{Point, Rect};

/// Fraction of a rectangle's extent used as the edge-proximity band.
pub const PROXIMITY_RATIO: f64 = 0.05;

/// Which way a scrollable should move along one axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScrollLean {
    /// Pointer is away from both edges; no scrolling on this axis.
    #[default]
    None,
    /// Pointer is near the start edge (top or left); scroll backward.
    Start,
    /// Pointer is near the end edge (bottom or right); scroll forward.
    End,
}

impl ScrollLean {
    /// Signed unit step for this lean (`-1.0`, `0.0`, or `1.0`).
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Start => -1.0,
            Self::End => 1.0,
        }
    }
}

/// Per-axis proximity verdict for one scrollable rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeProximity {
    /// Horizontal lean.
    pub x: ScrollLean,
    /// Vertical lean.
    pub y: ScrollLean,
}

impl EdgeProximity {
    /// Returns `true` if neither axis wants to scroll.
    #[must_use]
    pub fn is_idle(self) -> bool {
        self.x == ScrollLean::None && self.y == ScrollLean::None
    }

    /// Classifies `pointer` against `rect` using [`PROXIMITY_RATIO`].
    ///
    /// A pointer outside the rectangle never triggers scrolling; a zero-sized
    /// rectangle has no interior and therefore no proximity band.
    #[must_use]
    pub fn classify(rect: Rect, pointer: Point) -> Self {
        if !rect.contains(pointer) || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Self::default();
        }
        let band_x = rect.width() * PROXIMITY_RATIO;
        let band_y = rect.height() * PROXIMITY_RATIO;

        let x = if pointer.x < rect.x0 + band_x {
            ScrollLean::Start
        } else if pointer.x > rect.x1 - band_x {
            ScrollLean::End
        } else {
            ScrollLean::None
        };
        let y = if pointer.y < rect.y0 + band_y {
            ScrollLean::Start
        } else if pointer.y > rect.y1 - band_y {
            ScrollLean::End
        } else {
            ScrollLean::None
        };
        Self { x, y }
    }
}
