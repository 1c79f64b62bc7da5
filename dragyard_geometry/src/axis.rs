// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorting axis primitives: container orientation and text direction.

use kurbo::{Point, Rect, Vec2};

/// Layout orientation of a sortable container.
///
/// The orientation selects the primary sorting axis: vertical containers sort
/// by `y`/height, horizontal containers by `x`/width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Items are stacked top to bottom; the sorting axis is vertical.
    #[default]
    Vertical,
    /// Items are laid out side by side; the sorting axis is horizontal.
    Horizontal,
}

/// Text/layout direction of a horizontal container.
///
/// Only meaningful for [`Orientation::Horizontal`]; vertical containers sort
/// identically in both directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left-to-right layout.
    #[default]
    Ltr,
    /// Right-to-left layout. The "start" edge of the axis is the right edge.
    Rtl,
}

impl Orientation {
    /// Component of a point along the sorting axis.
    #[must_use]
    pub fn of_point(self, p: Point) -> f64 {
        match self {
            Self::Vertical => p.y,
            Self::Horizontal => p.x,
        }
    }

    /// Component of a vector along the sorting axis.
    #[must_use]
    pub fn of_vec(self, v: Vec2) -> f64 {
        match self {
            Self::Vertical => v.y,
            Self::Horizontal => v.x,
        }
    }

    /// A vector with `value` along the sorting axis and zero across it.
    #[must_use]
    pub fn vec(self, value: f64) -> Vec2 {
        match self {
            Self::Vertical => Vec2::new(0.0, value),
            Self::Horizontal => Vec2::new(value, 0.0),
        }
    }

    /// Leading edge of a rectangle along the axis, in layout order.
    ///
    /// For RTL horizontal layouts the leading edge is the *right* edge, so
    /// that "before the first item" keeps its visual meaning.
    #[must_use]
    pub fn lead(self, r: Rect, dir: Direction) -> f64 {
        match (self, dir) {
            (Self::Vertical, _) => r.y0,
            (Self::Horizontal, Direction::Ltr) => r.x0,
            (Self::Horizontal, Direction::Rtl) => -r.x1,
        }
    }

    /// Extent of a rectangle along the axis.
    #[must_use]
    pub fn extent(self, r: Rect) -> f64 {
        match self {
            Self::Vertical => r.height(),
            Self::Horizontal => r.width(),
        }
    }

    /// Whether `p` falls inside `r` along the sorting axis, using the
    /// floor-to-pixel convention: `floor(start) <= p < floor(end)`.
    ///
    /// Flooring both edges keeps the check stable across sub-pixel layout
    /// jitter, so a pointer resting exactly on a rounded boundary always
    /// resolves to the same side.
    #[must_use]
    pub fn contains(self, r: Rect, p: Point) -> bool {
        let (start, end, v) = match self {
            Self::Vertical => (r.y0, r.y1, p.y),
            Self::Horizontal => (r.x0, r.x1, p.x),
        };
        v >= start.floor() && v < end.floor()
    }

    /// Mirrors an axis value for RTL layouts so callers can compare positions
    /// in layout order regardless of direction.
    #[must_use]
    pub fn in_layout_order(self, value: f64, dir: Direction) -> f64 {
        match (self, dir) {
            (Self::Horizontal, Direction::Rtl) => -value,
            _ => value,
        }
    }
}
