// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragyard Geometry: rectangle caching and scroll bookkeeping for drag sessions.
//!
//! This crate provides the coordinate-space building blocks of the Dragyard
//! drag-and-drop engine:
//!
//! - [`axis`]: list orientation and text direction, with helpers for reading
//!   rectangle edges along the sorting axis.
//! - [`cache`]: a per-session cache of element rectangles that is rebuilt (never
//!   incrementally patched) at well-defined points and shifted wholesale when an
//!   ancestor scrolls.
//! - [`scroll`]: a tracker for the last known scroll offsets of the viewport and
//!   of scrollable ancestors, refreshed atomically at the start of each pointer
//!   move so a mid-computation scroll event cannot skew a drag delta.
//! - [`proximity`]: edge-proximity classification used by the auto-scroll
//!   driver to decide whether and in which direction a scrollable should move.
//!
//! All coordinates are world-space `kurbo` values in `f64`. Inputs are assumed
//! to be finite; zero-sized rectangles are valid and simply never match any
//! proximity or overlap query.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod axis;
pub mod cache;
pub mod proximity;
pub mod scroll;

pub use axis::{Direction, Orientation};
pub use cache::RectCache;
pub use proximity::{EdgeProximity, ScrollLean};
pub use scroll::ScrollTracker;
