// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragyard Engine: a pointer-driven drag-and-drop engine.
//!
//! The engine turns raw pointer input into drag sessions over registered
//! items and containers: press gating by distance and delay, pixel-level
//! positioning with axis locks and boundary clamping, live reordering inside
//! a container, transfers between connected containers, and edge-triggered
//! auto-scroll. It owns no clock and touches no real DOM; every entry point
//! takes an explicit millisecond timestamp, and every layout read and visual
//! write goes through the [`DomHost`] trait.
//!
//! A typical embedding:
//!
//! 1. Implement [`DomHost`] over the real element tree (or use
//!    [`HeadlessHost`] in tests).
//! 2. Register items with [`DragDrop::register_item`] and containers with
//!    [`DragDrop::register_container`]; [`DragDrop::attach`] defines the
//!    ordering model.
//! 3. Feed pointer events into [`DragDrop::pointer_down`],
//!    [`DragDrop::pointer_move`], and [`DragDrop::pointer_up`], and call
//!    [`DragDrop::on_frame`] once per animation frame while
//!    [`DragDrop::is_dragging`] is true.
//! 4. Drain [`DragDropEvent`]s with [`DragDrop::drain_events`] and commit
//!    [`DragDropEvent::Dropped`] to the application model.
//!
//! ```
//! use dragyard_engine::{
//!     ContainerConfig, DragConfig, DragDrop, DragDropEvent, HeadlessHost, PointerButton,
//!     PointerDevice,
//! };
//! use kurbo::{Point, Rect};
//!
//! let mut host = HeadlessHost::new();
//! let list = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let first = host.add_child(list, Rect::new(0.0, 0.0, 100.0, 50.0));
//! let second = host.add_child(list, Rect::new(0.0, 50.0, 100.0, 100.0));
//!
//! let mut dd = DragDrop::new(host);
//! let container = dd.register_container(list, ContainerConfig::default())?;
//! let a = dd.register_item(first, DragConfig::default())?;
//! let b = dd.register_item(second, DragConfig::default())?;
//! dd.attach(a, container)?;
//! dd.attach(b, container)?;
//!
//! dd.pointer_down(
//!     a,
//!     first,
//!     PointerDevice::Mouse,
//!     PointerButton::Primary,
//!     Point::new(50.0, 25.0),
//!     0,
//! );
//! dd.pointer_move(Point::new(50.0, 80.0), 16);
//! dd.pointer_up(Point::new(50.0, 80.0), 32);
//!
//! assert_eq!(dd.items_in(container), &[b, a]);
//! assert!(dd
//!     .drain_events()
//!     .iter()
//!     .any(|e| matches!(e, DragDropEvent::Dropped { .. })));
//! # Ok::<(), dragyard_engine::SetupError>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod adapter;
mod autoscroll;
mod config;
mod drag;
mod drop_list;
mod events;
mod headless;
mod registry;
mod sort;

pub use adapter::{DomHost, ElementId, SetupError, VisualState};
pub use config::{
    ConstrainPosition, ContainerConfig, DragConfig, DragId, EnterPredicate, LockAxis,
    PreviewContainer, PreviewSpec, SortPredicate,
};
pub use events::DragDropEvent;
pub use headless::HeadlessHost;
pub use registry::{DragDrop, PointerButton};

pub use dragyard_gesture::{PointerDevice, StartDelay};
pub use dragyard_graph::{ConnectTarget, ContainerId, GroupId};

pub use dragyard_geometry::{Direction, Orientation};
