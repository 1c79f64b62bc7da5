// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragyard Gesture: pointer press gating for drag starts.
//!
//! A drag must not begin on the raw `pointerdown`; two independent gates sit
//! between the press and the session becoming a real drag:
//!
//! - a **distance threshold**: the pointer must travel further than a
//!   configured number of pixels from the press point, so plain clicks never
//!   mutate anything;
//! - a **start delay**: configured per device kind, the press must age past
//!   the delay before any movement counts — and a movement *inside* the delay
//!   window abandons the gesture outright rather than merely postponing it
//!   (this is what makes long-press-to-drag usable on touch devices).
//!
//! [`PressGate`] tracks one press through these gates and arms exactly once.
//! It holds no timers: every entry point takes an explicit millisecond
//! timestamp, so hosts and tests drive time themselves.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use dragyard_gesture::{GateTransition, PointerDevice, PressGate, StartDelay};
//!
//! let mut gate = PressGate::new(5.0, StartDelay::default());
//! gate.on_down(PointerDevice::Mouse, Point::new(10.0, 10.0), 1_000);
//!
//! // 3px of travel: still a potential click.
//! assert_eq!(gate.on_move(Point::new(13.0, 10.0), 1_016), GateTransition::Pending);
//!
//! // 8px of travel: the gate arms and the drag may begin.
//! assert_eq!(gate.on_move(Point::new(18.0, 10.0), 1_032), GateTransition::Armed);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use kurbo::Point;

/// Kind of pointing device behind a press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerDevice {
    /// Mouse (or pen treated as mouse).
    Mouse,
    /// Touch contact.
    Touch,
}

/// Delay between a press and the earliest instant a drag may start.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartDelay {
    /// Same delay for every device kind, in milliseconds.
    Uniform(u64),
    /// Separate delays for mouse and touch, in milliseconds.
    PerDevice {
        /// Delay applied to mouse presses.
        mouse: u64,
        /// Delay applied to touch presses.
        touch: u64,
    },
}

impl Default for StartDelay {
    fn default() -> Self {
        Self::Uniform(0)
    }
}

impl StartDelay {
    /// Resolves the delay for a device kind.
    #[must_use]
    pub fn for_device(self, device: PointerDevice) -> u64 {
        match self {
            Self::Uniform(ms) => ms,
            Self::PerDevice { mouse, touch } => match device {
                PointerDevice::Mouse => mouse,
                PointerDevice::Touch => touch,
            },
        }
    }
}

/// Outcome of feeding a pointer move into the gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateTransition {
    /// Both gates still closed; no visual or model change may occur.
    Pending,
    /// Both gates passed on this move; the session becomes a real drag.
    /// Reported exactly once per press.
    Armed,
    /// The press moved inside its delay window; the whole gesture is
    /// abandoned and the press can no longer arm.
    Abandoned,
}

/// How a press resolved when the pointer was released.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateResolution {
    /// The gate never armed; the gesture was a plain click (or an abandoned
    /// delayed press) and must leave no trace.
    Click,
    /// The gate had armed; the release ends a real drag.
    Drag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum GateState {
    Pending,
    Armed,
    Abandoned,
}

/// Distance/delay gate for one pointer press.
#[derive(Copy, Clone, Debug)]
pub struct PressGate {
    threshold: f64,
    delay: StartDelay,
    down_pos: Point,
    down_time: u64,
    delay_ms: u64,
    state: GateState,
}

impl PressGate {
    /// Creates a gate with a distance threshold (pixels) and a start delay.
    #[must_use]
    pub fn new(threshold: f64, delay: StartDelay) -> Self {
        Self {
            threshold,
            delay,
            down_pos: Point::ZERO,
            down_time: 0,
            delay_ms: 0,
            state: GateState::Pending,
        }
    }

    /// Records the press that this gate is judging.
    pub fn on_down(&mut self, device: PointerDevice, position: Point, now_ms: u64) {
        self.down_pos = position;
        self.down_time = now_ms;
        self.delay_ms = self.delay.for_device(device);
        self.state = GateState::Pending;
    }

    /// Feeds a pointer move through the gates.
    ///
    /// Returns [`GateTransition::Armed`] on the move that passes both gates;
    /// later moves on an armed gate keep reporting `Armed` so callers can use
    /// the gate state directly, but only the first transition starts a drag.
    pub fn on_move(&mut self, position: Point, now_ms: u64) -> GateTransition {
        match self.state {
            GateState::Armed => GateTransition::Armed,
            GateState::Abandoned => GateTransition::Abandoned,
            GateState::Pending => {
                // A move inside the delay window kills the gesture; it does
                // not merely restart the wait.
                if self.delay_ms > 0 && now_ms.saturating_sub(self.down_time) < self.delay_ms {
                    self.state = GateState::Abandoned;
                    return GateTransition::Abandoned;
                }
                if self.down_pos.distance(position) > self.threshold {
                    self.state = GateState::Armed;
                    GateTransition::Armed
                } else {
                    GateTransition::Pending
                }
            }
        }
    }

    /// Resolves the press on release.
    #[must_use]
    pub fn on_up(&self) -> GateResolution {
        if self.state == GateState::Armed {
            GateResolution::Drag
        } else {
            GateResolution::Click
        }
    }

    /// Returns `true` once both gates have passed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state == GateState::Armed
    }

    /// Returns `true` if the press moved within its delay window.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.state == GateState::Abandoned
    }

    /// Position at press time; the drag delta is measured from here, so a
    /// delayed start still applies the full travel, not the post-delay part.
    #[must_use]
    pub fn down_position(&self) -> Point {
        self.down_pos
    }

    /// Timestamp at press time.
    #[must_use]
    pub fn down_time(&self) -> u64 {
        self.down_time
    }
}
