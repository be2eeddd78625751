// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pointer gesture state machine: press, drag past a threshold, release.

use serde::Serialize;

/// Pointer position in CSS pixels relative to the viewer container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
    pub shift: bool,
}

impl PointerInput {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, shift: false }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ScreenRect {
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn contains(&self, other: &ScreenRect) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}

/// How a released press resolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEnd {
    Click { x: f64, y: f64, shift: bool },
    Marquee { rect: ScreenRect, additive: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pressed {
        anchor: (f64, f64),
        current: (f64, f64),
        shift: bool,
        /// Travel has reached the click threshold at some point
        dragging: bool,
    },
}

impl Gesture {
    pub fn is_pressed(&self) -> bool {
        matches!(self, Gesture::Pressed { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Pressed { dragging: true, .. })
    }

    pub fn press(&mut self, input: PointerInput) {
        *self = Gesture::Pressed {
            anchor: (input.x, input.y),
            current: (input.x, input.y),
            shift: input.shift,
            dragging: false,
        };
    }

    /// Track a move; returns the marquee rectangle once past the threshold.
    pub fn drag(&mut self, input: PointerInput, threshold: f64) -> Option<ScreenRect> {
        let Gesture::Pressed {
            anchor,
            current,
            dragging,
            ..
        } = self
        else {
            return None;
        };

        *current = (input.x, input.y);
        if distance(*anchor, *current) >= threshold {
            *dragging = true;
        }
        dragging.then(|| ScreenRect::from_corners(*anchor, *current))
    }

    /// Finish the gesture. Total displacement below `threshold` is a click.
    pub fn release(&mut self, input: PointerInput, threshold: f64) -> Option<GestureEnd> {
        let Gesture::Pressed { anchor, shift, .. } = std::mem::take(self) else {
            return None;
        };
        let shift = shift || input.shift;
        let end = (input.x, input.y);
        if distance(anchor, end) < threshold {
            Some(GestureEnd::Click {
                x: input.x,
                y: input.y,
                shift,
            })
        } else {
            Some(GestureEnd::Marquee {
                rect: ScreenRect::from_corners(anchor, end),
                additive: shift,
            })
        }
    }

    pub fn cancel(&mut self) {
        *self = Gesture::Idle;
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
