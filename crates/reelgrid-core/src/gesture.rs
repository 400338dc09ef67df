#![forbid(unsafe_code)]

//! Tap versus drag discrimination.
//!
//! Browsers fire `click` at the end of a drag, which would otherwise zoom
//! into whatever tile the pointer happened to be released over.
//! [`TapDetector`] tracks one pointer-down → up interaction and reports a
//! tap only when the pointer stayed put.
//!
//! # Invariants
//!
//! 1. A drag and a tap never both result from one down → up interaction.
//! 2. `pointer_up` without a prior `pointer_down` never reports a tap.
//! 3. After `reset()` the detector is idle.

use crate::geometry::Point;

/// Default travel (px) after which a press becomes a drag.
pub const DEFAULT_TAP_THRESHOLD_PX: f64 = 6.0;

/// A recognised tap at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub pos: Point,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: Point,
    travelled: f64,
    last: Point,
}

/// Stateful tap recogniser for a single pointer.
#[derive(Debug, Clone)]
pub struct TapDetector {
    threshold: f64,
    press: Option<Press>,
}

impl Default for TapDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TAP_THRESHOLD_PX)
    }
}

impl TapDetector {
    #[must_use]
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold: threshold_px.max(0.0),
            press: None,
        }
    }

    pub fn pointer_down(&mut self, pos: Point) {
        self.press = Some(Press {
            start: pos,
            travelled: 0.0,
            last: pos,
        });
    }

    /// Accumulate path length, so a drag that returns to its start is still
    /// a drag.
    pub fn pointer_move(&mut self, pos: Point) {
        if let Some(press) = self.press.as_mut() {
            press.travelled += press.last.distance(pos);
            press.last = pos;
        }
    }

    pub fn pointer_up(&mut self, pos: Point) -> Option<Tap> {
        let mut press = self.press.take()?;
        press.travelled += press.last.distance(pos);
        (press.travelled < self.threshold && press.start.distance(pos) < self.threshold)
            .then_some(Tap { pos })
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Whether the current press has already become a drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.travelled >= self.threshold)
    }

    pub fn reset(&mut self) {
        self.press = None;
    }
}
