#![forbid(unsafe_code)]

//! Zoom-to-focus phases and the focus plan.
//!
//! # State machine
//!
//! ```text
//! Idle        --click(tile)--------> ZoomingIn
//! ZoomingIn   --complete-----------> Focused
//! ZoomingIn   --click(other tile)--> ZoomingIn    (re-entrant)
//! ZoomingIn   --interrupt----------> Idle
//! Focused     --click(elsewhere)---> ZoomingOut
//! Focused     --resize-------------> Focused      (snapped)
//! ZoomingOut  --complete-----------> Idle
//! ZoomingOut  --interrupt----------> Idle
//! ```
//!
//! Every transition out of a zoom phase ends in one of: fully focused,
//! fully idle with input re-attached (possibly after a short deferred
//! delay), or cleanly inside a new transition.
//!
//! # Focus plan
//!
//! Given the focused tile's rect in container-local coordinates, the plan
//! moves the transform origin to the tile's center `c` and picks a
//! translate so that `c` lands on the viewport center:
//!
//! ```text
//! screen(c) = C0 + o + t + s·(c − o) = C0 + c + t   (o = c)
//! t         = viewport_center − C0 − c
//! ```
//!
//! The scale makes the tile's long side `fill` of the matching viewport
//! side and never shrinks below 1.

use std::time::Duration;

use reelgrid_core::animation::Easing;
use reelgrid_core::geometry::{Point, Rect, Size};
use reelgrid_core::grid::TileId;

use crate::camera::CameraPose;

/// Phase of the zoom-focus state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomPhase {
    /// Panning enabled, scale 1.
    #[default]
    Idle,
    ZoomingIn { tile: TileId },
    /// Scale > 1, input detached.
    Focused { tile: TileId },
    ZoomingOut { tile: TileId },
}

impl ZoomPhase {
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::ZoomingIn { .. } | Self::ZoomingOut { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The tile being zoomed to, focused on, or zoomed away from.
    pub fn tile(&self) -> Option<TileId> {
        match self {
            Self::Idle => None,
            Self::ZoomingIn { tile } | Self::Focused { tile } | Self::ZoomingOut { tile } => {
                Some(*tile)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ZoomingIn { .. } => "zooming_in",
            Self::Focused { .. } => "focused",
            Self::ZoomingOut { .. } => "zooming_out",
        }
    }
}

/// Raw pan accumulator captured when a zoom-in starts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavedPanState {
    pub x: f64,
    pub y: f64,
}

/// Target transform that centers and enlarges one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPlan {
    pub scale: f64,
    pub translate: Point,
    /// Transform origin: the tile's center in container-local pixels.
    pub origin: Point,
}

impl FocusPlan {
    pub fn compute(tile_local: Rect, viewport: Size, container_origin: Point, fill: f64) -> Self {
        let size = tile_local.size();
        let raw = if size.is_portrait() {
            ratio(fill * viewport.height, size.height)
        } else {
            ratio(fill * viewport.width, size.width)
        };
        let scale = raw.max(1.0);
        let origin = tile_local.center();
        let vc = viewport.center();
        Self {
            scale,
            translate: Point::new(
                vc.x - container_origin.x - origin.x,
                vc.y - container_origin.y - origin.y,
            ),
            origin,
        }
    }

    #[inline]
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.translate.x, self.translate.y, self.scale)
    }
}

fn ratio(target: f64, side: f64) -> f64 {
    if side > 0.0 && side.is_finite() && target.is_finite() {
        target / side
    } else {
        1.0
    }
}

/// Zoom tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPolicy {
    /// Fraction of the viewport the focused tile fills.
    pub fill_fraction: f64,
    /// Scales at or below this count as "not zoomed".
    pub zoomed_threshold: f64,
    pub zoom_in: Duration,
    pub zoom_out: Duration,
    pub easing: Easing,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            fill_fraction: 0.7,
            zoomed_threshold: 1.5,
            zoom_in: Duration::from_millis(800),
            zoom_out: Duration::from_millis(800),
            easing: Easing::EaseInOutCubic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraTransform;

    const VIEWPORT: Size = Size {
        width: 1200.0,
        height: 800.0,
    };

    #[test]
    fn portrait_tile_fills_height() {
        let tile = Rect::new(100.0, 100.0, 90.0, 160.0);
        let plan = FocusPlan::compute(tile, VIEWPORT, Point::ZERO, 0.7);
        assert!((plan.scale - 3.5).abs() < 1e-12);
    }

    #[test]
    fn landscape_tile_fills_width() {
        let tile = Rect::new(0.0, 0.0, 300.0, 200.0);
        let plan = FocusPlan::compute(tile, VIEWPORT, Point::ZERO, 0.7);
        assert!((plan.scale - 2.8).abs() < 1e-12);
    }

    #[test]
    fn square_counts_as_portrait() {
        let tile = Rect::new(0.0, 0.0, 200.0, 200.0);
        let plan = FocusPlan::compute(tile, VIEWPORT, Point::ZERO, 0.7);
        assert!((plan.scale - 2.8).abs() < 1e-12);
    }

    #[test]
    fn scale_never_below_one() {
        let tile = Rect::new(0.0, 0.0, 1100.0, 700.0);
        let plan = FocusPlan::compute(tile, VIEWPORT, Point::ZERO, 0.7);
        assert_eq!(plan.scale, 1.0);
        let empty = FocusPlan::compute(Rect::new(0.0, 0.0, 0.0, 0.0), VIEWPORT, Point::ZERO, 0.7);
        assert_eq!(empty.scale, 1.0);
    }

    #[test]
    fn plan_centers_tile() {
        let c0 = Point::new(0.0, 60.0);
        let tile = Rect::new(900.0, 1400.0, 160.0, 90.0);
        let plan = FocusPlan::compute(tile, VIEWPORT, c0, 0.7);
        let t = CameraTransform::from_pose(plan.pose(), plan.origin);
        let center = t.screen_point(tile.center(), c0);
        assert!((center.x - 600.0).abs() < 1e-9);
        assert!((center.y - 400.0).abs() < 1e-9);
        let on_screen = t.screen_rect(tile, c0);
        assert!((on_screen.width - 0.7 * 1200.0).abs() < 1e-9);
    }

    #[test]
    fn phase_accessors() {
        let tile = TileId::new(1, 4);
        assert!(ZoomPhase::Idle.is_idle());
        assert!(ZoomPhase::ZoomingIn { tile }.is_transitioning());
        assert!(!ZoomPhase::Focused { tile }.is_transitioning());
        assert_eq!(ZoomPhase::ZoomingOut { tile }.tile(), Some(tile));
        assert_eq!(ZoomPhase::Idle.tile(), None);
        assert_eq!(ZoomPhase::Focused { tile }.name(), "focused");
    }
}
