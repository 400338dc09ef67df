#![forbid(unsafe_code)]

//! Camera transform of the grid container.
//!
//! The container is drawn with a CSS-style transform
//! `translate(x, y) scale(s)` about a transform origin `o` given in the
//! container's local (untransformed) coordinates. With `C0` the container's
//! untransformed layout origin on screen, a local point `p` lands at
//!
//! ```text
//! screen = C0 + o + t + s·(p − o)
//! ```
//!
//! While panning, `s = 1` and `o = 0`, so the container simply shifts by the
//! wrapped pan offset. While zoomed, `o` sits at the focused tile's center.
//!
//! # Single writer
//!
//! [`CameraDriver`] is the only thing that produces camera poses. It is an
//! enum, so the pan smoothers and the zoom tween cannot both be alive:
//! installing a new driver drops the old one first.

use std::time::Duration;

use reelgrid_core::animation::{Animation, Lerp, Smoother, Tween};
use reelgrid_core::geometry::{Point, Rect};
use reelgrid_core::grid::GridGeometry;

/// Translate and scale, without an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl CameraPose {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Pure translation at scale 1.
    #[inline]
    pub const fn pan(x: f64, y: f64) -> Self {
        Self::new(x, y, 1.0)
    }
}

impl Lerp for CameraPose {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self::new(
            self.x.lerp(&to.x, t),
            self.y.lerp(&to.y, t),
            self.scale.lerp(&to.scale, t),
        )
    }
}

/// Full transform written to the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Transform origin in container-local pixels.
    pub origin: Point,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CameraTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        origin: Point::ZERO,
    };

    #[inline]
    pub const fn from_pose(pose: CameraPose, origin: Point) -> Self {
        Self {
            x: pose.x,
            y: pose.y,
            scale: pose.scale,
            origin,
        }
    }

    #[inline]
    pub const fn pose(&self) -> CameraPose {
        CameraPose::new(self.x, self.y, self.scale)
    }

    /// CSS `transform` value.
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.x, self.y, self.scale)
    }

    /// CSS `transform-origin` value.
    pub fn origin_css(&self) -> String {
        format!("{}px {}px", self.origin.x, self.origin.y)
    }

    /// Map a container-local point to the screen.
    pub fn screen_point(&self, local: Point, container_origin: Point) -> Point {
        Point::new(
            container_origin.x + self.origin.x + self.x + self.scale * (local.x - self.origin.x),
            container_origin.y + self.origin.y + self.y + self.scale * (local.y - self.origin.y),
        )
    }

    /// Inverse of [`screen_point`](Self::screen_point). A non-positive scale
    /// is treated as 1.
    pub fn local_point(&self, screen: Point, container_origin: Point) -> Point {
        let s = self.effective_scale();
        Point::new(
            self.origin.x + (screen.x - container_origin.x - self.origin.x - self.x) / s,
            self.origin.y + (screen.y - container_origin.y - self.origin.y - self.y) / s,
        )
    }

    pub fn screen_rect(&self, local: Rect, container_origin: Point) -> Rect {
        let min = self.screen_point(local.min(), container_origin);
        let s = self.effective_scale();
        Rect::new(min.x, min.y, local.width * s, local.height * s)
    }

    pub fn local_rect(&self, screen: Rect, container_origin: Point) -> Rect {
        let min = self.local_point(screen.min(), container_origin);
        let s = self.effective_scale();
        Rect::new(min.x, min.y, screen.width / s, screen.height / s)
    }

    /// Same on-screen result with a different origin:
    /// `t' = t + (1 − s)(o − o')`.
    #[must_use]
    pub fn rebased(&self, origin: Point) -> Self {
        let k = 1.0 - self.scale;
        Self {
            x: self.x + k * (self.origin.x - origin.x),
            y: self.y + k * (self.origin.y - origin.y),
            scale: self.scale,
            origin,
        }
    }

    #[inline]
    fn effective_scale(&self) -> f64 {
        if self.scale > 0.0 && self.scale.is_finite() {
            self.scale
        } else {
            1.0
        }
    }
}

/// Which animation currently drives the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveTween {
    PanSmoothing,
    Zoom,
}

/// The single writer of camera poses.
#[derive(Debug, Clone)]
pub enum CameraDriver {
    /// Input-driven panning through one smoother per axis. The smoothers
    /// hold raw offsets; the wrap is applied when the pose is read.
    Pan { x: Smoother, y: Smoother },
    /// A zoom transition.
    Zoom(Tween<CameraPose>),
    /// Held still: focused on a tile, or waiting for input to reattach.
    Pinned(CameraPose),
}

impl CameraDriver {
    /// Fresh pan smoothers at rest on `(x, y)`.
    pub fn pan(x: f64, y: f64, duration: Duration, easing: fn(f32) -> f32) -> Self {
        Self::Pan {
            x: Smoother::new(x, duration, easing),
            y: Smoother::new(y, duration, easing),
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        match self {
            Self::Pan { x, y } => {
                x.tick(dt);
                y.tick(dt);
            }
            Self::Zoom(tween) => tween.tick(dt),
            Self::Pinned(_) => {}
        }
    }

    /// Current pose. Pan offsets go through the wrap for `geometry`.
    pub fn pose(&self, geometry: &GridGeometry) -> CameraPose {
        match self {
            Self::Pan { x, y } => CameraPose::pan(
                x.modified(|v| geometry.wrap_x(v).to_px()),
                y.modified(|v| geometry.wrap_y(v).to_px()),
            ),
            Self::Zoom(tween) => tween.current(),
            Self::Pinned(pose) => *pose,
        }
    }

    pub fn live_tween(&self) -> Option<LiveTween> {
        match self {
            Self::Pan { x, y } if x.is_animating() || y.is_animating() => {
                Some(LiveTween::PanSmoothing)
            }
            Self::Zoom(_) => Some(LiveTween::Zoom),
            _ => None,
        }
    }

    /// End pose of a finished zoom tween.
    pub fn finished_zoom(&self) -> Option<CameraPose> {
        match self {
            Self::Zoom(tween) if tween.is_complete() => Some(*tween.to()),
            _ => None,
        }
    }
}
