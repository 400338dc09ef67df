#![forbid(unsafe_code)]

//! Animation primitives driven by host-supplied time deltas.
//!
//! Everything here advances only through [`Animation::tick`]. There is no
//! internal clock, so a run is fully reproducible from the sequence of frame
//! deltas.
//!
//! - [`Tween`]: time-boxed interpolation between two [`Lerp`] values.
//! - [`Smoother`]: a retargetable single-axis tween with an output modifier,
//!   used for inertial panning.
//! - Easing curves: plain `fn(f32) -> f32` on `[0, 1]`, nameable through
//!   [`Easing`] for configuration.

mod smoother;
mod tween;

use std::time::Duration;

pub use smoother::Smoother;
pub use tween::Tween;

/// A time-advanced animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Normalized progress (eased), in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time past completion carried by the last `tick`.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// An easing curve on `[0, 1]`.
pub type EasingFn = fn(f32) -> f32;

// ---------------------------------------------------------------------------
// Easing curves
// ---------------------------------------------------------------------------

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Strong deceleration: `1 - (1 - t)^5`. Fast start, long settle.
#[inline]
pub fn power4_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(5)
}

/// Named easing curve, for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
    Power4Out,
}

impl Easing {
    #[must_use]
    pub const fn function(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
            Self::EaseInCubic => ease_in_cubic,
            Self::EaseOutCubic => ease_out_cubic,
            Self::EaseInOutCubic => ease_in_out_cubic,
            Self::Power4Out => power4_out,
        }
    }

    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        (self.function())(t)
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Linear interpolation between two values of the same type.
pub trait Lerp {
    /// `t == 0` yields `self`, `t == 1` yields `to`.
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for crate::geometry::Point {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self::new(self.x.lerp(&to.x, t), self.y.lerp(&to.y, t))
    }
}

/// Progress fraction of `elapsed` within `duration`, clamped to `[0, 1]`.
/// A zero duration is already complete.
#[inline]
pub(crate) fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Easing; 8] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::Power4Out,
    ];

    #[test]
    fn curves_fix_endpoints() {
        for e in CURVES {
            assert!(e.apply(0.0).abs() < 1e-6, "{e:?} at 0");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-6, "{e:?} at 1");
        }
    }

    #[test]
    fn curves_clamp_out_of_range() {
        for e in CURVES {
            assert!(e.apply(-3.0).abs() < 1e-6);
            assert!((e.apply(7.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for e in CURVES {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = e.apply(i as f32 / 100.0);
                assert!(v + 1e-6 >= prev, "{e:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn power4_out_front_loads_motion() {
        assert!((power4_out(0.5) - 0.96875).abs() < 1e-6);
        assert!(power4_out(0.2) > 0.6);
    }

    #[test]
    fn lerp_f64_and_point() {
        assert_eq!(10.0_f64.lerp(&20.0, 0.25), 12.5);
        let p = crate::geometry::Point::new(0.0, 10.0).lerp(&crate::geometry::Point::new(10.0, 0.0), 0.5);
        assert_eq!(p, crate::geometry::Point::new(5.0, 5.0));
    }

    #[test]
    fn progress_zero_duration_is_complete() {
        assert_eq!(progress(Duration::ZERO, Duration::ZERO), 1.0);
        assert_eq!(progress(Duration::from_millis(50), Duration::from_millis(100)), 0.5);
        assert_eq!(progress(Duration::from_millis(500), Duration::from_millis(100)), 1.0);
    }
}
