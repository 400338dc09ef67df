#![forbid(unsafe_code)]

//! Retargetable single-axis smoothing.
//!
//! A [`Smoother`] chases a moving target. Each `set_target` starts a fresh
//! tween from wherever the value currently is, so rapid input produces one
//! continuous decelerating glide instead of a queue of steps.
//!
//! The raw value is unbounded. Consumers that need a folded value read it
//! through [`Smoother::modified`], which applies the modifier on every read
//! rather than to the stored state. Wrapping therefore never introduces a
//! jump into the interpolation itself.
//!
//! # Invariants
//!
//! 1. `set_target` never moves `current()` on the same frame.
//! 2. After a full `duration` of ticks with no new target, `current()` equals
//!    the last target exactly.
//! 3. `snap` leaves the smoother at rest.

use std::time::Duration;

use super::{Animation, EasingFn, Tween, power4_out};

/// Default glide time for pan input.
pub const DEFAULT_SMOOTHING: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct Smoother {
    tween: Tween<f64>,
    initial: f64,
    duration: Duration,
    easing: EasingFn,
}

impl Smoother {
    #[must_use]
    pub fn new(initial: f64, duration: Duration, easing: EasingFn) -> Self {
        Self {
            tween: Tween::new(initial, initial, Duration::ZERO, easing),
            initial,
            duration,
            easing,
        }
    }

    /// Pan defaults: 1.5 s with [`power4_out`].
    #[must_use]
    pub fn pan(initial: f64) -> Self {
        Self::new(initial, DEFAULT_SMOOTHING, power4_out)
    }

    /// Glide from the current value to `target`.
    pub fn set_target(&mut self, target: f64) {
        let from = self.tween.current();
        self.tween = Tween::new(from, target, self.duration, self.easing);
    }

    /// Jump to `value` with no motion.
    pub fn snap(&mut self, value: f64) {
        self.tween = Tween::new(value, value, Duration::ZERO, self.easing);
    }

    /// Raw interpolated value.
    #[inline]
    pub fn current(&self) -> f64 {
        self.tween.current()
    }

    /// The value the smoother is heading to.
    #[inline]
    pub fn target(&self) -> f64 {
        *self.tween.to()
    }

    /// Current value passed through `modifier`.
    #[inline]
    pub fn modified(&self, modifier: impl Fn(f64) -> f64) -> f64 {
        modifier(self.current())
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        !self.tween.is_complete()
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Animation for Smoother {
    fn tick(&mut self, dt: Duration) {
        self.tween.tick(dt);
    }

    fn is_complete(&self) -> bool {
        self.tween.is_complete()
    }

    fn value(&self) -> f32 {
        self.tween.value()
    }

    fn reset(&mut self) {
        self.snap(self.initial);
    }

    fn overshoot(&self) -> Duration {
        self.tween.overshoot()
    }
}
