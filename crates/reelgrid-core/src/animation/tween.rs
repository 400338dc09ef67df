#![forbid(unsafe_code)]

//! Time-boxed interpolation between two values.
//!
//! # Invariants
//!
//! 1. `current()` equals `from` before the first tick and `to` once complete.
//! 2. `retarget()` keeps elapsed time; only the endpoint moves.
//! 3. A zero duration is complete at construction.
//!
//! # Failure Modes
//!
//! - Ticking past the end clamps progress to 1.0 and records the excess in
//!   [`Animation::overshoot`].

use std::time::Duration;

use super::{Animation, EasingFn, Lerp, progress};

/// Interpolates `from → to` over `duration` with an easing curve.
#[derive(Debug, Clone)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration: Duration,
    elapsed: Duration,
    overshoot: Duration,
    easing: EasingFn,
}

impl<T: Lerp + Clone> Tween<T> {
    #[must_use]
    pub fn new(from: T, to: T, duration: Duration, easing: EasingFn) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            overshoot: Duration::ZERO,
            easing,
        }
    }

    /// Interpolated value at the current elapsed time.
    #[must_use]
    pub fn current(&self) -> T {
        self.from.lerp(&self.to, f64::from(self.value()))
    }

    #[inline]
    pub fn from(&self) -> &T {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &T {
        &self.to
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Move the endpoint, keeping elapsed progress.
    pub fn retarget(&mut self, to: T) {
        self.to = to;
    }

    /// Jump straight to the endpoint.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

impl<T: Lerp + Clone> Animation for Tween<T> {
    fn tick(&mut self, dt: Duration) {
        let next = self.elapsed.saturating_add(dt);
        if next > self.duration {
            self.overshoot = next - self.duration;
            self.elapsed = self.duration;
        } else {
            self.overshoot = Duration::ZERO;
            self.elapsed = next;
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(progress(self.elapsed, self.duration))
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.overshoot = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.overshoot
    }
}
