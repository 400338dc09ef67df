#![forbid(unsafe_code)]

//! Wrap function for the infinitely tiling plane.
//!
//! The grid container is translated by a raw offset that input may grow
//! without bound. Before it reaches the screen, the offset is folded into a
//! single cell so that the duplicated blocks always cover the viewport.
//!
//! # Invariants
//!
//! 1. For a measured cell `c > 0`, `wrap(-c, 0, v)` is in `[-c, 0)` for every
//!    finite `v`.
//! 2. Periodicity: `wrap(-c, 0, v + c) == wrap(-c, 0, v)` up to float
//!    round-off (exact for integral pixel values).
//! 3. An unmeasured cell (`c <= 0`) yields [`WrappedOffset::Unmeasured`],
//!    which renders as `0px`. No division or modulo by zero is attempted.

/// Fold `value` into the half-open range `[min, max)`.
///
/// A degenerate range (`max <= min`) or a non-finite input returns `min`.
#[inline]
pub fn wrap(min: f64, max: f64, value: f64) -> f64 {
    let range = max - min;
    if !(range > 0.0) || !range.is_finite() || !value.is_finite() || !min.is_finite() {
        return min;
    }
    let folded = min + (value - min).rem_euclid(range);
    // rem_euclid can round up to exactly `range` for tiny negative inputs.
    if folded >= max { min } else { folded }
}

/// A reusable `[min, max)` wrap range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapRange {
    pub min: f64,
    pub max: f64,
}

impl WrapRange {
    /// Create a range `[min, max)`.
    #[inline]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The range for one grid cell: `[-cell_size, 0)`.
    #[inline]
    pub const fn cell(cell_size: f64) -> Self {
        Self::new(-cell_size, 0.0)
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        wrap(self.min, self.max, value)
    }
}

/// Result of wrapping a pan offset against a possibly unmeasured cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WrappedOffset {
    /// Wrapped pixel offset in `[-cell, 0)`.
    Px(f64),
    /// The cell has not been measured yet; the container stays at `0px`.
    Unmeasured,
}

impl WrappedOffset {
    /// Pixel value to apply (the sentinel maps to `0.0`).
    #[inline]
    pub fn to_px(self) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Unmeasured => 0.0,
        }
    }

    /// CSS length for a `translate` component.
    pub fn css(self) -> String {
        match self {
            Self::Px(v) => format!("{v}px"),
            Self::Unmeasured => "0px".to_string(),
        }
    }
}

/// Wrap a raw offset into one cell of size `cell_size`.
#[inline]
pub fn wrap_offset(cell_size: f64, raw: f64) -> WrappedOffset {
    if cell_size > 0.0 && cell_size.is_finite() {
        WrappedOffset::Px(WrapRange::cell(cell_size).apply(raw))
    } else {
        WrappedOffset::Unmeasured
    }
}
