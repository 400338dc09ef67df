#![forbid(unsafe_code)]

//! Canonical pan input events.
//!
//! Hosts translate wheel, touch, and pointer-drag callbacks into
//! [`InputEvent`] values carrying a per-axis delta and the source kind.
//! The source kind matters because wheel and drag gestures move the plane
//! in opposite senses and at different gains.

/// Which input device produced a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Mouse wheel or trackpad scroll.
    Wheel,
    /// Touch drag.
    Touch,
    /// Mouse/pen drag.
    Pointer,
}

impl InputKind {
    /// Drag kinds follow the finger; wheel moves content the other way.
    #[inline]
    pub const fn is_drag(self) -> bool {
        matches!(self, Self::Touch | Self::Pointer)
    }
}

/// A single pan delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub dx: f64,
    pub dy: f64,
}

impl InputEvent {
    #[inline]
    pub const fn new(kind: InputKind, dx: f64, dy: f64) -> Self {
        Self { kind, dx, dy }
    }

    #[inline]
    pub const fn wheel(dx: f64, dy: f64) -> Self {
        Self::new(InputKind::Wheel, dx, dy)
    }

    #[inline]
    pub const fn touch(dx: f64, dy: f64) -> Self {
        Self::new(InputKind::Touch, dx, dy)
    }

    #[inline]
    pub const fn pointer(dx: f64, dy: f64) -> Self {
        Self::new(InputKind::Pointer, dx, dy)
    }

    /// Whether either axis carries a usable change.
    #[inline]
    pub fn has_delta(&self) -> bool {
        (self.dx != 0.0 && self.dx.is_finite()) || (self.dy != 0.0 && self.dy.is_finite())
    }
}
