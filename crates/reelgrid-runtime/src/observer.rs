#![forbid(unsafe_code)]

//! Input observer: one pair of unbounded pan accumulators fed by wheel,
//! touch, and pointer deltas.
//!
//! The observer is physically attached or detached. While detached every
//! event is discarded before it can touch the accumulators, which is how
//! panning and zooming stay mutually exclusive.
//!
//! # Ghost events
//!
//! The gesture that triggers a zoom-out can keep firing for a few events
//! after input listening resumes. On every re-attach the observer arms a
//! small counter that swallows the next `ghost_event_budget` events, for at
//! most `ghost_window`. Events after the window pass normally even if the
//! budget was not used up.
//!
//! # Invariants
//!
//! 1. A discarded event (`Detached`, `GhostSwallowed`, `NoChange`) never
//!    changes the accumulators.
//! 2. Wheel deltas subtract; drag deltas add, scaled by `drag_gain`.
//! 3. `detach()` disarms the ghost counter.

use std::time::Duration;

use reelgrid_core::event::InputEvent;

/// Gains and ghost-event settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPolicy {
    /// Multiplier for touch and pointer drags.
    pub drag_gain: f64,
    /// Multiplier for wheel deltas.
    pub wheel_gain: f64,
    /// Events swallowed right after a re-attach.
    pub ghost_event_budget: u32,
    /// How long the ghost counter stays armed.
    pub ghost_window: Duration,
}

impl Default for ObserverPolicy {
    fn default() -> Self {
        Self {
            drag_gain: 2.0,
            wheel_gain: 1.0,
            ghost_event_budget: 2,
            ghost_window: Duration::from_millis(250),
        }
    }
}

/// New raw pan target after an accepted event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanTarget {
    pub x: f64,
    pub y: f64,
}

/// What happened to one input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObserverOutcome {
    /// Observer not attached; event dropped.
    Detached,
    /// Swallowed as a ghost of the gesture that ended the last zoom.
    GhostSwallowed,
    /// Neither axis carried a usable delta.
    NoChange,
    /// Accumulators updated.
    Accepted(PanTarget),
}

impl ObserverOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct GhostGuard {
    remaining: u32,
    until: Duration,
}

#[derive(Debug, Clone)]
pub struct InputObserver {
    policy: ObserverPolicy,
    attached: bool,
    incr_x: f64,
    incr_y: f64,
    ghost: Option<GhostGuard>,
}

impl InputObserver {
    /// A detached observer with zeroed accumulators.
    pub fn new(policy: ObserverPolicy) -> Self {
        Self {
            policy,
            attached: false,
            incr_x: 0.0,
            incr_y: 0.0,
            ghost: None,
        }
    }

    /// An observer attached from the start, without a ghost counter.
    pub fn attached(policy: ObserverPolicy) -> Self {
        Self {
            attached: true,
            ..Self::new(policy)
        }
    }

    /// Re-attach and arm the ghost counter.
    pub fn attach(&mut self, now: Duration) {
        self.attached = true;
        self.ghost = (self.policy.ghost_event_budget > 0).then(|| GhostGuard {
            remaining: self.policy.ghost_event_budget,
            until: now.saturating_add(self.policy.ghost_window),
        });
        tracing::debug!(
            target: "reelgrid.observer",
            ghost_budget = self.policy.ghost_event_budget,
            x = self.incr_x,
            y = self.incr_y,
            "input observer attached"
        );
    }

    pub fn detach(&mut self) {
        if self.attached {
            tracing::debug!(target: "reelgrid.observer", "input observer detached");
        }
        self.attached = false;
        self.ghost = None;
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Raw (unwrapped) accumulator values.
    #[inline]
    pub fn accumulator(&self) -> (f64, f64) {
        (self.incr_x, self.incr_y)
    }

    /// Overwrite the accumulators, e.g. when restoring a saved pan.
    pub fn set_accumulator(&mut self, x: f64, y: f64) {
        self.incr_x = x;
        self.incr_y = y;
    }

    pub fn policy(&self) -> &ObserverPolicy {
        &self.policy
    }

    pub fn handle(&mut self, event: InputEvent, now: Duration) -> ObserverOutcome {
        if !self.attached {
            tracing::trace!(target: "reelgrid.observer", kind = ?event.kind, "event dropped: detached");
            return ObserverOutcome::Detached;
        }

        if let Some(guard) = self.ghost.as_mut() {
            if now < guard.until && guard.remaining > 0 {
                guard.remaining -= 1;
                let remaining = guard.remaining;
                if remaining == 0 {
                    self.ghost = None;
                }
                tracing::debug!(
                    target: "reelgrid.observer",
                    kind = ?event.kind,
                    remaining,
                    "ghost event swallowed"
                );
                return ObserverOutcome::GhostSwallowed;
            }
            self.ghost = None;
        }

        if !event.has_delta() {
            return ObserverOutcome::NoChange;
        }

        let dx = finite_or_zero(event.dx);
        let dy = finite_or_zero(event.dy);
        if event.kind.is_drag() {
            self.incr_x += dx * self.policy.drag_gain;
            self.incr_y += dy * self.policy.drag_gain;
        } else {
            self.incr_x -= dx * self.policy.wheel_gain;
            self.incr_y -= dy * self.policy.wheel_gain;
        }

        ObserverOutcome::Accepted(PanTarget {
            x: self.incr_x,
            y: self.incr_y,
        })
    }
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
