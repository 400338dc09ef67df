#![forbid(unsafe_code)]

//! Frame-polled deferred tasks.
//!
//! A [`DeferredTask`] is a chain of steps: wait some frames, wait some time,
//! run an action. The navigator polls the [`DeferredQueue`] once per
//! animation frame with the host timestamp and executes whatever actions
//! became ready. Nothing here owns a timer; time only advances when the
//! host calls [`DeferredQueue::poll`].
//!
//! # Invariants
//!
//! 1. A task's steps run strictly in order, and a `Run` step yields its
//!    action exactly once.
//! 2. A cancelled task yields only its `on_cancel` action (if any), exactly
//!    once, and is then dropped. Steps of a cancelled task never run.
//! 3. `WaitFrames(n)` with `n > 0` consumes one poll per frame. A task
//!    scheduled during a frame does not see that frame.
//! 4. `WaitFor(d)` measures from the moment the step became current (the
//!    schedule time for a first step).
//! 5. Ready actions are returned in FIFO order of task scheduling.

use std::collections::VecDeque;
use std::time::Duration;

use crate::cancellation::CancellationToken;

/// One step in a deferred task.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<A> {
    /// Let `n` rendered frames pass.
    WaitFrames(u32),
    /// Let at least this much host time pass.
    WaitFor(Duration),
    /// Yield an action to the owner.
    Run(A),
}

/// A chain of steps guarded by a cancellation token.
#[derive(Debug)]
pub struct DeferredTask<A> {
    steps: VecDeque<Step<A>>,
    token: CancellationToken,
    on_cancel: Option<A>,
    step_started: Duration,
    label: &'static str,
}

impl<A> DeferredTask<A> {
    pub fn new(label: &'static str, token: CancellationToken) -> Self {
        Self {
            steps: VecDeque::new(),
            token,
            on_cancel: None,
            step_started: Duration::ZERO,
            label,
        }
    }

    #[must_use]
    pub fn wait_frames(mut self, frames: u32) -> Self {
        self.steps.push_back(Step::WaitFrames(frames));
        self
    }

    #[must_use]
    pub fn wait_for(mut self, delay: Duration) -> Self {
        self.steps.push_back(Step::WaitFor(delay));
        self
    }

    #[must_use]
    pub fn then(mut self, action: A) -> Self {
        self.steps.push_back(Step::Run(action));
        self
    }

    /// Action yielded instead of the remaining steps if the token fires.
    #[must_use]
    pub fn on_cancel(mut self, action: A) -> Self {
        self.on_cancel = Some(action);
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Advance as far as this frame allows. Returns `true` once finished.
    fn advance(&mut self, now: Duration, ready: &mut Vec<A>) -> bool {
        let mut frame_spent = false;
        loop {
            let Some(step) = self.steps.front_mut() else {
                return true;
            };
            match step {
                Step::WaitFrames(0) => {}
                Step::WaitFrames(n) => {
                    if frame_spent {
                        return false;
                    }
                    *n -= 1;
                    frame_spent = true;
                    if *n > 0 {
                        return false;
                    }
                }
                Step::WaitFor(delay) => {
                    if now.saturating_sub(self.step_started) < *delay {
                        return false;
                    }
                }
                Step::Run(_) => {}
            }
            if let Some(Step::Run(action)) = self.steps.pop_front() {
                ready.push(action);
            }
            self.step_started = now;
        }
    }
}

/// FIFO queue of deferred tasks polled once per frame.
#[derive(Debug)]
pub struct DeferredQueue<A> {
    tasks: Vec<DeferredTask<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `task`; its first step starts timing at `now`.
    pub fn schedule(&mut self, mut task: DeferredTask<A>, now: Duration) {
        task.step_started = now;
        tracing::trace!(
            target: "reelgrid.scheduler",
            label = task.label,
            steps = task.steps.len(),
            "deferred task scheduled"
        );
        self.tasks.push(task);
    }

    /// Advance every task by one frame and collect the ready actions.
    pub fn poll(&mut self, now: Duration) -> Vec<A> {
        let mut ready = Vec::new();
        self.tasks.retain_mut(|task| {
            if task.token.is_cancelled() {
                tracing::trace!(
                    target: "reelgrid.scheduler",
                    label = task.label,
                    "deferred task cancelled"
                );
                if let Some(action) = task.on_cancel.take() {
                    ready.push(action);
                }
                return false;
            }
            !task.advance(now, &mut ready)
        });
        ready
    }

    /// Drop every task without yielding anything.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
