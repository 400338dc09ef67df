#![forbid(unsafe_code)]

//! The navigator: one state-machine context per mounted grid.
//!
//! [`Navigator`] owns everything that used to be loose mutable state around
//! the grid: the pan accumulators (via the [`InputObserver`]), the camera
//! driver, the zoom phase, the saved pan, and the deferred task queue.
//! Hosts forward their callbacks into it:
//!
//! | Host callback              | Navigator call                |
//! |----------------------------|-------------------------------|
//! | wheel / touch / drag delta | [`Navigator::handle_input`]   |
//! | click                      | [`Navigator::click`]          |
//! | window resize              | [`Navigator::resize`]         |
//! | content resize observer    | [`Navigator::content_resized`]|
//! | animation frame            | [`Navigator::frame`]          |
//! | content swapped out        | [`Navigator::interrupt`]      |
//! | unmount                    | [`Navigator::teardown`]       |
//!
//! Time only enters through `now` arguments (host timestamps). Input and
//! clicks are stamped with the most recent frame or resize time.
//!
//! # Invariants
//!
//! 1. The observer is attached only while the phase is `Idle` and the
//!    camera driver is the pan smoother pair. Pan input can never reach
//!    the accumulators during a zoom.
//! 2. Exactly one [`CameraDriver`] exists, so at most one tween drives the
//!    container.
//! 3. Starting any transition cancels the previous transition's deferred
//!    work.
//! 4. After `teardown()` no call changes state or touches the host.
//!
//! # Failure Modes
//!
//! - Container or tile detached: the handler does nothing this frame.
//! - Geometry not measurable: the previous geometry is kept; before the
//!   first successful measurement the pan offset renders as `0px`.

use std::time::Duration;

use reelgrid_core::animation::{EasingFn, Tween};
use reelgrid_core::event::InputEvent;
use reelgrid_core::geometry::Point;
use reelgrid_core::grid::{GridGeometry, TileId};
use reelgrid_core::wrap::{WrappedOffset, wrap_offset};

use crate::camera::{CameraDriver, CameraPose, CameraTransform, LiveTween};
use crate::cancellation::CancellationSource;
use crate::config::{ConfigError, NavigatorConfig};
use crate::observer::{InputObserver, ObserverOutcome};
use crate::scene::SceneHost;
use crate::scheduler::{DeferredQueue, DeferredTask};
use crate::zoom::{FocusPlan, SavedPanState, ZoomPhase, ZoomPolicy};

/// Why a grid could not be mounted.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    /// No media items; the host renders its empty state instead.
    #[error("no media items to display")]
    Empty,
    /// The grid container is not attached to the document.
    #[error("grid container is not attached")]
    Detached,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why a click did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The click did not land on a tile.
    NoTile,
    /// The click landed on the already focused tile.
    SameTile,
    /// A transition is in flight.
    InTransition,
    /// The container or tile is gone.
    Detached,
    TornDown,
}

/// Result of [`Navigator::click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    ZoomIn(TileId),
    ZoomOut,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Remeasure,
    Reattach,
    ReattachCancelled,
}

/// Pan/zoom state machine bound to one scene host.
pub struct Navigator<H> {
    host: H,
    config: NavigatorConfig,
    zoom: ZoomPolicy,
    pan_duration: Duration,
    pan_easing: EasingFn,
    phase: ZoomPhase,
    driver: CameraDriver,
    origin: Point,
    transform: CameraTransform,
    applied: Option<CameraTransform>,
    geometry: GridGeometry,
    observer: InputObserver,
    saved: Option<SavedPanState>,
    queue: DeferredQueue<Deferred>,
    lifetime: CancellationSource,
    transition: CancellationSource,
    clock: Duration,
    torn_down: bool,
}

impl<H: SceneHost> Navigator<H> {
    /// Set up panning over `item_count` items rendered by `host`.
    ///
    /// Measures immediately and again after each configured delay.
    pub fn mount(
        host: H,
        item_count: usize,
        config: NavigatorConfig,
        now: Duration,
    ) -> Result<Self, MountError> {
        if item_count == 0 {
            tracing::debug!(target: "reelgrid.geometry", "mount skipped: no media items");
            return Err(MountError::Empty);
        }
        let config = config.validated()?;
        if host.container_origin().is_none() {
            tracing::debug!(target: "reelgrid.geometry", "mount skipped: container detached");
            return Err(MountError::Detached);
        }

        let pan_duration = config.pan_duration();
        let pan_easing = config.pan.easing.function();
        let mut nav = Self {
            host,
            zoom: config.zoom_policy(),
            observer: InputObserver::attached(config.observer_policy()),
            config,
            pan_duration,
            pan_easing,
            phase: ZoomPhase::Idle,
            driver: CameraDriver::pan(0.0, 0.0, pan_duration, pan_easing),
            origin: Point::ZERO,
            transform: CameraTransform::IDENTITY,
            applied: None,
            geometry: GridGeometry::UNMEASURED,
            saved: None,
            queue: DeferredQueue::new(),
            lifetime: CancellationSource::new(),
            transition: CancellationSource::new(),
            clock: now,
            torn_down: false,
        };

        nav.remeasure();
        let delays: Vec<Duration> = nav.config.remeasure_delays().collect();
        for delay in delays {
            let task = DeferredTask::new("remeasure", nav.lifetime.token())
                .wait_for(delay)
                .then(Deferred::Remeasure);
            nav.queue.schedule(task, now);
        }
        nav.render();

        tracing::debug!(
            target: "reelgrid.geometry",
            items = item_count,
            cell_width = nav.geometry.cell_width,
            cell_height = nav.geometry.cell_height,
            "navigator mounted"
        );
        Ok(nav)
    }

    // -----------------------------------------------------------------------
    // Host callbacks
    // -----------------------------------------------------------------------

    /// Feed one wheel/touch/pointer delta.
    pub fn handle_input(&mut self, event: InputEvent) -> ObserverOutcome {
        if self.torn_down {
            return ObserverOutcome::Detached;
        }
        let outcome = self.observer.handle(event, self.clock);
        if let ObserverOutcome::Accepted(target) = outcome
            && let CameraDriver::Pan { x, y } = &mut self.driver
        {
            x.set_target(target.x);
            y.set_target(target.y);
        }
        outcome
    }

    /// A click at a screen point.
    pub fn click(&mut self, point: Point) -> ClickOutcome {
        if self.torn_down {
            return ClickOutcome::Ignored(IgnoreReason::TornDown);
        }
        if self.host.container_origin().is_none() {
            tracing::trace!(target: "reelgrid.zoom", "click ignored: container detached");
            return ClickOutcome::Ignored(IgnoreReason::Detached);
        }
        let hit = self.host.tile_at(point);

        let outcome = match self.phase {
            ZoomPhase::Idle if self.transform.scale <= self.zoom.zoomed_threshold => match hit {
                Some(tile) => self.begin_zoom_in(tile, self.transform),
                None => ClickOutcome::Ignored(IgnoreReason::NoTile),
            },
            ZoomPhase::Idle => ClickOutcome::Ignored(IgnoreReason::InTransition),
            ZoomPhase::ZoomingIn { tile: current } => match hit {
                Some(tile) if tile != current => self.redirect_zoom_in(current, tile),
                _ => ClickOutcome::Ignored(IgnoreReason::InTransition),
            },
            ZoomPhase::Focused { tile: focused } => {
                if hit == Some(focused) {
                    ClickOutcome::Ignored(IgnoreReason::SameTile)
                } else {
                    self.begin_zoom_out(focused)
                }
            }
            ZoomPhase::ZoomingOut { .. } => ClickOutcome::Ignored(IgnoreReason::InTransition),
        };

        if let ClickOutcome::Ignored(reason) = outcome {
            tracing::trace!(
                target: "reelgrid.zoom",
                phase = self.phase.name(),
                ?reason,
                "click ignored"
            );
        }
        outcome
    }

    /// Window resize.
    ///
    /// Re-measures, then keeps a focused tile centered at the same relative
    /// size (snapped) or redirects an in-flight zoom-in to the new target.
    pub fn resize(&mut self, now: Duration) {
        if self.torn_down {
            return;
        }
        self.clock = self.clock.max(now);
        let Some(container_origin) = self.host.container_origin() else {
            tracing::trace!(target: "reelgrid.geometry", "resize ignored: container detached");
            return;
        };
        self.remeasure();

        match self.phase {
            ZoomPhase::Focused { tile } => {
                if let Some(plan) = self.plan_for(tile, container_origin) {
                    self.origin = plan.origin;
                    self.driver = CameraDriver::Pinned(plan.pose());
                    tracing::debug!(
                        target: "reelgrid.zoom",
                        scale = plan.scale,
                        tile_block = tile.block,
                        tile_index = tile.index,
                        "focused tile re-centered after resize"
                    );
                }
            }
            ZoomPhase::ZoomingIn { tile } => {
                if let Some(plan) = self.plan_for(tile, container_origin) {
                    let target = CameraTransform::from_pose(plan.pose(), plan.origin)
                        .rebased(self.origin)
                        .pose();
                    if let CameraDriver::Zoom(tween) = &mut self.driver {
                        tween.retarget(target);
                    }
                    tracing::debug!(
                        target: "reelgrid.zoom",
                        scale = plan.scale,
                        "zoom-in retargeted after resize"
                    );
                }
            }
            ZoomPhase::Idle | ZoomPhase::ZoomingOut { .. } => {}
        }
        self.render();
    }

    /// The primary content block changed size.
    pub fn content_resized(&mut self) {
        if self.torn_down {
            return;
        }
        self.remeasure();
    }

    /// One animation frame at host time `now`.
    pub fn frame(&mut self, now: Duration) {
        if self.torn_down {
            return;
        }
        let dt = now.saturating_sub(self.clock);
        self.clock = self.clock.max(now);

        for action in self.queue.poll(now) {
            self.run_deferred(action);
        }

        self.driver.tick(dt);
        if let Some(end) = self.driver.finished_zoom() {
            self.complete_transition(end);
        }
        self.render();
    }

    /// Abandon an in-flight transition, e.g. because the host swapped the
    /// content out from under it.
    ///
    /// A zoom-in falls back to idle panning at the saved offset with input
    /// re-attached at once. A zoom-out completes immediately.
    pub fn interrupt(&mut self) {
        if self.torn_down {
            return;
        }
        match self.phase {
            ZoomPhase::ZoomingIn { tile } => {
                let _span = transition_span("interrupt", tile).entered();
                tracing::debug!(target: "reelgrid.zoom", "zoom-in interrupted; resuming pan");
                self.resume_panning();
                self.render();
            }
            ZoomPhase::ZoomingOut { tile } => {
                let _span = transition_span("interrupt", tile).entered();
                tracing::debug!(target: "reelgrid.zoom", "zoom-out interrupted; completing now");
                self.finish_zoom_out();
                self.render();
            }
            ZoomPhase::Idle | ZoomPhase::Focused { .. } => {
                tracing::trace!(target: "reelgrid.zoom", phase = self.phase.name(), "nothing to interrupt");
            }
        }
    }

    /// Unmount. Terminal: later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.transition.cancel();
        self.lifetime.cancel();
        self.queue.clear();
        self.observer.detach();
        self.driver = CameraDriver::Pinned(self.transform.pose());
        self.torn_down = true;
        tracing::debug!(target: "reelgrid.zoom", phase = self.phase.name(), "navigator torn down");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    /// Transform most recently computed for the container.
    pub fn camera(&self) -> CameraTransform {
        self.transform
    }

    /// Raw (unwrapped) pan accumulator.
    pub fn accumulator(&self) -> (f64, f64) {
        self.observer.accumulator()
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn live_tween(&self) -> Option<LiveTween> {
        if self.torn_down {
            return None;
        }
        self.driver.live_tween()
    }

    pub fn observer_attached(&self) -> bool {
        self.observer.is_attached()
    }

    pub fn saved_pan(&self) -> Option<SavedPanState> {
        self.saved
    }

    /// The tile held at focus, only while fully focused.
    pub fn focused_tile(&self) -> Option<TileId> {
        match self.phase {
            ZoomPhase::Focused { tile } => Some(tile),
            _ => None,
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn begin_zoom_in(&mut self, tile: TileId, from: CameraTransform) -> ClickOutcome {
        let Some(container_origin) = self.host.container_origin() else {
            return ClickOutcome::Ignored(IgnoreReason::Detached);
        };
        let Some(plan) = self.plan_for(tile, container_origin) else {
            return ClickOutcome::Ignored(IgnoreReason::Detached);
        };

        let _span = transition_span("in", tile).entered();
        self.restart_transition();
        if self.phase.is_idle() {
            let (x, y) = self.observer.accumulator();
            self.saved = Some(SavedPanState { x, y });
        }
        self.observer.detach();

        let start = from.rebased(plan.origin).pose();
        self.origin = plan.origin;
        self.driver = CameraDriver::Zoom(Tween::new(
            start,
            plan.pose(),
            self.zoom.zoom_in,
            self.zoom.easing.function(),
        ));
        self.phase = ZoomPhase::ZoomingIn { tile };
        tracing::debug!(
            target: "reelgrid.zoom",
            scale = plan.scale,
            tx = plan.translate.x,
            ty = plan.translate.y,
            "zoom-in started"
        );
        self.render();
        ClickOutcome::ZoomIn(tile)
    }

    /// A second tile was clicked before the first zoom-in finished.
    fn redirect_zoom_in(&mut self, current: TileId, next: TileId) -> ClickOutcome {
        let from = self.transform;
        {
            let _span = transition_span("interrupt", current).entered();
            tracing::debug!(
                target: "reelgrid.zoom",
                next_block = next.block,
                next_index = next.index,
                "zoom-in interrupted by another tile"
            );
            self.resume_panning();
        }
        self.begin_zoom_in(next, from)
    }

    fn begin_zoom_out(&mut self, tile: TileId) -> ClickOutcome {
        let _span = transition_span("out", tile).entered();
        self.restart_transition();
        let target = self.saved_pan_pose();
        self.driver = CameraDriver::Zoom(Tween::new(
            self.transform.pose(),
            target,
            self.zoom.zoom_out,
            self.zoom.easing.function(),
        ));
        self.phase = ZoomPhase::ZoomingOut { tile };
        tracing::debug!(target: "reelgrid.zoom", x = target.x, y = target.y, "zoom-out started");
        self.render();
        ClickOutcome::ZoomOut
    }

    fn complete_transition(&mut self, end: CameraPose) {
        match self.phase {
            ZoomPhase::ZoomingIn { tile } => {
                let _span = transition_span("in", tile).entered();
                self.driver = CameraDriver::Pinned(end);
                self.phase = ZoomPhase::Focused { tile };
                tracing::debug!(target: "reelgrid.zoom", scale = end.scale, "zoom-in complete");
            }
            ZoomPhase::ZoomingOut { tile } => {
                let _span = transition_span("out", tile).entered();
                self.finish_zoom_out();
            }
            ZoomPhase::Idle | ZoomPhase::Focused { .. } => {
                self.driver = CameraDriver::Pinned(end);
            }
        }
    }

    /// Restore the wrapped saved pan, reset the origin, re-measure, and
    /// schedule input re-attachment.
    fn finish_zoom_out(&mut self) {
        self.restart_transition();
        let (x, y) = self.wrapped_saved();
        self.observer.set_accumulator(x, y);
        self.saved = None;
        self.origin = Point::ZERO;
        self.remeasure();
        self.driver = CameraDriver::Pinned(self.pan_pose(x, y));
        self.phase = ZoomPhase::Idle;

        let task = DeferredTask::new("reattach", self.transition.token())
            .wait_frames(self.config.observer.reattach_frames)
            .wait_for(self.config.reattach_delay())
            .then(Deferred::Reattach)
            .on_cancel(Deferred::ReattachCancelled);
        self.queue.schedule(task, self.clock);
        tracing::debug!(
            target: "reelgrid.zoom",
            x,
            y,
            delay_ms = self.config.observer.reattach_delay_ms,
            "zoom-out complete; input re-attach scheduled"
        );
    }

    /// Back to idle panning at the wrapped saved offset, input attached.
    fn resume_panning(&mut self) {
        self.restart_transition();
        let (x, y) = self.wrapped_saved();
        self.observer.set_accumulator(x, y);
        self.saved = None;
        self.origin = Point::ZERO;
        self.driver = CameraDriver::pan(x, y, self.pan_duration, self.pan_easing);
        self.phase = ZoomPhase::Idle;
        self.observer.attach(self.clock);
    }

    fn run_deferred(&mut self, action: Deferred) {
        match action {
            Deferred::Remeasure => self.remeasure(),
            Deferred::Reattach => {
                if self.phase.is_idle() && !self.observer.is_attached() {
                    let (x, y) = self.observer.accumulator();
                    self.driver = CameraDriver::pan(x, y, self.pan_duration, self.pan_easing);
                    self.observer.attach(self.clock);
                }
            }
            Deferred::ReattachCancelled => {
                tracing::debug!(target: "reelgrid.observer", "stale input re-attach cancelled");
            }
        }
    }

    fn restart_transition(&mut self) {
        self.transition.cancel();
        self.transition = CancellationSource::new();
    }

    // -----------------------------------------------------------------------
    // Geometry & rendering
    // -----------------------------------------------------------------------

    fn remeasure(&mut self) {
        if self.host.container_origin().is_none() {
            return;
        }
        let Some(size) = self.host.content_size() else {
            tracing::trace!(target: "reelgrid.geometry", "content not measurable; keeping geometry");
            return;
        };
        let geometry = GridGeometry::from_measurement(Some(size));
        if geometry != self.geometry {
            tracing::debug!(
                target: "reelgrid.geometry",
                cell_width = geometry.cell_width,
                cell_height = geometry.cell_height,
                "grid geometry measured"
            );
        }
        self.geometry = geometry;
    }

    /// Focus plan for `tile` against the current viewport.
    fn plan_for(&self, tile: TileId, container_origin: Point) -> Option<FocusPlan> {
        let client = self.host.tile_client_rect(tile)?;
        let local = self.projection().local_rect(client, container_origin);
        Some(FocusPlan::compute(
            local,
            self.host.viewport(),
            container_origin,
            self.zoom.fill_fraction,
        ))
    }

    /// The transform the host last drew with.
    fn projection(&self) -> CameraTransform {
        self.applied.unwrap_or(self.transform)
    }

    fn wrapped_saved(&self) -> (f64, f64) {
        let (x, y) = match self.saved {
            Some(saved) => (saved.x, saved.y),
            None => self.observer.accumulator(),
        };
        (
            wrap_or_keep(self.geometry.cell_width, x),
            wrap_or_keep(self.geometry.cell_height, y),
        )
    }

    fn saved_pan_pose(&self) -> CameraPose {
        let (x, y) = self.wrapped_saved();
        self.pan_pose(x, y)
    }

    fn pan_pose(&self, x: f64, y: f64) -> CameraPose {
        CameraPose::pan(
            self.geometry.wrap_x(x).to_px(),
            self.geometry.wrap_y(y).to_px(),
        )
    }

    fn render(&mut self) {
        self.transform = CameraTransform::from_pose(self.driver.pose(&self.geometry), self.origin);
        if self.applied == Some(self.transform) {
            return;
        }
        if self.host.container_origin().is_some() {
            self.host.apply_transform(&self.transform);
            self.applied = Some(self.transform);
        }
    }
}

fn transition_span(kind: &'static str, tile: TileId) -> tracing::Span {
    tracing::debug_span!(
        target: "reelgrid.zoom",
        "zoom.transition",
        kind,
        tile_block = tile.block,
        tile_index = tile.index
    )
}

/// Wrap into one cell when measured; keep the raw value otherwise.
fn wrap_or_keep(cell: f64, raw: f64) -> f64 {
    match wrap_offset(cell, raw) {
        WrappedOffset::Px(v) => v,
        WrappedOffset::Unmeasured => raw,
    }
}
