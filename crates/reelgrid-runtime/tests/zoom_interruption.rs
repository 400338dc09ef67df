//! Interrupted and re-entrant zoom transitions.
//!
//! Covers clicks that arrive mid-transition, host interrupts, resizes during
//! a zoom, stale input re-attachment, ghost events after re-attach, and a
//! detached container.
//!
//! Run:
//!   cargo test -p reelgrid-runtime --test zoom_interruption

use std::time::Duration;

use pretty_assertions::assert_eq;
use reelgrid_core::event::InputEvent;
use reelgrid_core::geometry::{Point, Size};
use reelgrid_core::grid::{GridLayout, TileId};
use reelgrid_core::wrap::wrap;
use reelgrid_runtime::{
    ClickOutcome, IgnoreReason, LiveTween, Navigator, NavigatorConfig, ObserverOutcome,
    SavedPanState, SimulatedScene, ZoomPhase,
};

const MS_16: Duration = Duration::from_millis(16);
const TILE_A: TileId = TileId::new(0, 1);
const TILE_B: TileId = TileId::new(0, 6);

struct Harness {
    nav: Navigator<SimulatedScene>,
    now: Duration,
}

impl Harness {
    fn new() -> Self {
        let scene = SimulatedScene::new(
            GridLayout::new(8, 4, 3),
            Size::new(1200.0, 800.0),
            Size::new(160.0, 240.0),
        );
        let nav = Navigator::mount(scene, 8, NavigatorConfig::default(), Duration::ZERO)
            .expect("mount");
        Self {
            nav,
            now: Duration::ZERO,
        }
    }

    fn frames(&mut self, n: u32) {
        for _ in 0..n {
            self.now += MS_16;
            self.nav.frame(self.now);
        }
    }

    fn frames_until(&mut self, done: impl Fn(&Navigator<SimulatedScene>) -> bool) {
        for _ in 0..1000 {
            if done(&self.nav) {
                return;
            }
            self.frames(1);
        }
        panic!("condition not reached; phase = {:?}", self.nav.phase());
    }

    fn click_tile(&mut self, tile: TileId) -> ClickOutcome {
        let at = self.nav.host().tile_center(tile).expect("tile exists");
        self.nav.click(at)
    }

    fn click_outside(&mut self) -> ClickOutcome {
        self.nav.click(Point::new(1.0, 1.0))
    }

    /// Pan by a settled amount so the saved state is non-trivial.
    fn pan_settled(&mut self, dx: f64, dy: f64) {
        self.nav.handle_input(InputEvent::wheel(dx, dy));
        self.frames(120);
    }

    fn focus(&mut self, tile: TileId) {
        assert_eq!(self.click_tile(tile), ClickOutcome::ZoomIn(tile));
        self.frames_until(|n| n.phase() == ZoomPhase::Focused { tile });
    }

    /// Zoom out and stop on the frame the transition completes.
    fn zoom_out_to_idle(&mut self) {
        assert_eq!(self.click_outside(), ClickOutcome::ZoomOut);
        self.frames_until(|n| n.phase() == ZoomPhase::Idle);
    }

    fn wrapped(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let g = self.nav.geometry();
        (wrap(-g.cell_width, 0.0, x), wrap(-g.cell_height, 0.0, y))
    }
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

// ── Re-entrant clicks ───────────────────────────────────────────────────

#[test]
fn second_tile_during_zoom_in_redirects_without_jump() {
    let mut h = Harness::new();
    h.pan_settled(-40.0, 25.0);
    let original = h.nav.accumulator();

    assert_eq!(h.click_tile(TILE_A), ClickOutcome::ZoomIn(TILE_A));
    h.frames(10);

    let before = h.nav.camera();
    assert_eq!(h.click_tile(TILE_B), ClickOutcome::ZoomIn(TILE_B));
    let after = h.nav.camera();
    for p in [Point::ZERO, Point::new(320.0, 240.0), Point::new(1000.0, 900.0)] {
        assert!(close(before.screen_point(p, Point::ZERO), after.screen_point(p, Point::ZERO)));
    }

    assert_eq!(h.nav.phase(), ZoomPhase::ZoomingIn { tile: TILE_B });
    assert_eq!(h.nav.live_tween(), Some(LiveTween::Zoom));
    assert!(!h.nav.observer_attached());
    let (sx, sy) = h.wrapped(original);
    assert_eq!(h.nav.saved_pan(), Some(SavedPanState { x: sx, y: sy }));

    h.frames_until(|n| n.phase() == ZoomPhase::Focused { tile: TILE_B });
    let rect = h.nav.host().tile_screen_rect(TILE_B).unwrap();
    assert!((rect.height - 560.0).abs() < 1e-6);
    assert!(close(rect.center(), Point::new(600.0, 400.0)));

    h.zoom_out_to_idle();
    assert_eq!(h.nav.accumulator(), h.wrapped(original));
}

#[test]
fn same_tile_during_zoom_in_is_ignored() {
    let mut h = Harness::new();
    h.click_tile(TILE_A);
    h.frames(5);
    assert_eq!(
        h.click_tile(TILE_A),
        ClickOutcome::Ignored(IgnoreReason::InTransition)
    );
    assert_eq!(h.nav.phase(), ZoomPhase::ZoomingIn { tile: TILE_A });
}

#[test]
fn focused_tile_click_is_ignored() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    assert_eq!(h.click_tile(TILE_A), ClickOutcome::Ignored(IgnoreReason::SameTile));
    assert_eq!(h.nav.focused_tile(), Some(TILE_A));
}

#[test]
fn clicks_during_zoom_out_are_ignored() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    assert_eq!(h.click_outside(), ClickOutcome::ZoomOut);
    h.frames(5);
    assert_eq!(
        h.click_tile(TILE_B),
        ClickOutcome::Ignored(IgnoreReason::InTransition)
    );
    assert_eq!(h.nav.phase(), ZoomPhase::ZoomingOut { tile: TILE_A });
}

// ── Host interrupts ─────────────────────────────────────────────────────

#[test]
fn interrupt_during_zoom_in_resumes_panning_at_once() {
    let mut h = Harness::new();
    h.pan_settled(130.0, -70.0);
    let original = h.nav.accumulator();
    h.click_tile(TILE_A);
    h.frames(10);

    h.nav.interrupt();
    assert_eq!(h.nav.phase(), ZoomPhase::Idle);
    assert!(h.nav.observer_attached());
    assert_eq!(h.nav.saved_pan(), None);
    assert_eq!(h.nav.accumulator(), h.wrapped(original));
    assert_eq!(h.nav.live_tween(), None);

    let cam = h.nav.camera();
    assert_eq!(cam.scale, 1.0);
    assert_eq!(cam.origin, Point::ZERO);
    let (x, y) = h.wrapped(original);
    assert!((cam.x - x).abs() < 1e-9 && (cam.y - y).abs() < 1e-9);
}

#[test]
fn interrupt_during_zoom_out_completes_it() {
    let mut h = Harness::new();
    h.pan_settled(55.0, 10.0);
    let original = h.nav.accumulator();
    h.focus(TILE_A);
    h.click_outside();
    h.frames(5);

    h.nav.interrupt();
    assert_eq!(h.nav.phase(), ZoomPhase::Idle);
    assert_eq!(h.nav.accumulator(), h.wrapped(original));
    assert_eq!(h.nav.camera().scale, 1.0);
    // Re-attachment still waits for its frame and delay.
    assert!(!h.nav.observer_attached());
    h.frames(13);
    assert!(h.nav.observer_attached());
}

#[test]
fn interrupt_outside_transitions_is_a_no_op() {
    let mut h = Harness::new();
    h.nav.interrupt();
    assert_eq!(h.nav.phase(), ZoomPhase::Idle);
    assert!(h.nav.observer_attached());

    h.focus(TILE_A);
    let cam = h.nav.camera();
    h.nav.interrupt();
    assert_eq!(h.nav.phase(), ZoomPhase::Focused { tile: TILE_A });
    assert_eq!(h.nav.camera(), cam);
}

// ── Deferred re-attachment ──────────────────────────────────────────────

#[test]
fn reattach_waits_one_frame_then_delay() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    h.zoom_out_to_idle();
    assert!(!h.nav.observer_attached());

    // One frame (16 ms) plus 180 ms: 196 ms, first reached on frame 13.
    h.frames(12);
    assert!(!h.nav.observer_attached());
    assert_eq!(
        h.nav.handle_input(InputEvent::wheel(10.0, 10.0)),
        ObserverOutcome::Detached
    );
    h.frames(1);
    assert!(h.nav.observer_attached());
}

#[test]
fn ghost_events_after_reattach_are_swallowed() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    h.zoom_out_to_idle();
    h.frames_until(|n| n.observer_attached());
    let acc = h.nav.accumulator();

    let ev = InputEvent::wheel(30.0, 0.0);
    assert_eq!(h.nav.handle_input(ev), ObserverOutcome::GhostSwallowed);
    assert_eq!(h.nav.handle_input(ev), ObserverOutcome::GhostSwallowed);
    assert_eq!(h.nav.accumulator(), acc);
    assert!(h.nav.handle_input(ev).is_accepted());
    assert_eq!(h.nav.accumulator(), (acc.0 - 30.0, acc.1));
}

#[test]
fn ghost_window_expires() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    h.zoom_out_to_idle();
    h.frames_until(|n| n.observer_attached());
    h.frames(16);
    assert!(h.nav.handle_input(InputEvent::touch(5.0, 5.0)).is_accepted());
}

#[test]
fn zoom_in_cancels_pending_reattach() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    h.zoom_out_to_idle();
    h.frames(5);
    assert!(!h.nav.observer_attached());

    assert_eq!(h.click_tile(TILE_B), ClickOutcome::ZoomIn(TILE_B));
    // Well past the original re-attach deadline.
    for _ in 0..60 {
        h.frames(1);
        assert!(!h.nav.observer_attached());
        assert!(!h.nav.phase().is_idle());
    }
    assert_eq!(h.nav.phase(), ZoomPhase::Focused { tile: TILE_B });
}

// ── Resizes mid-transition ──────────────────────────────────────────────

#[test]
fn resize_during_zoom_in_retargets() {
    let mut h = Harness::new();
    h.click_tile(TILE_A);
    h.frames(10);

    h.nav.host_mut().set_viewport(Size::new(1200.0, 1600.0));
    h.nav.resize(h.now);
    assert_eq!(h.nav.phase(), ZoomPhase::ZoomingIn { tile: TILE_A });

    h.frames_until(|n| n.phase() == ZoomPhase::Focused { tile: TILE_A });
    let rect = h.nav.host().tile_screen_rect(TILE_A).unwrap();
    assert!((rect.height - 0.7 * 1600.0).abs() < 1e-6);
    assert!(close(rect.center(), Point::new(600.0, 800.0)));
}

#[test]
fn resize_during_zoom_out_still_lands_on_saved_pan() {
    let mut h = Harness::new();
    h.pan_settled(-300.0, 90.0);
    let original = h.nav.accumulator();
    h.focus(TILE_A);
    h.click_outside();
    h.frames(10);

    h.nav.host_mut().set_viewport(Size::new(900.0, 700.0));
    h.nav.resize(h.now);
    assert_eq!(h.nav.phase(), ZoomPhase::ZoomingOut { tile: TILE_A });

    h.frames_until(|n| n.phase() == ZoomPhase::Idle);
    assert_eq!(h.nav.accumulator(), h.wrapped(original));
    assert_eq!(h.nav.camera().scale, 1.0);
}

// ── Detached container ──────────────────────────────────────────────────

#[test]
fn detached_container_freezes_output() {
    let mut h = Harness::new();
    h.focus(TILE_A);
    h.nav.host_mut().detach();
    let applied = h.nav.host().apply_count();

    assert_eq!(h.click_outside(), ClickOutcome::Ignored(IgnoreReason::Detached));
    h.nav.resize(h.now);
    h.frames(20);
    assert_eq!(h.nav.host().apply_count(), applied);
    assert_eq!(h.nav.phase(), ZoomPhase::Focused { tile: TILE_A });

    h.nav.host_mut().reattach();
    assert_eq!(h.click_outside(), ClickOutcome::ZoomOut);
}

#[test]
fn geometry_survives_unmeasurable_content() {
    let mut h = Harness::new();
    let g = h.nav.geometry();
    h.nav.host_mut().set_content_measurable(false);
    h.nav.content_resized();
    h.nav.resize(h.now);
    assert_eq!(h.nav.geometry(), g);
}
