//! Navigator properties under simulated interaction.
//!
//! 1. Mutual exclusion: no pan input reaches the accumulators while zoomed
//!    or mid-transition
//! 2. Round trip: zoom-in then zoom-out restores the wrapped accumulator
//! 3. Single active tween: a zoom-in started during a pan glide leaves only
//!    the zoom tween
//! 4. Resize while focused keeps the tile centered at 70% of the new
//!    viewport height
//!
//! Run:
//!   cargo test -p reelgrid-runtime --test navigator_properties

use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use reelgrid_core::event::InputEvent;
use reelgrid_core::geometry::{Point, Rect, Size};
use reelgrid_core::grid::{GridLayout, TileId};
use reelgrid_core::wrap::wrap;
use reelgrid_runtime::{
    ClickOutcome, LiveTween, Navigator, NavigatorConfig, ObserverOutcome, SimulatedScene, ZoomPhase,
};

const MS_16: Duration = Duration::from_millis(16);
const VIEWPORT: Size = Size {
    width: 1200.0,
    height: 800.0,
};
const SLOT: Size = Size {
    width: 160.0,
    height: 240.0,
};

// ── Harness ─────────────────────────────────────────────────────────────

struct Harness {
    nav: Navigator<SimulatedScene>,
    now: Duration,
}

impl Harness {
    fn new() -> Self {
        Self::with_scene(SimulatedScene::new(GridLayout::new(8, 4, 3), VIEWPORT, SLOT))
    }

    fn with_scene(scene: SimulatedScene) -> Self {
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

    /// Run frames until `done` holds, with a generous cap.
    fn frames_until(&mut self, done: impl Fn(&Navigator<SimulatedScene>) -> bool) {
        for _ in 0..1000 {
            if done(&self.nav) {
                return;
            }
            self.frames(1);
        }
        panic!("condition not reached; phase = {:?}", self.nav.phase());
    }

    /// A tile whose center is inside the viewport.
    fn visible_tile(&self) -> (TileId, Point) {
        let scene = self.nav.host();
        let view = Rect::new(0.0, 0.0, VIEWPORT.width, VIEWPORT.height);
        scene
            .layout()
            .tiles()
            .find_map(|tile| {
                let c = scene.tile_center(tile)?;
                view.contains(c).then_some((tile, c))
            })
            .expect("some tile is visible")
    }

    fn zoom_into_visible(&mut self) -> TileId {
        let (tile, at) = self.visible_tile();
        assert_eq!(self.nav.click(at), ClickOutcome::ZoomIn(tile));
        tile
    }

    fn settle_focused(&mut self) {
        self.frames_until(|n| matches!(n.phase(), ZoomPhase::Focused { .. }));
    }

    fn settle_idle_attached(&mut self) {
        self.frames_until(|n| n.phase() == ZoomPhase::Idle && n.observer_attached());
    }

    fn pan(&mut self, events: &[InputEvent]) {
        for ev in events {
            self.nav.handle_input(*ev);
            self.frames(1);
        }
    }
}

fn event_strategy() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        (-400i32..400, -400i32..400).prop_map(|(x, y)| InputEvent::wheel(x as f64, y as f64)),
        (-200i32..200, -200i32..200).prop_map(|(x, y)| InputEvent::touch(x as f64, y as f64)),
        (-200i32..200, -200i32..200).prop_map(|(x, y)| InputEvent::pointer(x as f64, y as f64)),
    ]
}

// ── Mutual exclusion ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn input_never_reaches_accumulator_while_zoomed(
        before in prop::collection::vec(event_strategy(), 0..8),
        during_in in prop::collection::vec(event_strategy(), 0..20),
        during_focus in prop::collection::vec(event_strategy(), 0..20),
        during_out in prop::collection::vec(event_strategy(), 0..20),
    ) {
        let mut h = Harness::new();
        h.pan(&before);
        let baseline = h.nav.accumulator();

        h.zoom_into_visible();
        for ev in &during_in {
            prop_assert_eq!(h.nav.handle_input(*ev), ObserverOutcome::Detached);
        }
        prop_assert_eq!(h.nav.accumulator(), baseline);

        h.settle_focused();
        for ev in &during_focus {
            prop_assert_eq!(h.nav.handle_input(*ev), ObserverOutcome::Detached);
            h.frames(1);
        }
        prop_assert_eq!(h.nav.accumulator(), baseline);

        prop_assert_eq!(h.nav.click(Point::new(1.0, 1.0)), ClickOutcome::ZoomOut);
        for ev in &during_out {
            prop_assert_eq!(h.nav.handle_input(*ev), ObserverOutcome::Detached);
            h.frames(1);
        }
        prop_assert!(h.nav.phase().is_transitioning() || !h.nav.observer_attached());
    }

    #[test]
    fn zoom_round_trip_restores_wrapped_accumulator(
        events in prop::collection::vec(event_strategy(), 1..12),
        settle in any::<bool>(),
    ) {
        let mut h = Harness::new();
        h.pan(&events);
        if settle {
            h.frames(120);
        }
        let (ax, ay) = h.nav.accumulator();
        let g = h.nav.geometry();

        h.zoom_into_visible();
        h.settle_focused();
        prop_assert_eq!(h.nav.click(Point::new(1.0, 1.0)), ClickOutcome::ZoomOut);
        h.frames_until(|n| n.phase() == ZoomPhase::Idle);

        let expected = (wrap(-g.cell_width, 0.0, ax), wrap(-g.cell_height, 0.0, ay));
        prop_assert_eq!(h.nav.accumulator(), expected);
        let cam = h.nav.camera();
        prop_assert_eq!(cam.scale, 1.0);
        prop_assert_eq!((cam.x, cam.y), expected);
        prop_assert_eq!(cam.origin, Point::ZERO);
    }
}

// ── Single active tween ─────────────────────────────────────────────────

#[test]
fn zoom_in_during_pan_glide_leaves_one_tween() {
    let mut h = Harness::new();
    h.nav.handle_input(InputEvent::wheel(300.0, 200.0));
    h.frames(3);
    assert_eq!(h.nav.live_tween(), Some(LiveTween::PanSmoothing));

    let before = h.nav.camera();
    h.zoom_into_visible();
    assert_eq!(h.nav.live_tween(), Some(LiveTween::Zoom));
    assert!(!h.nav.observer_attached());

    // The glide was killed: the zoom starts exactly where the pan stood.
    let after = h.nav.camera();
    let c0 = Point::ZERO;
    for p in [Point::ZERO, Point::new(500.0, 700.0)] {
        let a = before.screen_point(p, c0);
        let b = after.screen_point(p, c0);
        assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    }

    h.settle_focused();
    assert_eq!(h.nav.live_tween(), None);
}

// ── Resize while focused ────────────────────────────────────────────────

#[test]
fn resize_while_focused_keeps_tile_centered_and_proportional() {
    let mut h = Harness::new();
    let tile = h.zoom_into_visible();
    h.settle_focused();

    let before = h.nav.host().tile_screen_rect(tile).unwrap();
    assert!((before.height - 0.7 * 800.0).abs() < 1e-6);
    let s0 = h.nav.camera().scale;

    h.nav.host_mut().set_viewport(Size::new(1200.0, 1600.0));
    h.nav.resize(h.now);

    assert_eq!(h.nav.phase(), ZoomPhase::Focused { tile });
    let s1 = h.nav.camera().scale;
    assert!((s1 / s0 - 2.0).abs() < 1e-9);

    let after = h.nav.host().tile_screen_rect(tile).unwrap();
    assert!((after.height - 0.7 * 1600.0).abs() < 1e-6);
    let center = after.center();
    assert!((center.x - 600.0).abs() < 1.0);
    assert!((center.y - 800.0).abs() < 1.0);
}

#[test]
fn landscape_tile_fills_width_across_resize() {
    let scene = (0..8).fold(
        SimulatedScene::new(GridLayout::new(8, 4, 3), VIEWPORT, SLOT),
        |scene, index| scene.with_tile_size(index, Size::new(160.0, 90.0)),
    );
    let mut h = Harness::with_scene(scene);
    let tile = h.zoom_into_visible();
    h.settle_focused();
    let r = h.nav.host().tile_screen_rect(tile).unwrap();
    assert!((r.width - 0.7 * 1200.0).abs() < 1e-6);

    h.nav.host_mut().set_viewport(Size::new(600.0, 800.0));
    h.nav.resize(h.now);
    let r = h.nav.host().tile_screen_rect(tile).unwrap();
    assert!((r.width - 0.7 * 600.0).abs() < 1e-6);
    assert!((r.center().x - 300.0).abs() < 1.0);
    assert!((r.center().y - 400.0).abs() < 1.0);
}

#[test]
fn full_cycle_reattaches_input() {
    let mut h = Harness::new();
    h.pan(&[InputEvent::touch(40.0, -25.0)]);
    h.zoom_into_visible();
    h.settle_focused();
    assert_eq!(h.nav.click(Point::new(1.0, 1.0)), ClickOutcome::ZoomOut);
    h.settle_idle_attached();
    assert_eq!(h.nav.live_tween(), None);
    assert_eq!(h.nav.saved_pan(), None);
}
