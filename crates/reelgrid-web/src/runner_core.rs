#![forbid(unsafe_code)]

//! Platform-independent grid runner wrapping `Navigator<H>`.
//!
//! This module holds everything the `wasm-bindgen` exports need that does
//! not touch JS types: media list parsing, layout selection, tap-versus-drag
//! click suppression, per-tile lazy-load bookkeeping, and debug snapshots.
//! Native tests drive it through `SimulatedScene`.

use core::time::Duration;
use std::collections::HashSet;

use reelgrid_core::event::InputEvent;
use reelgrid_core::geometry::Point;
use reelgrid_core::gesture::TapDetector;
use reelgrid_core::grid::{GridLayout, TileId, optimal_grid_cols_with};
use reelgrid_core::media::{LoadStage, MediaItem, TileMedia};
use reelgrid_runtime::{
    ClickOutcome, ConfigError, MountError, Navigator, NavigatorConfig, ObserverOutcome, SceneHost,
};
use serde::Serialize;

/// Why a runner could not be built.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The media list was not a JSON array of `{src, thumb}` objects.
    #[error("media list parse failed: {0}")]
    Media(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mount(#[from] MountError),
    /// The host could not build its scene.
    #[error("scene setup failed: {0}")]
    Host(String),
}

/// Parse the media list handed over by the content source.
pub fn parse_items(items_json: &str) -> Result<Vec<MediaItem>, RunnerError> {
    Ok(serde_json::from_str(items_json)?)
}

/// Grid layout for `item_count` items under `config`.
#[must_use]
pub fn layout_for(item_count: usize, config: &NavigatorConfig) -> GridLayout {
    GridLayout::new(
        item_count,
        optimal_grid_cols_with(item_count, &config.grid.column_preferences),
        config.grid.duplicates,
    )
}

/// Host timestamp in milliseconds to a [`Duration`].
///
/// Non-finite and negative timestamps clamp to zero.
pub fn duration_from_ms(ts_ms: f64) -> Duration {
    if !ts_ms.is_finite() || ts_ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(ts_ms.min(u64::MAX as f64 / 1000.0) / 1000.0)
}

/// A mounted grid, or the empty state.
pub enum GridRunner<H> {
    /// No media: the host shows a placeholder and nothing is mounted.
    Empty,
    Live(Box<LiveGrid<H>>),
}

/// Navigator plus the per-tile state the binding layer keeps.
pub struct LiveGrid<H> {
    nav: Navigator<H>,
    layout: GridLayout,
    items: Vec<MediaItem>,
    /// Loading state per item index, shared by all copies of that item.
    media: Vec<TileMedia>,
    /// Tiles currently intersecting the viewport.
    visible: HashSet<TileId>,
    tap: TapDetector,
    /// Set when the last pointer gesture was a drag; eats the next click.
    suppress_click: bool,
}

/// Notification from the scene's DOM observers, queued until the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostSignal {
    /// Intersection change for one tile.
    TileVisibility { tile: TileId, visible: bool },
    /// `loadedmetadata` with the intrinsic video size.
    TileMetadata { tile: TileId, width: u32, height: u32 },
    /// `loadeddata`: the first frame is decoded.
    TileFirstFrame(TileId),
    /// The primary content block changed size.
    ContentResized,
}

/// DOM change the host should make after a [`HostSignal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileUpdate {
    /// Toggle the tile's visible marker; attach `source` to every copy of
    /// the item when present.
    Visibility {
        tile: TileId,
        visible: bool,
        source: Option<String>,
    },
    /// Size every copy of `index` to the intrinsic aspect ratio.
    Aspect { index: usize, width: u32, height: u32 },
    /// Loading stage changed for a tile.
    Stage { tile: TileId, stage: LoadStage },
}

/// Debug view of the runner state, serialized by [`GridRunner::snapshot_json`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSnapshot {
    pub phase: &'static str,
    pub tile: Option<[usize; 2]>,
    pub cols: usize,
    pub items: usize,
    pub transform: String,
    pub transform_origin: String,
    pub scale: f64,
    pub accumulator: [f64; 2],
    pub cell: [f64; 2],
    pub observer_attached: bool,
    pub visible_tiles: usize,
    pub loaded_items: usize,
    pub playing_items: usize,
}

impl<H: SceneHost> GridRunner<H> {
    /// Parse `items_json`, build the host for the resulting layout, and
    /// mount.
    ///
    /// `build_host` is only called when there is at least one item.
    pub fn from_json<F>(
        items_json: &str,
        config: NavigatorConfig,
        now: Duration,
        build_host: F,
    ) -> Result<Self, RunnerError>
    where
        F: FnOnce(&GridLayout, &[MediaItem]) -> Result<H, RunnerError>,
    {
        let items = parse_items(items_json)?;
        if items.is_empty() {
            tracing::debug!(target: "reelgrid.geometry", "empty media list; rendering placeholder");
            return Ok(Self::Empty);
        }
        let layout = layout_for(items.len(), &config);
        let host = build_host(&layout, &items)?;
        Self::mount(host, layout, items, config, now)
    }

    /// Mount over an already built host.
    pub fn mount(
        host: H,
        layout: GridLayout,
        items: Vec<MediaItem>,
        config: NavigatorConfig,
        now: Duration,
    ) -> Result<Self, RunnerError> {
        if items.is_empty() {
            return Ok(Self::Empty);
        }
        let tap = TapDetector::new(config.grid.tap_threshold_px);
        let nav = Navigator::mount(host, items.len(), config, now)?;
        let media = items.iter().map(TileMedia::for_item).collect();
        Ok(Self::Live(Box::new(LiveGrid {
            nav,
            layout,
            items,
            media,
            visible: HashSet::new(),
            tap,
            suppress_click: false,
        })))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Column count; the empty placeholder spans one column.
    pub fn cols(&self) -> usize {
        match self {
            Self::Empty => 1,
            Self::Live(grid) => grid.layout.cols(),
        }
    }

    pub fn layout(&self) -> Option<&GridLayout> {
        self.live().map(|grid| &grid.layout)
    }

    pub fn navigator(&self) -> Option<&Navigator<H>> {
        self.live().map(|grid| &grid.nav)
    }

    pub fn navigator_mut(&mut self) -> Option<&mut Navigator<H>> {
        self.live_mut().map(|grid| &mut grid.nav)
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.live().and_then(|grid| grid.items.get(index))
    }

    pub fn tile_media(&self, index: usize) -> Option<&TileMedia> {
        self.live().and_then(|grid| grid.media.get(index))
    }

    pub fn is_tile_visible(&self, tile: TileId) -> bool {
        self.live().is_some_and(|grid| grid.visible.contains(&tile))
    }

    fn has_tile(&self, tile: TileId) -> bool {
        self.layout()
            .is_some_and(|l| tile.block < l.block_count() && tile.index < l.item_count())
    }

    fn live(&self) -> Option<&LiveGrid<H>> {
        match self {
            Self::Empty => None,
            Self::Live(grid) => Some(grid.as_ref()),
        }
    }

    fn live_mut(&mut self) -> Option<&mut LiveGrid<H>> {
        match self {
            Self::Empty => None,
            Self::Live(grid) => Some(grid.as_mut()),
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn wheel(&mut self, dx: f64, dy: f64) -> ObserverOutcome {
        self.input(InputEvent::wheel(dx, dy))
    }

    pub fn touch(&mut self, dx: f64, dy: f64) -> ObserverOutcome {
        self.input(InputEvent::touch(dx, dy))
    }

    fn input(&mut self, event: InputEvent) -> ObserverOutcome {
        match self.live_mut() {
            Some(grid) => grid.nav.handle_input(event),
            None => ObserverOutcome::Detached,
        }
    }

    pub fn pointer_down(&mut self, pos: Point) {
        if let Some(grid) = self.live_mut() {
            grid.tap.pointer_down(pos);
            grid.suppress_click = false;
        }
    }

    /// Pointer moved to `pos` by `(dx, dy)` since the last move. Only a
    /// held press pans; hovering is `NoChange`.
    pub fn pointer_move(&mut self, pos: Point, dx: f64, dy: f64) -> ObserverOutcome {
        let Some(grid) = self.live_mut() else {
            return ObserverOutcome::Detached;
        };
        if !grid.tap.is_pressed() {
            return ObserverOutcome::NoChange;
        }
        grid.tap.pointer_move(pos);
        grid.nav.handle_input(InputEvent::pointer(dx, dy))
    }

    /// Pointer released. Returns `true` for a tap; after a drag the next
    /// click is suppressed.
    pub fn pointer_up(&mut self, pos: Point) -> bool {
        let Some(grid) = self.live_mut() else {
            return false;
        };
        let was_pressed = grid.tap.is_pressed();
        let tap = grid.tap.pointer_up(pos).is_some();
        grid.suppress_click = was_pressed && !tap;
        if grid.suppress_click {
            tracing::trace!(target: "reelgrid.observer", "drag ended; next click suppressed");
        }
        tap
    }

    /// A click at a screen point. `None` when the click ended a drag or
    /// there is no grid.
    pub fn click(&mut self, pos: Point) -> Option<ClickOutcome> {
        let grid = self.live_mut()?;
        if std::mem::take(&mut grid.suppress_click) {
            return None;
        }
        Some(grid.nav.click(pos))
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn resize(&mut self, now: Duration) {
        if let Some(grid) = self.live_mut() {
            grid.nav.resize(now);
        }
    }

    pub fn content_resized(&mut self) {
        if let Some(grid) = self.live_mut() {
            grid.nav.content_resized();
        }
    }

    pub fn frame(&mut self, now: Duration) {
        if let Some(grid) = self.live_mut() {
            grid.nav.frame(now);
        }
    }

    pub fn interrupt(&mut self) {
        if let Some(grid) = self.live_mut() {
            grid.nav.interrupt();
        }
    }

    pub fn teardown(&mut self) {
        if let Some(grid) = self.live_mut() {
            grid.nav.teardown();
            grid.visible.clear();
        }
    }

    // -----------------------------------------------------------------------
    // Tile media
    // -----------------------------------------------------------------------

    /// Intersection change for one tile. Returns `true` when the tile's
    /// item should have its source attached.
    pub fn tile_visibility(&mut self, tile: TileId, visible: bool) -> bool {
        let Some(grid) = self.live_mut() else {
            return false;
        };
        if tile.block >= grid.layout.block_count() {
            return false;
        }
        let Some(media) = grid.media.get_mut(tile.index) else {
            return false;
        };
        media.on_visibility(visible);
        if visible {
            grid.visible.insert(tile);
        } else {
            grid.visible.remove(&tile);
        }
        media.should_load()
    }

    /// Intrinsic dimensions arrived. The tile may resize, so geometry is
    /// re-measured. Returns the aspect ratio once known.
    pub fn tile_metadata(&mut self, tile: TileId, width: u32, height: u32) -> Option<(u32, u32)> {
        let grid = self.live_mut()?;
        let media = grid.media.get_mut(tile.index)?;
        media.on_metadata(width, height);
        let aspect = media.aspect_ratio();
        grid.nav.content_resized();
        aspect
    }

    /// First frame decoded. Returns whether the poster should still show.
    pub fn tile_first_frame(&mut self, tile: TileId) -> bool {
        let Some(grid) = self.live_mut() else {
            return false;
        };
        match grid.media.get_mut(tile.index) {
            Some(media) => {
                media.on_first_frame();
                media.show_poster()
            }
            None => false,
        }
    }

    /// Apply one queued observer notification.
    pub fn apply_signal(&mut self, signal: HostSignal) -> Option<TileUpdate> {
        match signal {
            HostSignal::TileVisibility { tile, visible } => {
                if !self.has_tile(tile) {
                    return None;
                }
                let was_loading = self.tile_media(tile.index).is_some_and(TileMedia::should_load);
                let load = self.tile_visibility(tile, visible);
                let source = (load && !was_loading)
                    .then(|| self.item(tile.index).map(|item| item.source_url.clone()))
                    .flatten();
                Some(TileUpdate::Visibility {
                    tile,
                    visible,
                    source,
                })
            }
            HostSignal::TileMetadata {
                tile,
                width,
                height,
            } => self
                .tile_metadata(tile, width, height)
                .map(|(width, height)| TileUpdate::Aspect {
                    index: tile.index,
                    width,
                    height,
                }),
            HostSignal::TileFirstFrame(tile) => {
                self.tile_first_frame(tile);
                let stage = self.tile_media(tile.index)?.stage();
                Some(TileUpdate::Stage { tile, stage })
            }
            HostSignal::ContentResized => {
                self.content_resized();
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Debugging
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> Option<RunnerSnapshot> {
        let grid = self.live()?;
        let nav = &grid.nav;
        let camera = nav.camera();
        let (ax, ay) = nav.accumulator();
        let geometry = nav.geometry();
        Some(RunnerSnapshot {
            phase: nav.phase().name(),
            tile: nav.phase().tile().map(|t| [t.block, t.index]),
            cols: grid.layout.cols(),
            items: grid.items.len(),
            transform: camera.css(),
            transform_origin: camera.origin_css(),
            scale: camera.scale,
            accumulator: [ax, ay],
            cell: [geometry.cell_width, geometry.cell_height],
            observer_attached: nav.observer_attached(),
            visible_tiles: grid.visible.len(),
            loaded_items: grid
                .media
                .iter()
                .filter(|m| m.stage() != LoadStage::Deferred)
                .count(),
            playing_items: grid
                .media
                .iter()
                .filter(|m| m.stage() == LoadStage::Playing)
                .count(),
        })
    }

    /// Snapshot as JSON; `{"phase":"empty"}` for the placeholder.
    pub fn snapshot_json(&self) -> Result<String, RunnerError> {
        match self.snapshot() {
            Some(snapshot) => Ok(serde_json::to_string(&snapshot)?),
            None => Ok(r#"{"phase":"empty"}"#.to_owned()),
        }
    }
}
