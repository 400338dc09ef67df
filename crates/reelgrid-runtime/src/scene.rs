#![forbid(unsafe_code)]

//! The host surface the navigator draws on.
//!
//! A [`SceneHost`] exposes exactly the handles the navigator needs, resolved
//! once when the host is built: the viewport, the grid container, the
//! primary content block, and tile lookup. Every query can report that the
//! underlying node is gone, and the navigator treats that as "do nothing
//! this frame".

use reelgrid_core::geometry::{Point, Rect, Size};
use reelgrid_core::grid::TileId;

use crate::camera::CameraTransform;

/// Host-side view of the rendered grid.
pub trait SceneHost {
    /// Viewport size (`innerWidth` × `innerHeight`).
    fn viewport(&self) -> Size;

    /// Untransformed layout origin of the grid container on screen, or
    /// `None` if the container is no longer attached.
    fn container_origin(&self) -> Option<Point>;

    /// Layout size of the primary content block, or `None` if it cannot be
    /// measured.
    fn content_size(&self) -> Option<Size>;

    /// On-screen rect of a tile under the current transform, or `None` if
    /// the tile is gone.
    fn tile_client_rect(&self, tile: TileId) -> Option<Rect>;

    /// The tile under a screen point, if any.
    fn tile_at(&self, point: Point) -> Option<TileId>;

    /// Write the container transform and transform origin.
    fn apply_transform(&mut self, transform: &CameraTransform);
}

#[cfg(feature = "test-helpers")]
pub use simulated::SimulatedScene;

#[cfg(feature = "test-helpers")]
mod simulated {
    use reelgrid_core::geometry::{Point, Rect, Size};
    use reelgrid_core::grid::{GridLayout, TileId};

    use super::SceneHost;
    use crate::camera::CameraTransform;

    /// In-memory scene: a [`GridLayout`] of fixed-size slots projected
    /// through the last applied transform.
    ///
    /// Each item sits at the top-left of its slot with its own size, so
    /// tests can mix portrait and landscape tiles.
    #[derive(Debug, Clone)]
    pub struct SimulatedScene {
        layout: GridLayout,
        viewport: Size,
        container_origin: Point,
        slot: Size,
        tile_sizes: Vec<Size>,
        attached: bool,
        content_measurable: bool,
        transform: CameraTransform,
        applied: usize,
    }

    impl SimulatedScene {
        /// `item_count` items, every tile filling its `slot`.
        pub fn new(layout: GridLayout, viewport: Size, slot: Size) -> Self {
            let tile_sizes = vec![slot; layout.item_count()];
            Self {
                layout,
                viewport,
                container_origin: Point::ZERO,
                slot,
                tile_sizes,
                attached: true,
                content_measurable: true,
                transform: CameraTransform::IDENTITY,
                applied: 0,
            }
        }

        #[must_use]
        pub fn with_container_origin(mut self, origin: Point) -> Self {
            self.container_origin = origin;
            self
        }

        #[must_use]
        pub fn with_tile_size(mut self, index: usize, size: Size) -> Self {
            if let Some(slot) = self.tile_sizes.get_mut(index) {
                *slot = size;
            }
            self
        }

        pub fn layout(&self) -> &GridLayout {
            &self.layout
        }

        pub fn set_viewport(&mut self, viewport: Size) {
            self.viewport = viewport;
        }

        /// Change the slot size, as a content reflow would.
        pub fn set_slot(&mut self, slot: Size) {
            self.slot = slot;
        }

        /// Simulate the container being removed from the document.
        pub fn detach(&mut self) {
            self.attached = false;
        }

        pub fn reattach(&mut self) {
            self.attached = true;
        }

        /// Simulate layout not being available yet.
        pub fn set_content_measurable(&mut self, measurable: bool) {
            self.content_measurable = measurable;
        }

        /// Last transform written by the navigator.
        pub fn transform(&self) -> CameraTransform {
            self.transform
        }

        /// Number of `apply_transform` calls so far.
        pub fn apply_count(&self) -> usize {
            self.applied
        }

        pub fn block_size(&self) -> Size {
            Size::new(
                self.layout.cols() as f64 * self.slot.width,
                self.layout.rows() as f64 * self.slot.height,
            )
        }

        /// Tile rect in container-local coordinates.
        pub fn tile_local_rect(&self, tile: TileId) -> Option<Rect> {
            if tile.block >= self.layout.block_count() {
                return None;
            }
            let size = *self.tile_sizes.get(tile.index)?;
            let block = self.layout.block_origin(tile.block, self.block_size());
            let (col, row) = self.layout.cell_of(tile.index);
            Some(Rect::new(
                block.x + col as f64 * self.slot.width,
                block.y + row as f64 * self.slot.height,
                size.width,
                size.height,
            ))
        }

        /// Tile rect on screen under the last applied transform, regardless
        /// of attachment.
        pub fn tile_screen_rect(&self, tile: TileId) -> Option<Rect> {
            let local = self.tile_local_rect(tile)?;
            Some(self.transform.screen_rect(local, self.container_origin))
        }

        /// Screen center of a tile, handy for clicking it.
        pub fn tile_center(&self, tile: TileId) -> Option<Point> {
            self.tile_screen_rect(tile).map(|r| r.center())
        }
    }

    impl SceneHost for SimulatedScene {
        fn viewport(&self) -> Size {
            self.viewport
        }

        fn container_origin(&self) -> Option<Point> {
            self.attached.then_some(self.container_origin)
        }

        fn content_size(&self) -> Option<Size> {
            (self.attached && self.content_measurable).then(|| self.block_size())
        }

        fn tile_client_rect(&self, tile: TileId) -> Option<Rect> {
            if !self.attached {
                return None;
            }
            self.tile_screen_rect(tile)
        }

        fn tile_at(&self, point: Point) -> Option<TileId> {
            if !self.attached {
                return None;
            }
            // Later tiles paint on top.
            let tiles: Vec<TileId> = self.layout.tiles().collect();
            tiles.into_iter().rev().find(|tile| {
                self.tile_screen_rect(*tile)
                    .is_some_and(|rect| rect.contains(point))
            })
        }

        fn apply_transform(&mut self, transform: &CameraTransform) {
            self.transform = *transform;
            self.applied += 1;
        }
    }

}
