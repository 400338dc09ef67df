#![forbid(unsafe_code)]

//! Grid column selection and the duplicated block arrangement.
//!
//! The plane is one primary content block holding every media item, plus
//! duplicate blocks holding the same items, arranged 2×2. Because the
//! container offset is always wrapped into one block's width and height,
//! some copy of every tile is always under the viewport.
//!
//! # Invariants
//!
//! 1. `optimal_grid_cols(0) == 1`; the result never exceeds `max(n, 1)`.
//! 2. A preferred candidate that divides `n` evenly always wins over one
//!    that leaves empty cells.
//! 3. Block 0 is the primary block; blocks `1..=duplicates` are
//!    `aria-hidden` copies with identical tile order.

use crate::geometry::{Point, Size};
use crate::wrap::{WrappedOffset, wrap_offset};

/// Column candidates in visual preference order.
pub const DEFAULT_COLUMN_PREFERENCES: [usize; 7] = [4, 5, 3, 6, 2, 7, 8];

/// Number of duplicate blocks rendered after the primary block.
pub const DEFAULT_DUPLICATES: usize = 3;

/// Choose a column count for `n` items using [`DEFAULT_COLUMN_PREFERENCES`].
#[must_use]
pub fn optimal_grid_cols(n: usize) -> usize {
    optimal_grid_cols_with(n, &DEFAULT_COLUMN_PREFERENCES)
}

/// Choose a column count for `n` items from `preferences`.
///
/// The first candidate (no larger than `n`) that leaves no empty cells wins.
/// Otherwise the candidate with the fewest empty cells in the last row wins,
/// ties going to the earlier preference. With no usable candidate the result
/// is a single column.
#[must_use]
pub fn optimal_grid_cols_with(n: usize, preferences: &[usize]) -> usize {
    if n == 0 {
        return 1;
    }
    let usable = move || preferences.iter().copied().filter(move |&c| c > 0 && c <= n);

    if let Some(cols) = usable().find(|&c| n % c == 0) {
        return cols;
    }

    let mut best = 1;
    let mut min_empty = n;
    for cols in usable() {
        let empty = n.div_ceil(cols) * cols - n;
        if empty < min_empty {
            min_empty = empty;
            best = cols;
        }
    }
    best
}

/// Pixel size of one content block, the unit the wrap function folds into.
///
/// Zero until the primary block has been laid out with content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridGeometry {
    /// Not yet measured; wrapping is a no-op.
    pub const UNMEASURED: Self = Self {
        cell_width: 0.0,
        cell_height: 0.0,
    };

    #[inline]
    pub const fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    /// Build from a layout measurement. Missing or invalid sizes become
    /// [`GridGeometry::UNMEASURED`].
    #[must_use]
    pub fn from_measurement(size: Option<Size>) -> Self {
        match size {
            Some(size) if size.is_measured() => Self::new(size.width, size.height),
            _ => Self::UNMEASURED,
        }
    }

    #[inline]
    pub fn is_measured(&self) -> bool {
        self.cell_width > 0.0 && self.cell_height > 0.0
    }

    #[inline]
    pub fn cell(&self) -> Size {
        Size::new(self.cell_width, self.cell_height)
    }

    /// Wrap a raw horizontal offset into `[-cell_width, 0)`.
    #[inline]
    pub fn wrap_x(&self, raw: f64) -> WrappedOffset {
        wrap_offset(self.cell_width, raw)
    }

    /// Wrap a raw vertical offset into `[-cell_height, 0)`.
    #[inline]
    pub fn wrap_y(&self, raw: f64) -> WrappedOffset {
        wrap_offset(self.cell_height, raw)
    }
}

/// Identity of one rendered tile: which block, and which media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    /// 0 for the primary block, `1..=duplicates` for copies.
    pub block: usize,
    /// Index into the ordered media list.
    pub index: usize,
}

impl TileId {
    #[inline]
    pub const fn new(block: usize, index: usize) -> Self {
        Self { block, index }
    }

    #[inline]
    pub const fn is_primary(&self) -> bool {
        self.block == 0
    }
}

/// One content block in the rendered plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub id: usize,
}

impl Block {
    /// The primary block is the one exposed to assistive technology.
    #[inline]
    pub const fn is_primary(&self) -> bool {
        self.id == 0
    }

    /// Duplicates are hidden from the accessibility tree.
    #[inline]
    pub const fn aria_hidden(&self) -> bool {
        !self.is_primary()
    }
}

/// Structure of the rendered grid: blocks, columns, and tile identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    item_count: usize,
    cols: usize,
    duplicates: usize,
}

impl GridLayout {
    /// Describe a plane of `item_count` items in `cols` columns with
    /// `duplicates` copies of the primary block.
    #[must_use]
    pub fn new(item_count: usize, cols: usize, duplicates: usize) -> Self {
        Self {
            item_count,
            cols: cols.max(1),
            duplicates,
        }
    }

    /// Layout using the default column preferences and duplicate count.
    #[must_use]
    pub fn for_items(item_count: usize) -> Self {
        Self::new(item_count, optimal_grid_cols(item_count), DEFAULT_DUPLICATES)
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rows in one block.
    #[inline]
    pub fn rows(&self) -> usize {
        self.item_count.div_ceil(self.cols)
    }

    #[inline]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        1 + self.duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// All blocks, primary first.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.block_count()).map(|id| Block { id })
    }

    /// Every tile in render order (block-major, then item order).
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        let n = self.item_count;
        (0..self.block_count()).flat_map(move |block| (0..n).map(move |index| TileId::new(block, index)))
    }

    /// Column and row of an item inside its block.
    #[inline]
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    /// Top-left of `block` within the container for a block of size `cell`.
    ///
    /// Blocks flow two per row, so the default four blocks form a 2×2 square.
    #[must_use]
    pub fn block_origin(&self, block: usize, cell: Size) -> Point {
        Point::new(
            (block % 2) as f64 * cell.width,
            (block / 2) as f64 * cell.height,
        )
    }
}
