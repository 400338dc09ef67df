//! Column selection and block layout, checked against hand-computed tables.

use pretty_assertions::assert_eq;
use reelgrid_core::geometry::{Point, Size};
use reelgrid_core::grid::{GridLayout, TileId, optimal_grid_cols};

#[test]
fn column_table() {
    let table: Vec<(usize, usize)> = (0..=20).map(|n| (n, optimal_grid_cols(n))).collect();
    let expected = vec![
        (0, 1),
        (1, 1),
        (2, 2),
        (3, 3),
        (4, 4),
        (5, 5),
        (6, 3),
        (7, 7),
        (8, 4),
        (9, 3),
        (10, 5),
        (11, 4),
        (12, 4),
        (13, 2),
        (14, 2),
        (15, 5),
        (16, 4),
        (17, 3),
        (18, 3),
        (19, 4),
        (20, 4),
    ];
    assert_eq!(table, expected);
}

#[test]
fn every_block_holds_every_item_in_order() {
    let layout = GridLayout::for_items(5);
    for block in layout.blocks() {
        let items: Vec<usize> = layout
            .tiles()
            .filter(|t| t.block == block.id)
            .map(|t| t.index)
            .collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }
}

#[test]
fn duplicate_tiles_sit_one_cell_away() {
    let layout = GridLayout::new(4, 2, 3);
    let cell = Size::new(200.0, 100.0);
    let primary = TileId::new(0, 3);
    let copy = TileId::new(3, 3);
    let offset = layout.block_origin(copy.block, cell) - layout.block_origin(primary.block, cell);
    assert_eq!(offset, Point::new(200.0, 100.0));
}
