//! Grid layout: column/row choice, cell rectangles and drop targets.

use mediasyncer_core::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Columns and rows of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub cols: u32,
    pub rows: u32,
}

impl GridDims {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    pub fn cell_count(self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Size of one cell when tiling `canvas` uniformly.
    pub fn cell_size(self, canvas: Rect) -> Vec2 {
        Vec2::new(
            canvas.width / self.cols.max(1) as f32,
            canvas.height / self.rows.max(1) as f32,
        )
    }

    /// Rectangle of cell `index` (row-major).
    pub fn cell_rect(self, canvas: Rect, index: usize) -> Rect {
        let cols = self.cols.max(1) as usize;
        let size = self.cell_size(canvas);
        let (col, row) = (index % cols, index / cols);
        Rect::new(
            canvas.x + col as f32 * size.x,
            canvas.y + row as f32 * size.y,
            size.x,
            size.y,
        )
    }

    /// Row-major index of the cell under `point`, which may lie outside
    /// the occupied cells.
    pub fn cell_index_at(self, canvas: Rect, point: Vec2) -> usize {
        let size = self.cell_size(canvas);
        if size.x <= 0.0 || size.y <= 0.0 {
            return 0;
        }
        let col = ((point.x - canvas.x) / size.x).floor().max(0.0) as usize;
        let row = ((point.y - canvas.y) / size.y).floor().max(0.0) as usize;
        col + row * self.cols.max(1) as usize
    }
}

/// Most balanced grid for `n` items on a canvas of the given aspect.
///
/// Tries every column count and keeps the first whose `cols / rows` is
/// closest to `aspect`.
pub fn best_grid(n: usize, aspect: f32) -> GridDims {
    if n == 0 {
        return GridDims::new(1, 1);
    }
    let mut best = GridDims::new(n as u32, 1);
    let mut min_diff = f32::INFINITY;
    for cols in 1..=n {
        let rows = n.div_ceil(cols);
        let diff = (cols as f32 / rows as f32 - aspect).abs();
        if diff < min_diff {
            min_diff = diff;
            best = GridDims::new(cols as u32, rows as u32);
        }
    }
    best
}

/// Auto or user-pinned grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridSpec {
    #[default]
    Auto,
    Pinned(GridDims),
}

impl GridSpec {
    /// Pin the column count; rows follow from the item count.
    pub fn pin_cols(cols: u32, n: usize) -> Self {
        if cols == 0 {
            return GridSpec::Auto;
        }
        let rows = n.div_ceil(cols as usize).max(1) as u32;
        GridSpec::Pinned(GridDims::new(cols, rows))
    }

    /// Pin the row count; columns follow from the item count.
    pub fn pin_rows(rows: u32, n: usize) -> Self {
        if rows == 0 {
            return GridSpec::Auto;
        }
        let cols = n.div_ceil(rows as usize).max(1) as u32;
        GridSpec::Pinned(GridDims::new(cols, rows))
    }

    pub fn is_auto(self) -> bool {
        matches!(self, GridSpec::Auto)
    }

    /// Dimensions used to lay out `count` cells.
    pub fn dims(self, count: usize, aspect: f32) -> GridDims {
        match self {
            GridSpec::Auto => best_grid(count, aspect),
            GridSpec::Pinned(dims) => dims,
        }
    }

    /// Insertion index for a dragged item dropped at `point`, with
    /// `remaining` items left in the grid. Clamped to `[0, remaining]`.
    pub fn drop_index(self, canvas: Rect, remaining: usize, point: Vec2) -> usize {
        let aspect = canvas.aspect().unwrap_or(1.0);
        let cols = match self {
            GridSpec::Pinned(dims) => dims.cols.max(1),
            GridSpec::Auto => best_grid(remaining + 1, aspect).cols,
        };
        let rows = (remaining + 1).div_ceil(cols as usize).max(1) as u32;
        GridDims::new(cols, rows)
            .cell_index_at(canvas, point)
            .min(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_best_grid_known_values() {
        assert_eq!(best_grid(0, 1.0), GridDims::new(1, 1));
        assert_eq!(best_grid(1, 1.78), GridDims::new(1, 1));
        assert_eq!(best_grid(4, 1.0), GridDims::new(2, 2));
        assert_eq!(best_grid(2, 16.0 / 9.0), GridDims::new(2, 1));
        assert_eq!(best_grid(3, 16.0 / 9.0), GridDims::new(2, 2));
        assert_eq!(best_grid(6, 16.0 / 9.0), GridDims::new(4, 2));
    }

    #[test]
    fn test_cells_tile_canvas() {
        let canvas = Rect::new(10.0, 20.0, 300.0, 200.0);
        let dims = GridDims::new(3, 2);
        assert_eq!(dims.cell_rect(canvas, 0), Rect::new(10.0, 20.0, 100.0, 100.0));
        assert_eq!(dims.cell_rect(canvas, 4), Rect::new(110.0, 120.0, 100.0, 100.0));
        assert_eq!(dims.cell_index_at(canvas, Vec2::new(250.0, 150.0)), 5);
    }

    #[test]
    fn test_pinning() {
        assert_eq!(GridSpec::pin_cols(2, 5), GridSpec::Pinned(GridDims::new(2, 3)));
        assert_eq!(GridSpec::pin_rows(2, 5), GridSpec::Pinned(GridDims::new(3, 2)));
        assert_eq!(GridSpec::pin_cols(3, 0), GridSpec::Pinned(GridDims::new(3, 1)));
        assert_eq!(GridSpec::pin_cols(0, 4), GridSpec::Auto);
        assert_eq!(
            GridSpec::pin_cols(4, 2).dims(2, 1.0),
            GridDims::new(4, 1)
        );
    }

    #[test]
    fn test_drop_index() {
        let canvas = Rect::new(0.0, 0.0, 400.0, 400.0);
        // Three remaining items plus the dragged one lay out as 2x2
        let spec = GridSpec::Auto;
        assert_eq!(spec.drop_index(canvas, 3, Vec2::new(10.0, 10.0)), 0);
        assert_eq!(spec.drop_index(canvas, 3, Vec2::new(390.0, 10.0)), 1);
        assert_eq!(spec.drop_index(canvas, 3, Vec2::new(390.0, 390.0)), 3);
        // Past the last cell clamps to the end
        assert_eq!(spec.drop_index(canvas, 1, Vec2::new(390.0, 390.0)), 1);
    }

    proptest! {
        #[test]
        fn prop_best_grid_fits_and_is_optimal(n in 1usize..64, aspect in 0.2f32..5.0) {
            let dims = best_grid(n, aspect);
            prop_assert!(dims.cell_count() >= n);
            let diff = (dims.cols as f32 / dims.rows as f32 - aspect).abs();
            for cols in 1..=n {
                let rows = n.div_ceil(cols);
                let other = (cols as f32 / rows as f32 - aspect).abs();
                prop_assert!(diff <= other);
                if (cols as u32) < dims.cols {
                    prop_assert!(other > diff);
                }
            }
        }

        #[test]
        fn prop_drop_index_in_range(
            remaining in 0usize..20,
            x in -100.0f32..900.0,
            y in -100.0f32..700.0,
        ) {
            let canvas = Rect::new(0.0, 0.0, 800.0, 600.0);
            let index = GridSpec::Auto.drop_index(canvas, remaining, Vec2::new(x, y));
            prop_assert!(index <= remaining);
        }
    }
}
