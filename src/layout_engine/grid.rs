use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::sys::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
}

impl GridShape {
    pub fn cells(&self) -> usize { self.rows * self.columns }
}

/// Chooses rows and columns for `count` windows.
///
/// The rules are tried in order: a single window fills the area, an exact
/// multiple of `max_columns` fills full rows, a perfect square is laid out
/// square as long as that fits in `max_columns`, and anything else fills rows
/// of `max_columns` with the last row partially empty. A `max_columns` of zero
/// is treated as one.
pub fn grid_shape(count: usize, max_columns: usize) -> GridShape {
    let max_columns = max_columns.max(1);
    let root = count.isqrt();
    let shape = if count <= 1 {
        GridShape { rows: 1, columns: 1 }
    } else if count % max_columns == 0 {
        GridShape {
            rows: count / max_columns,
            columns: max_columns,
        }
    } else if root * root == count && root <= max_columns {
        GridShape { rows: root, columns: root }
    } else {
        GridShape {
            rows: count.div_ceil(max_columns),
            columns: count.min(max_columns),
        }
    };
    trace!(count, max_columns, ?shape, "grid shape");
    shape
}

/// Cell sizes and positions for one grid, in row-major order.
///
/// A plan can hold more cells than there are windows; only the leading
/// positions are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingPlan {
    pub row_sizes: Vec<i32>,
    pub column_sizes: Vec<i32>,
    pub positions: Vec<Rect>,
}

impl TilingPlan {
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}

/// Splits `area` into `shape`, leaving `padding` pixels between cells and
/// around the outside. Sizes are floored to whole pixels, so any remainder is
/// left at the right and bottom edges.
pub fn plan_grid(shape: GridShape, area: Rect, padding: i32) -> TilingPlan {
    let rows = shape.rows.max(1) as i32;
    let columns = shape.columns.max(1) as i32;

    let available_width = area.width - (columns + 1) * padding;
    let available_height = area.height - (rows + 1) * padding;
    let column_size = available_width.div_euclid(columns);
    let row_size = available_height.div_euclid(rows);

    let mut positions = Vec::with_capacity((rows * columns) as usize);
    let mut top = area.top + padding;
    for _ in 0..rows {
        let mut left = area.left + padding;
        for _ in 0..columns {
            positions.push(Rect::new(top, left, column_size, row_size));
            left += column_size + padding;
        }
        top += row_size + padding;
    }

    TilingPlan {
        row_sizes: vec![row_size; rows as usize],
        column_sizes: vec![column_size; columns as usize],
        positions,
    }
}
