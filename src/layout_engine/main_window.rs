use serde::{Deserialize, Serialize};
use tracing::trace;

use super::grid::{TilingPlan, grid_shape, plan_grid};
use super::MainWindowSide;
use crate::common::config::LayoutSettings;
use crate::sys::geometry::Rect;

/// The main window's rectangle plus a grid for every other window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPlan {
    pub main: Rect,
    /// The strip left over beside the main window.
    pub residual: Rect,
    pub rest: TilingPlan,
}

impl MainPlan {
    /// The rectangle for the window at `index` in the tiled order.
    pub fn position(&self, index: usize) -> Option<Rect> {
        match index {
            0 => Some(self.main),
            i => self.rest.positions.get(i - 1).copied(),
        }
    }
}

/// Pins the first of `count` windows to `side` of `area` and tiles the rest in
/// the strip that remains.
///
/// `side` must be `Left` or `Right`; `None` is laid out as `Left`.
pub fn plan_with_main(
    count: usize,
    area: Rect,
    side: MainWindowSide,
    settings: &LayoutSettings,
) -> MainPlan {
    let padding = settings.padding;
    let available_width = area.width - 2 * padding;
    let available_height = area.height - 2 * padding;

    let main_width = if count <= 1 {
        available_width
    } else {
        (f64::from(available_width) * settings.main_window_ratio).floor() as i32
    };

    let main_left = match side {
        MainWindowSide::Right => area.left + area.width - main_width - padding,
        MainWindowSide::Left | MainWindowSide::None => area.left + padding,
    };
    let main = Rect::new(area.top + padding, main_left, main_width, available_height);

    let residual_width = area.width - main_width - padding;
    let residual_left = match side {
        MainWindowSide::Right => area.left,
        MainWindowSide::Left | MainWindowSide::None => area.left + main_width + padding,
    };
    let residual = Rect::new(area.top, residual_left, residual_width, area.height);

    let rest = if count <= 1 {
        TilingPlan::default()
    } else {
        let max_columns = residual_columns(residual.width, settings);
        plan_grid(grid_shape(count - 1, max_columns), residual, padding)
    };

    trace!(?main, ?residual, rest = rest.positions.len(), "main window plan");
    MainPlan { main, residual, rest }
}

/// Columns the residual grid may use: as many minimum-width windows as fit,
/// never as many as the plain grid, and at least one. A zero column width
/// allows a single column.
fn residual_columns(width: i32, settings: &LayoutSettings) -> usize {
    let fitting = width
        .checked_div_euclid(settings.min_window_size + settings.padding)
        .map_or(1, |n| n.max(0) as usize);
    fitting.min(settings.max_columns.saturating_sub(1)).max(1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::layout_engine::GridShape;

    fn settings() -> LayoutSettings { LayoutSettings::default() }

    const AREA: Rect = Rect::new(0, 0, 1200, 800);

    #[test]
    fn main_window_takes_half_of_available_width() {
        let plan = plan_with_main(3, AREA, MainWindowSide::Left, &settings());
        assert_eq!(plan.main, Rect::new(10, 10, 590, 780));
        assert_eq!(plan.residual, Rect::new(0, 600, 600, 800));
        assert_eq!(
            plan.rest.positions,
            vec![Rect::new(10, 610, 580, 385), Rect::new(405, 610, 580, 385)]
        );
    }

    #[test]
    fn right_side_mirrors_the_layout() {
        let plan = plan_with_main(3, AREA, MainWindowSide::Right, &settings());
        assert_eq!(plan.main, Rect::new(10, 600, 590, 780));
        assert_eq!(plan.residual, Rect::new(0, 0, 600, 800));
        assert_eq!(plan.rest.positions[0], Rect::new(10, 10, 580, 385));
        assert!(!plan.main.intersects(&plan.rest.positions[0]));
    }

    #[test]
    fn lone_window_fills_available_area() {
        let plan = plan_with_main(1, AREA, MainWindowSide::Right, &settings());
        assert_eq!(plan.main, Rect::new(10, 10, 1180, 780));
        assert!(plan.rest.is_empty());
        assert_eq!(plan.position(1), None);
    }

    #[test]
    fn wide_residual_uses_up_to_one_column_less_than_grid() {
        let area = Rect::new(0, 0, 3840, 2160);
        let plan = plan_with_main(5, area, MainWindowSide::Left, &settings());
        // A 1920 px residual fits three 560 px columns, capped at two.
        assert_eq!(plan.rest.column_sizes.len(), 2);
        assert_eq!(plan.rest.row_sizes.len(), 2);
    }

    #[test]
    fn narrow_residual_still_gets_one_column() {
        let area = Rect::new(0, 0, 800, 600);
        let plan = plan_with_main(3, area, MainWindowSide::Left, &settings());
        assert_eq!(plan.residual.width, 400);
        assert_eq!(plan.rest.column_sizes.len(), 1);
        assert_eq!(plan.rest.positions.len(), 2);
    }

    #[test]
    fn residual_shape_follows_grid_rules() {
        let area = Rect::new(0, 0, 3840, 2160);
        let plan = plan_with_main(5, area, MainWindowSide::Left, &settings());
        let shape = grid_shape(4, 2);
        assert_eq!(shape, GridShape { rows: 2, columns: 2 });
        assert_eq!(plan.rest.positions.len(), shape.cells());
    }

    #[test]
    fn zero_column_width_falls_back_to_one_column() {
        let settings = LayoutSettings {
            padding: 0,
            min_window_size: 0,
            ..LayoutSettings::default()
        };
        assert_eq!(residual_columns(600, &settings), 1);

        let plan = plan_with_main(3, AREA, MainWindowSide::Left, &settings);
        assert_eq!(plan.main, Rect::new(0, 0, 600, 800));
        assert_eq!(
            plan.rest.positions,
            vec![Rect::new(0, 600, 600, 400), Rect::new(400, 600, 600, 400)]
        );
    }

    #[test]
    fn every_window_gets_a_position() {
        for count in 1..=12 {
            let plan = plan_with_main(count, AREA, MainWindowSide::Left, &settings());
            for i in 0..count {
                assert!(plan.position(i).is_some(), "no position for {i} of {count}");
            }
        }
    }
}
