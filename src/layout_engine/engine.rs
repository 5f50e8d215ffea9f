use tracing::debug;

use super::grid::{grid_shape, plan_grid};
use super::main_window::plan_with_main;
use super::LayoutMode;
use crate::common::config::LayoutSettings;
use crate::sys::geometry::Rect;

/// Computes target rectangles for a number of windows on one display.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    settings: LayoutSettings,
}

impl LayoutEngine {
    pub fn new(settings: LayoutSettings) -> Self { Self { settings } }

    /// Returns one rectangle per window, in window order. Unused grid cells
    /// are dropped. An empty vector is returned for zero windows.
    pub fn calculate_layout(&self, mode: LayoutMode, count: usize, area: Rect) -> Vec<Rect> {
        if count == 0 {
            return vec![];
        }
        let positions: Vec<Rect> = match mode.main_side() {
            None => {
                let shape = grid_shape(count, self.settings.max_columns);
                let mut plan = plan_grid(shape, area, self.settings.padding);
                plan.positions.truncate(count);
                plan.positions
            }
            Some(side) => {
                let plan = plan_with_main(count, area, side, &self.settings);
                (0..count).map_while(|i| plan.position(i)).collect()
            }
        };
        debug!(?mode, count, ?area, planned = positions.len(), "calculated layout");
        positions
    }
}
