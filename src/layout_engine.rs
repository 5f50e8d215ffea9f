pub mod engine;
pub mod grid;
pub mod main_window;

pub use engine::LayoutEngine;
pub use grid::{GridShape, TilingPlan, grid_shape, plan_grid};
pub use main_window::{MainPlan, plan_with_main};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where the main window is pinned, as stored in the `main_window`
/// preference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MainWindowSide {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    Grid,
    MainLeft,
    MainRight,
}

impl From<MainWindowSide> for LayoutMode {
    fn from(side: MainWindowSide) -> Self {
        match side {
            MainWindowSide::None => LayoutMode::Grid,
            MainWindowSide::Left => LayoutMode::MainLeft,
            MainWindowSide::Right => LayoutMode::MainRight,
        }
    }
}

impl LayoutMode {
    pub fn main_side(self) -> Option<MainWindowSide> {
        match self {
            LayoutMode::Grid => None,
            LayoutMode::MainLeft => Some(MainWindowSide::Left),
            LayoutMode::MainRight => Some(MainWindowSide::Right),
        }
    }
}
