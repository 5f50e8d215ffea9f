use serde::{Deserialize, Serialize};

use super::HostError;
use super::geometry::Rect;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl WindowId {
    #[inline]
    pub fn new(id: u32) -> Self { Self(id) }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Normal,
    Popup,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub bounds: Rect,
    #[serde(default)]
    pub kind: WindowKind,
    #[serde(default)]
    pub state: WindowState,
}

impl WindowInfo {
    /// Whether the window takes part in tiling at all.
    pub fn is_tileable(&self) -> bool {
        self.kind == WindowKind::Normal && self.state != WindowState::Minimized
    }
}

/// Window primitives provided by the host.
///
/// Implementations are driven from a single event loop; calls for one layout
/// pass are never interleaved with another pass.
#[allow(async_fn_in_trait)]
pub trait WindowServer {
    async fn list_windows(&self) -> Result<Vec<WindowInfo>, HostError>;

    async fn window_bounds(&self, id: WindowId) -> Result<Rect, HostError>;

    /// Moves and resizes a window, leaving it in `state`.
    async fn set_window_bounds(
        &self,
        id: WindowId,
        bounds: Rect,
        state: WindowState,
    ) -> Result<(), HostError>;

    async fn set_window_state(&self, id: WindowId, state: WindowState) -> Result<(), HostError>;
}
