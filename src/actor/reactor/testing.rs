use crate::common::preferences::{
    MAIN_WINDOW, MemoryPreferenceStore, PREFERENCES_KEY, Preference, Preferences,
};
use crate::layout_engine::MainWindowSide;
use crate::sys::geometry::Rect;
use crate::sys::screen::{Display, DisplayId};
use crate::sys::snapshot::Snapshot;
use crate::sys::window_server::{WindowId, WindowInfo, WindowKind, WindowState};

pub const SCREEN: Rect = Rect::new(0, 0, 1200, 800);

pub fn display(id: u32, bounds: Rect) -> Display {
    Display {
        id: DisplayId::new(id),
        bounds,
        work_area: bounds,
    }
}

/// Two 1200x800 displays, the second to the right of the first.
pub fn two_displays() -> Vec<Display> {
    vec![display(1, SCREEN), display(2, Rect::new(0, 1200, 1200, 800))]
}

pub fn window(id: u32, bounds: Rect) -> WindowInfo {
    WindowInfo {
        id: WindowId::new(id),
        bounds,
        kind: WindowKind::Normal,
        state: WindowState::Normal,
    }
}

/// Normal windows with ids `1..=num`, cascaded on the first display and never
/// at a tiled position.
pub fn make_windows(num: u32) -> Vec<WindowInfo> {
    (1..=num)
        .map(|i| {
            let offset = 50 + 20 * i as i32;
            window(i, Rect::new(offset, offset, 400, 300))
        })
        .collect()
}

pub fn snapshot(displays: Vec<Display>, windows: Vec<WindowInfo>) -> Snapshot {
    Snapshot { windows, displays }
}

pub fn preferences(side: MainWindowSide, enabled: bool) -> Preferences {
    let mut prefs = Preferences::default();
    prefs.set_enabled(enabled);
    if let Some(Preference::Select { status, .. }) = prefs.get_mut(MAIN_WINDOW) {
        *status = side.to_string();
    }
    prefs
}

pub fn store_with(side: MainWindowSide, enabled: bool) -> MemoryPreferenceStore {
    MemoryPreferenceStore::with(PREFERENCES_KEY, &preferences(side, enabled)).unwrap()
}
