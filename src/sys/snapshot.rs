//! An in-memory host.
//!
//! `SnapshotHost` holds a fixed set of windows and displays, applies bound and
//! state changes to its own copy, and records every mutating call so that
//! callers can inspect exactly what a layout pass asked the host to do.

use std::cell::RefCell;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::HostError;
use super::geometry::Rect;
use super::screen::{Display, DisplaySource};
use super::shell::{Icon, Shell, Sound};
use super::window_server::{WindowId, WindowInfo, WindowServer, WindowState};
use crate::actor::menu::MenuItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub windows: Vec<WindowInfo>,
    #[serde(default)]
    pub displays: Vec<Display>,
}

impl Snapshot {
    pub fn read(path: &Path) -> anyhow::Result<Snapshot> {
        let buf = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&buf)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "call")]
pub enum HostCall {
    SetWindowBounds {
        window: WindowId,
        bounds: Rect,
        state: WindowState,
    },
    SetWindowState {
        window: WindowId,
        state: WindowState,
    },
    SetIcon {
        icon: Icon,
    },
    SetTitle {
        title: String,
    },
    PlaySound {
        sound: Sound,
    },
    CreateMenu {
        items: Vec<MenuItem>,
    },
    UpdateMenuItem {
        id: String,
        checked: bool,
    },
}

impl HostCall {
    pub fn is_window_update(&self) -> bool {
        matches!(
            self,
            HostCall::SetWindowBounds { .. } | HostCall::SetWindowState { .. }
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: Snapshot,
    calls: Vec<HostCall>,
    failures: Vec<(&'static str, Option<WindowId>)>,
}

#[derive(Debug, Default)]
pub struct SnapshotHost {
    inner: RefCell<Inner>,
}

impl SnapshotHost {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            inner: RefCell::new(Inner { snapshot, ..Default::default() }),
        }
    }

    pub fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.inner.borrow().snapshot.windows.iter().find(|w| w.id == id).cloned()
    }

    pub fn add_window(&self, window: WindowInfo) {
        self.inner.borrow_mut().snapshot.windows.push(window);
    }

    pub fn remove_window(&self, id: WindowId) -> Option<WindowInfo> {
        let mut inner = self.inner.borrow_mut();
        let idx = inner.snapshot.windows.iter().position(|w| w.id == id)?;
        Some(inner.snapshot.windows.remove(idx))
    }

    /// Returns and clears the calls recorded so far.
    pub fn take_calls(&self) -> Vec<HostCall> { std::mem::take(&mut self.inner.borrow_mut().calls) }

    pub fn calls(&self) -> Vec<HostCall> { self.inner.borrow().calls.clone() }

    /// Makes every later `call` fail.
    pub fn fail(&self, call: &'static str) {
        self.inner.borrow_mut().failures.push((call, None));
    }

    /// Makes every later `call` targeting `window` fail.
    pub fn fail_for(&self, call: &'static str, window: WindowId) {
        self.inner.borrow_mut().failures.push((call, Some(window)));
    }

    fn check(&self, call: &'static str, window: Option<WindowId>) -> Result<(), HostError> {
        let failing = self
            .inner
            .borrow()
            .failures
            .iter()
            .any(|&(c, w)| c == call && (w.is_none() || w == window));
        if failing {
            return Err(HostError::new(call, "injected failure"));
        }
        Ok(())
    }

    fn record(&self, call: HostCall) {
        trace!(?call, "host call");
        self.inner.borrow_mut().calls.push(call);
    }

    fn with_window<T>(
        &self,
        call: &'static str,
        id: WindowId,
        f: impl FnOnce(&mut WindowInfo) -> T,
    ) -> Result<T, HostError> {
        let mut inner = self.inner.borrow_mut();
        let window = inner
            .snapshot
            .windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| HostError::new(call, format!("no window with id {id}")))?;
        Ok(f(window))
    }
}

impl WindowServer for SnapshotHost {
    async fn list_windows(&self) -> Result<Vec<WindowInfo>, HostError> {
        self.check("list_windows", None)?;
        Ok(self.inner.borrow().snapshot.windows.clone())
    }

    async fn window_bounds(&self, id: WindowId) -> Result<Rect, HostError> {
        self.check("window_bounds", Some(id))?;
        self.with_window("window_bounds", id, |w| w.bounds)
    }

    async fn set_window_bounds(
        &self,
        id: WindowId,
        bounds: Rect,
        state: WindowState,
    ) -> Result<(), HostError> {
        self.check("set_window_bounds", Some(id))?;
        self.with_window("set_window_bounds", id, |w| {
            w.bounds = bounds;
            w.state = state;
        })?;
        self.record(HostCall::SetWindowBounds { window: id, bounds, state });
        Ok(())
    }

    async fn set_window_state(&self, id: WindowId, state: WindowState) -> Result<(), HostError> {
        self.check("set_window_state", Some(id))?;
        self.with_window("set_window_state", id, |w| w.state = state)?;
        self.record(HostCall::SetWindowState { window: id, state });
        Ok(())
    }
}

impl DisplaySource for SnapshotHost {
    async fn list_displays(&self) -> Result<Vec<Display>, HostError> {
        self.check("list_displays", None)?;
        Ok(self.inner.borrow().snapshot.displays.clone())
    }
}

impl Shell for SnapshotHost {
    async fn set_icon(&self, icon: Icon) -> Result<(), HostError> {
        self.check("set_icon", None)?;
        self.record(HostCall::SetIcon { icon });
        Ok(())
    }

    async fn set_title(&self, title: &str) -> Result<(), HostError> {
        self.check("set_title", None)?;
        self.record(HostCall::SetTitle { title: title.to_string() });
        Ok(())
    }

    async fn play_sound(&self, sound: Sound) -> Result<(), HostError> {
        self.check("play_sound", None)?;
        self.record(HostCall::PlaySound { sound });
        Ok(())
    }

    async fn create_menu(&self, items: &[MenuItem]) -> Result<(), HostError> {
        self.check("create_menu", None)?;
        self.record(HostCall::CreateMenu { items: items.to_vec() });
        Ok(())
    }

    async fn update_menu_item(&self, id: &str, checked: bool) -> Result<(), HostError> {
        self.check("update_menu_item", None)?;
        self.record(HostCall::UpdateMenuItem { id: id.to_string(), checked });
        Ok(())
    }
}
