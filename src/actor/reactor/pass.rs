//! One layout pass: load preferences, enumerate windows, pick a display,
//! plan, and move the windows whose bounds differ from the plan.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::ReactorError;
use crate::common::preferences::{PREFERENCES_KEY, PreferenceStore, Preferences};
use crate::layout_engine::{LayoutEngine, LayoutMode};
use crate::sys::geometry::{Rect, SameAs};
use crate::sys::screen::{Display, DisplaySource, display_containing_window};
use crate::sys::window_server::{WindowId, WindowInfo, WindowServer, WindowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassStage {
    #[default]
    Idle,
    PreferencesLoaded,
    WindowsEnumerated,
    DisplayResolved,
    PlanComputed,
    Applying,
}

/// A window paired with the rectangle the plan assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowUpdate {
    pub window: WindowId,
    pub target: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Updates that were sent to the host, in order.
    pub moved: Vec<WindowUpdate>,
    /// Windows that were already at their target.
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Disabled,
    NoWindows,
    Applied(PassReport),
}

impl PassOutcome {
    pub fn moved(&self) -> &[WindowUpdate] {
        match self {
            PassOutcome::Applied(report) => &report.moved,
            PassOutcome::Disabled | PassOutcome::NoWindows => &[],
        }
    }
}

pub struct LayoutPass<'a, H, S> {
    host: &'a H,
    store: &'a S,
    engine: &'a LayoutEngine,
    stage: PassStage,
}

impl<'a, H, S> LayoutPass<'a, H, S>
where
    H: WindowServer + DisplaySource,
    S: PreferenceStore,
{
    pub fn new(host: &'a H, store: &'a S, engine: &'a LayoutEngine) -> Self {
        Self {
            host,
            store,
            engine,
            stage: PassStage::Idle,
        }
    }

    /// Runs the pass to completion. `anchor` is the bounds of the window that
    /// decides which display is tiled.
    ///
    /// A failure stops the pass where it is; moves already made are kept.
    #[instrument(name = "layout_pass", skip(self))]
    pub async fn run(mut self, anchor: Option<Rect>) -> Result<PassOutcome, ReactorError> {
        let result = self.run_stages(anchor).await;
        if let Err(err) = &result {
            debug!(stage = ?self.stage, %err, "layout pass aborted");
        }
        self.enter(PassStage::Idle);
        result
    }

    async fn run_stages(&mut self, anchor: Option<Rect>) -> Result<PassOutcome, ReactorError> {
        let preferences = self.store.load(PREFERENCES_KEY, &Preferences::default()).await?;
        self.enter(PassStage::PreferencesLoaded);
        if !preferences.is_enabled() {
            debug!("tiling is disabled");
            return Ok(PassOutcome::Disabled);
        }

        let windows: Vec<WindowInfo> = self
            .host
            .list_windows()
            .await?
            .into_iter()
            .filter(WindowInfo::is_tileable)
            .collect();
        self.enter(PassStage::WindowsEnumerated);
        if windows.is_empty() {
            debug!("no windows to tile");
            return Ok(PassOutcome::NoWindows);
        }
        self.normalize_window_states(&windows).await?;

        let displays = self.host.list_displays().await?;
        let display = select_display(&displays, anchor)?;
        self.enter(PassStage::DisplayResolved);

        let mode = LayoutMode::from(preferences.main_window_side());
        let positions = self.engine.calculate_layout(mode, windows.len(), display.work_area);
        let updates = pair_updates(&windows, &positions)?;
        self.enter(PassStage::PlanComputed);

        self.enter(PassStage::Applying);
        let report = self.apply(&updates).await?;
        let display_id = display.id;
        debug!(
            ?display_id,
            ?mode,
            moved = report.moved.len(),
            unchanged = report.unchanged,
            "layout applied"
        );
        Ok(PassOutcome::Applied(report))
    }

    fn enter(&mut self, stage: PassStage) {
        trace!(from = ?self.stage, to = ?stage, "layout pass stage");
        self.stage = stage;
    }

    /// Fullscreen windows report unreliable bounds, so they are returned to
    /// the normal state before anything is measured.
    async fn normalize_window_states(&self, windows: &[WindowInfo]) -> Result<(), ReactorError> {
        for window in windows.iter().filter(|w| w.state == WindowState::Fullscreen) {
            trace!(window = ?window.id, "leaving fullscreen");
            self.host.set_window_state(window.id, WindowState::Normal).await?;
        }
        Ok(())
    }

    /// Re-reads each window's bounds and only moves the ones that differ.
    async fn apply(&self, updates: &[WindowUpdate]) -> Result<PassReport, ReactorError> {
        let mut report = PassReport::default();
        for update in updates {
            let current = self.host.window_bounds(update.window).await?;
            if current.same_as(update.target) {
                trace!(window = ?update.window, "already in place");
                report.unchanged += 1;
                continue;
            }
            trace!(window = ?update.window, ?current, target = ?update.target, "moving window");
            self.host
                .set_window_bounds(update.window, update.target, WindowState::Normal)
                .await?;
            report.moved.push(*update);
        }
        Ok(report)
    }
}

/// The anchor window decides the display, unless there is no anchor or only
/// one display to choose from.
fn select_display(displays: &[Display], anchor: Option<Rect>) -> Result<&Display, ReactorError> {
    match anchor {
        Some(bounds) if displays.len() > 1 => display_containing_window(displays, &bounds),
        _ => displays.first().ok_or(ReactorError::NoDisplays),
    }
}

fn pair_updates(
    windows: &[WindowInfo],
    positions: &[Rect],
) -> Result<Vec<WindowUpdate>, ReactorError> {
    windows
        .iter()
        .enumerate()
        .map(|(i, window)| {
            let target = positions
                .get(i)
                .copied()
                .ok_or(ReactorError::MissingPosition { window: window.id })?;
            Ok(WindowUpdate { window: window.id, target })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::super::testing::*;
    use super::*;
    use crate::common::preferences::MemoryPreferenceStore;
    use crate::layout_engine::MainWindowSide;
    use crate::sys::snapshot::{HostCall, SnapshotHost};
    use crate::sys::window_server::WindowKind;

    async fn run_pass(
        host: &SnapshotHost,
        store: &MemoryPreferenceStore,
        anchor: Option<Rect>,
    ) -> Result<PassOutcome, ReactorError> {
        let engine = LayoutEngine::default();
        LayoutPass::new(host, store, &engine).run(anchor).await
    }

    #[test(tokio::test)]
    async fn grid_pass_moves_every_window_once() {
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], make_windows(3)));
        let store = store_with(MainWindowSide::None, true);

        let outcome = run_pass(&host, &store, None).await.unwrap();
        assert_eq!(outcome.moved().len(), 3);
        assert_eq!(
            host.window(WindowId::new(1)).unwrap().bounds,
            Rect::new(10, 10, 386, 780)
        );
        assert_eq!(
            host.window(WindowId::new(3)).unwrap().bounds,
            Rect::new(10, 802, 386, 780)
        );
    }

    #[test(tokio::test)]
    async fn second_pass_issues_no_moves() {
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], make_windows(4)));
        let store = store_with(MainWindowSide::Left, true);

        run_pass(&host, &store, None).await.unwrap();
        host.take_calls();

        let outcome = run_pass(&host, &store, None).await.unwrap();
        assert_eq!(
            outcome,
            PassOutcome::Applied(PassReport { moved: vec![], unchanged: 4 })
        );
        assert!(host.calls().is_empty());
    }

    #[test(tokio::test)]
    async fn main_window_pass_matches_plan() {
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], make_windows(3)));
        let store = store_with(MainWindowSide::Left, true);

        let outcome = run_pass(&host, &store, None).await.unwrap();
        assert_eq!(
            outcome.moved(),
            &[
                WindowUpdate {
                    window: WindowId::new(1),
                    target: Rect::new(10, 10, 590, 780),
                },
                WindowUpdate {
                    window: WindowId::new(2),
                    target: Rect::new(10, 610, 580, 385),
                },
                WindowUpdate {
                    window: WindowId::new(3),
                    target: Rect::new(405, 610, 580, 385),
                },
            ]
        );
    }

    #[test(tokio::test)]
    async fn disabled_pass_touches_nothing() {
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], make_windows(2)));
        let store = store_with(MainWindowSide::None, false);

        let outcome = run_pass(&host, &store, None).await.unwrap();
        assert_eq!(outcome, PassOutcome::Disabled);
        assert!(host.calls().is_empty());
    }

    #[test(tokio::test)]
    async fn popups_and_minimized_windows_are_left_alone() {
        let mut windows = make_windows(3);
        windows[0].kind = WindowKind::Popup;
        windows[1].state = WindowState::Minimized;
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], windows));
        let store = store_with(MainWindowSide::None, true);

        let outcome = run_pass(&host, &store, None).await.unwrap();
        assert_eq!(
            outcome.moved(),
            &[WindowUpdate {
                window: WindowId::new(3),
                target: Rect::new(10, 10, 1180, 780),
            }]
        );
    }

    #[test(tokio::test)]
    async fn only_filtered_out_windows_is_a_no_op() {
        let mut windows = make_windows(1);
        windows[0].state = WindowState::Minimized;
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], windows));
        let store = store_with(MainWindowSide::None, true);

        assert_eq!(run_pass(&host, &store, None).await.unwrap(), PassOutcome::NoWindows);
        assert!(host.calls().is_empty());
    }

    #[test(tokio::test)]
    async fn fullscreen_windows_are_normalized_first() {
        let mut windows = make_windows(2);
        windows[1].state = WindowState::Fullscreen;
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], windows));
        let store = store_with(MainWindowSide::None, true);

        run_pass(&host, &store, None).await.unwrap();
        let calls = host.calls();
        assert_eq!(
            calls[0],
            HostCall::SetWindowState {
                window: WindowId::new(2),
                state: WindowState::Normal,
            }
        );
        assert_eq!(calls.len(), 3);
    }

    #[test(tokio::test)]
    async fn moves_always_restore_normal_state() {
        let mut windows = make_windows(1);
        windows[0].state = WindowState::Maximized;
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], windows));
        let store = store_with(MainWindowSide::None, true);

        run_pass(&host, &store, None).await.unwrap();
        assert_eq!(host.window(WindowId::new(1)).unwrap().state, WindowState::Normal);
        assert!(matches!(
            host.calls()[0],
            HostCall::SetWindowBounds { state: WindowState::Normal, .. }
        ));
    }

    #[test(tokio::test)]
    async fn anchor_selects_its_display() {
        let host = SnapshotHost::new(snapshot(two_displays(), make_windows(1)));
        let store = store_with(MainWindowSide::None, true);

        let anchor = Rect::new(100, 1300, 400, 300);
        let outcome = run_pass(&host, &store, Some(anchor)).await.unwrap();
        assert_eq!(outcome.moved()[0].target, Rect::new(10, 1210, 1180, 780));
    }

    #[test(tokio::test)]
    async fn no_anchor_uses_first_display() {
        let host = SnapshotHost::new(snapshot(two_displays(), make_windows(1)));
        let store = store_with(MainWindowSide::None, true);

        let outcome = run_pass(&host, &store, None).await.unwrap();
        assert_eq!(outcome.moved()[0].target, Rect::new(10, 10, 1180, 780));
    }

    #[test(tokio::test)]
    async fn missing_displays_is_an_error() {
        let host = SnapshotHost::new(snapshot(vec![], make_windows(2)));
        let store = store_with(MainWindowSide::None, true);

        let err = run_pass(&host, &store, None).await.unwrap_err();
        assert!(matches!(err, ReactorError::NoDisplays));
        assert!(host.calls().is_empty());
    }

    #[test(tokio::test)]
    async fn failure_keeps_earlier_moves() {
        let host = SnapshotHost::new(snapshot(vec![display(1, SCREEN)], make_windows(3)));
        host.fail_for("window_bounds", WindowId::new(2));
        let store = store_with(MainWindowSide::None, true);

        let err = run_pass(&host, &store, None).await.unwrap_err();
        assert!(matches!(err, ReactorError::Host(_)));
        let moved: Vec<_> = host
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::SetWindowBounds { window, .. } => Some(window),
                _ => None,
            })
            .collect();
        assert_eq!(moved, vec![WindowId::new(1)]);
    }

    #[test]
    fn pairing_reports_missing_positions() {
        let windows = make_windows(2);
        let err = pair_updates(&windows, &[Rect::new(0, 0, 1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            ReactorError::MissingPosition { window } if window == WindowId::new(2)
        ));
    }
}
