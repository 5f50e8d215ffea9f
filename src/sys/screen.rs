use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::HostError;
use super::geometry::Rect;
use super::window_server::WindowInfo;
use crate::actor::reactor::ReactorError;
use crate::common::collections::HashMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u32);

impl DisplayId {
    pub fn new(id: u32) -> DisplayId { DisplayId(id) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub id: DisplayId,
    /// The full frame of the display.
    pub bounds: Rect,
    /// The usable frame, excluding taskbars and menu bars.
    pub work_area: Rect,
}

#[allow(async_fn_in_trait)]
pub trait DisplaySource {
    /// Returns every connected display in the host's enumeration order.
    async fn list_displays(&self) -> Result<Vec<Display>, HostError>;
}

/// Returns the display whose bounds contain the most corners of `window`.
///
/// Ties keep the display that was enumerated first, and a window that lies
/// entirely off-screen resolves to the first display. This is an ordering
/// policy rather than a geometric optimum.
pub fn display_containing_window<'a>(
    displays: &'a [Display],
    window: &Rect,
) -> Result<&'a Display, ReactorError> {
    let corners = window.corners();
    let mut selected = displays.first().ok_or(ReactorError::NoDisplays)?;
    let mut max_contained = 0;
    for display in displays {
        let contained = corners.iter().filter(|&&c| display.bounds.contains(c)).count();
        let display_id = display.id;
        trace!(?display_id, contained, "corners contained");
        if contained > max_contained {
            selected = display;
            max_contained = contained;
        }
    }
    Ok(selected)
}

/// Returns the display that holds the most of `windows`.
///
/// When two displays hold the same number of windows, the one that reached
/// that count first wins.
pub fn most_frequent_display(
    displays: &[Display],
    windows: &[WindowInfo],
) -> Result<Option<DisplayId>, ReactorError> {
    let mut counts: HashMap<DisplayId, usize> = HashMap::default();
    let mut max_count = 0;
    let mut most_frequent = None;
    for window in windows {
        let id = display_containing_window(displays, &window.bounds)?.id;
        let count = counts.entry(id).or_default();
        *count += 1;
        if *count > max_count {
            max_count = *count;
            most_frequent = Some(id);
        }
    }
    debug!(?most_frequent, max_count, "most frequent display");
    Ok(most_frequent)
}
