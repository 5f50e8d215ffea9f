use thiserror::Error;

use crate::common::preferences::PreferenceError;
use crate::sys::HostError;
use crate::sys::window_server::WindowId;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Preference store failed: {0}")]
    Preferences(#[from] PreferenceError),
    #[error("Unable to retrieve display information")]
    NoDisplays,
    #[error("No planned position for window {window}")]
    MissingPosition { window: WindowId },
}
