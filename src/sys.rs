//! Interfaces to the host platform.

pub mod geometry;
pub mod screen;
pub mod shell;
pub mod snapshot;
pub mod window_server;

use thiserror::Error;

/// A host platform call reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host call `{call}` failed: {message}")]
pub struct HostError {
    pub call: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self { call, message: message.into() }
    }
}

/// Everything a layout pass needs from the host.
pub trait Host: window_server::WindowServer + screen::DisplaySource + shell::Shell {}

impl<T> Host for T where T: window_server::WindowServer + screen::DisplaySource + shell::Shell {}
