//! The host's user-facing surfaces: the toggle action's icon and title, sound
//! playback, and the action's context menu.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::HostError;
use crate::actor::menu::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Active,
    Inactive,
}

impl Icon {
    pub fn for_state(enabled: bool) -> Icon {
        if enabled { Icon::Active } else { Icon::Inactive }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sound {
    On,
    Off,
}

#[allow(async_fn_in_trait)]
pub trait Shell {
    async fn set_icon(&self, icon: Icon) -> Result<(), HostError>;

    async fn set_title(&self, title: &str) -> Result<(), HostError>;

    async fn play_sound(&self, sound: Sound) -> Result<(), HostError>;

    async fn create_menu(&self, items: &[MenuItem]) -> Result<(), HostError>;

    async fn update_menu_item(&self, id: &str, checked: bool) -> Result<(), HostError>;
}
