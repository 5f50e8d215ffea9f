//! The toggle action's context menu, derived from the preference schema.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::preferences::{MAIN_WINDOW, Preference, Preferences};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItemKind {
    Normal,
    Checkbox,
    Radio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuContext {
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub kind: MenuItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub contexts: Vec<MenuContext>,
}

/// A click on a menu item, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuClick {
    pub item: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// The new checked state for checkbox items.
    #[serde(default)]
    pub checked: Option<bool>,
}

/// What a click changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub main_window_changed: bool,
}

/// Checkbox preferences become one checkbox; select preferences become a
/// parent item with one radio child per option. Action preferences are driven
/// by the action button and get no item.
pub fn build_menu_structure(preferences: &Preferences) -> Vec<MenuItem> {
    let mut items = Vec::new();
    for (key, preference) in preferences.iter() {
        match preference {
            Preference::Checkbox { title, .. } => items.push(MenuItem {
                id: key.to_string(),
                title: title.clone(),
                kind: MenuItemKind::Checkbox,
                parent_id: None,
                contexts: vec![MenuContext::Action],
            }),
            Preference::Select { title, options, .. } => {
                items.push(MenuItem {
                    id: key.to_string(),
                    title: title.clone(),
                    kind: MenuItemKind::Normal,
                    parent_id: None,
                    contexts: vec![MenuContext::Action],
                });
                items.extend(options.iter().map(|option| MenuItem {
                    id: option.clone(),
                    title: capitalize(option),
                    kind: MenuItemKind::Radio,
                    parent_id: Some(key.to_string()),
                    contexts: vec![MenuContext::Action],
                }));
            }
            Preference::Action { .. } => {}
        }
    }
    items
}

/// Checked states that make the menu reflect `preferences`.
pub fn menu_state(preferences: &Preferences) -> Vec<(String, bool)> {
    preferences
        .iter()
        .filter_map(|(key, preference)| match preference {
            Preference::Select { status, .. } => Some((status.clone(), true)),
            Preference::Checkbox { status, .. } => Some((key.to_string(), *status)),
            Preference::Action { .. } => None,
        })
        .collect()
}

/// Applies `click` to `preferences`. Returns `None` when the click does not
/// belong to any preference.
pub fn apply_click(preferences: &mut Preferences, click: &MenuClick) -> Option<ClickOutcome> {
    let parent_key = click.parent.as_deref();
    if let Some(Preference::Select { status, .. }) = parent_key.and_then(|k| preferences.get_mut(k))
    {
        debug!(parent = ?parent_key, item = %click.item, "select preference changed");
        *status = click.item.clone();
        return Some(ClickOutcome {
            main_window_changed: parent_key == Some(MAIN_WINDOW),
        });
    }
    match preferences.get_mut(&click.item) {
        Some(Preference::Checkbox { status, .. }) => {
            debug!(item = %click.item, checked = ?click.checked, "checkbox preference changed");
            if let Some(checked) = click.checked {
                *status = checked;
            }
            Some(ClickOutcome { main_window_changed: false })
        }
        Some(_) => Some(ClickOutcome { main_window_changed: false }),
        None => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
