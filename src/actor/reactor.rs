//! The reactor turns host events into layout passes.
//!
//! Events are handled strictly one at a time. Every handler reloads the
//! preferences it needs, so nothing is cached between events, and a failing
//! handler is logged and does not stop the event loop.

mod error;
pub mod pass;

#[cfg(test)]
mod testing;

use std::time::Instant;

pub use error::ReactorError;
pub use pass::{LayoutPass, PassOutcome, PassReport, PassStage, WindowUpdate};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, info, instrument, trace, warn};

use crate::actor;
use crate::actor::menu::{self, MenuClick};
use crate::common::config::Config;
use crate::common::preferences::{PREFERENCES_KEY, PreferenceStore, Preferences};
use crate::layout_engine::LayoutEngine;
use crate::sys::Host;
use crate::sys::geometry::Rect;
use crate::sys::screen::{display_containing_window, most_frequent_display};
use crate::sys::shell::{Icon, Sound};
use crate::sys::window_server::{WindowId, WindowInfo};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum Event {
    /// The extension was installed or the host started. Sent once before any
    /// other event.
    Startup,

    /// The toggle action was clicked, or its shortcut pressed. `window` is the
    /// focused window at the time, if any.
    ActionClicked { window: Option<WindowId> },

    WindowCreated(WindowInfo),

    /// A window went away. The host has already dropped it from its list.
    WindowRemoved(WindowId),

    MenuClicked {
        click: MenuClick,
        window: Option<WindowId>,
    },
}

pub struct Reactor<H, S> {
    host: H,
    store: S,
    config: Config,
    engine: LayoutEngine,
    last_sound: Option<Instant>,
}

impl<H: Host, S: PreferenceStore> Reactor<H, S> {
    /// Invalid layout values in `config` are replaced with their defaults.
    pub fn new(host: H, store: S, mut config: Config) -> Self {
        let fixed = config.settings.layout.auto_fix_values();
        if fixed > 0 {
            warn!(fixed, "replaced invalid layout settings with defaults");
        }
        let engine = LayoutEngine::new(config.settings.layout);
        Reactor {
            host,
            store,
            config,
            engine,
            last_sound: None,
        }
    }

    pub fn host(&self) -> &H { &self.host }

    pub fn store(&self) -> &S { &self.store }

    /// Handles events until every sender is dropped.
    pub async fn run(&mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            self.handle_event(event).instrument(span).await;
        }
        debug!("event channel closed");
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event = ?event))]
    pub async fn handle_event(&mut self, event: Event) {
        debug!(?event, "Event");
        let result = match event {
            Event::Startup => self.on_startup().await,
            Event::ActionClicked { window } => self.on_action_clicked(window).await,
            Event::WindowCreated(window) => self.on_window_created(window).await,
            Event::WindowRemoved(window) => self.on_window_removed(window).await,
            Event::MenuClicked { click, window } => self.on_menu_clicked(click, window).await,
        };
        if let Err(err) = result {
            error!(%err, "event handler failed");
        }
    }

    /// Each startup step is independent; one failing does not skip the rest.
    async fn on_startup(&mut self) -> Result<(), ReactorError> {
        let preferences = match self.load_preferences().await {
            Ok(preferences) => preferences,
            Err(err) => {
                error!(%err, "could not load preferences, using defaults");
                Preferences::default()
            }
        };
        if let Err(err) = self.setup_menu(&preferences).await {
            error!(%err, "could not set up the context menu");
        }
        if let Err(err) = self.host.set_icon(Icon::for_state(preferences.is_enabled())).await {
            error!(%err, "could not set the action icon");
        }
        if let Err(err) = self.host.set_title(&self.config.settings.action_title()).await {
            error!(%err, "could not set the action title");
        }
        info!(enabled = preferences.is_enabled(), "started");
        Ok(())
    }

    async fn setup_menu(&self, preferences: &Preferences) -> Result<(), ReactorError> {
        self.host.create_menu(&menu::build_menu_structure(preferences)).await?;
        for (id, checked) in menu::menu_state(preferences) {
            self.host.update_menu_item(&id, checked).await?;
        }
        Ok(())
    }

    async fn on_action_clicked(&mut self, window: Option<WindowId>) -> Result<(), ReactorError> {
        let mut preferences = self.load_preferences().await?;
        let enabled = !preferences.is_enabled();
        preferences.set_enabled(enabled);
        self.host.set_icon(Icon::for_state(enabled)).await?;
        self.store.save(PREFERENCES_KEY, &preferences).await?;
        info!(enabled, "tiling toggled");

        let Some(window) = window else {
            return Ok(());
        };
        if enabled {
            // A failed pass still gets the sound; tiling is on either way.
            if let Err(err) = self.tile_around(window).await {
                error!(%err, "tiling after enable failed");
            }
            self.notify(&preferences, Sound::On).await
        } else {
            self.notify(&preferences, Sound::Off).await
        }
    }

    async fn on_window_created(&mut self, window: WindowInfo) -> Result<(), ReactorError> {
        self.run_pass(Some(window.bounds)).await?;
        Ok(())
    }

    /// The removed window can no longer anchor the pass, so the display that
    /// holds most of the remaining windows is tiled instead.
    async fn on_window_removed(&mut self, removed: WindowId) -> Result<(), ReactorError> {
        let windows: Vec<WindowInfo> = self
            .host
            .list_windows()
            .await?
            .into_iter()
            .filter(WindowInfo::is_tileable)
            .collect();
        let displays = self.host.list_displays().await?;

        let anchor = if windows.len() == 1 || displays.len() == 1 {
            windows.first()
        } else {
            match most_frequent_display(&displays, &windows)? {
                Some(display) => windows
                    .iter()
                    .find(|w| {
                        display_containing_window(&displays, &w.bounds)
                            .is_ok_and(|d| d.id == display)
                    })
                    .or(windows.first()),
                None => windows.first(),
            }
        };
        debug!(?removed, anchor = ?anchor.map(|w| w.id), "re-tiling after removal");
        self.run_pass(anchor.map(|w| w.bounds)).await?;
        Ok(())
    }

    async fn on_menu_clicked(
        &mut self,
        click: MenuClick,
        window: Option<WindowId>,
    ) -> Result<(), ReactorError> {
        let mut preferences = self.load_preferences().await?;
        let Some(outcome) = menu::apply_click(&mut preferences, &click) else {
            debug!(item = %click.item, "click on unknown menu item");
            return Ok(());
        };
        self.store.save(PREFERENCES_KEY, &preferences).await?;

        if outcome.main_window_changed && preferences.is_enabled() {
            if let Some(window) = window {
                self.tile_around(window).await?;
            }
        }
        Ok(())
    }

    async fn tile_around(&self, window: WindowId) -> Result<PassOutcome, ReactorError> {
        let anchor = self.host.window_bounds(window).await?;
        self.run_pass(Some(anchor)).await
    }

    async fn run_pass(&self, anchor: Option<Rect>) -> Result<PassOutcome, ReactorError> {
        LayoutPass::new(&self.host, &self.store, &self.engine).run(anchor).await
    }

    async fn load_preferences(&self) -> Result<Preferences, ReactorError> {
        Ok(self.store.load(PREFERENCES_KEY, &Preferences::default()).await?)
    }

    /// Plays `sound` unless sounds are off or another sound played too
    /// recently.
    async fn notify(
        &mut self,
        preferences: &Preferences,
        sound: Sound,
    ) -> Result<(), ReactorError> {
        if !preferences.sounds() {
            return Ok(());
        }
        let now = Instant::now();
        let throttle = self.config.settings.sound_throttle();
        if self.last_sound.is_some_and(|last| now.duration_since(last) < throttle) {
            trace!(%sound, "sound throttled");
            return Ok(());
        }
        self.last_sound = Some(now);
        self.host.play_sound(sound).await?;
        Ok(())
    }
}
