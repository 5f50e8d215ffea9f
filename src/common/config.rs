use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilegrid")
}
pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".tilegrid.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Name shown in the toggle action's title.
    #[serde(default = "default_short_name")]
    pub short_name: String,
    #[serde(default = "default_shortcut")]
    pub shortcut: String,
    #[serde(default = "default_shortcut_mac")]
    pub shortcut_mac: String,
    /// Sound requests closer together than this are dropped.
    #[serde(default = "default_sound_throttle_ms")]
    pub sound_throttle_ms: u64,
    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Space between windows and around the edges of the work area, in pixels.
    #[serde(default = "default_padding")]
    pub padding: i32,
    /// Most columns the plain grid will use.
    #[serde(default = "default_max_columns")]
    pub max_columns: usize,
    /// Narrowest width a window in the residual grid may be given when a
    /// main window is pinned.
    #[serde(default = "default_min_window_size")]
    pub min_window_size: i32,
    /// Fraction of the available width given to the main window.
    #[serde(default = "default_main_window_ratio")]
    pub main_window_ratio: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            max_columns: default_max_columns(),
            min_window_size: default_min_window_size(),
            main_window_ratio: default_main_window_ratio(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            short_name: default_short_name(),
            shortcut: default_shortcut(),
            shortcut_mac: default_shortcut_mac(),
            sound_throttle_ms: default_sound_throttle_ms(),
            layout: LayoutSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.short_name.is_empty() {
            issues.push("short_name must not be empty".to_string());
        }

        issues.extend(self.layout.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.short_name.is_empty() {
            self.short_name = default_short_name();
            fixes += 1;
        }

        fixes += self.layout.auto_fix_values();

        fixes
    }

    pub fn sound_throttle(&self) -> Duration { Duration::from_millis(self.sound_throttle_ms) }

    /// The toggle action's title, with the shortcut for the current platform.
    pub fn action_title(&self) -> String {
        let shortcut = if cfg!(target_os = "macos") {
            &self.shortcut_mac
        } else {
            &self.shortcut
        };
        format!("{} ({})", self.short_name, shortcut)
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.padding < 0 {
            issues.push(format!("padding must be non-negative, got {}", self.padding));
        }

        if self.max_columns == 0 {
            issues.push("max_columns must be at least 1".to_string());
        }

        if self.min_window_size <= 0 {
            issues.push(format!(
                "min_window_size must be positive, got {}",
                self.min_window_size
            ));
        }

        if !(self.main_window_ratio > 0.0 && self.main_window_ratio < 1.0) {
            issues.push(format!(
                "main_window_ratio must be between 0 and 1, got {}",
                self.main_window_ratio
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.padding < 0 {
            self.padding = default_padding();
            fixes += 1;
        }

        if self.max_columns == 0 {
            self.max_columns = default_max_columns();
            fixes += 1;
        }

        if self.min_window_size <= 0 {
            self.min_window_size = default_min_window_size();
            fixes += 1;
        }

        if !(self.main_window_ratio > 0.0 && self.main_window_ratio < 1.0) {
            self.main_window_ratio = default_main_window_ratio();
            fixes += 1;
        }

        fixes
    }
}

fn default_short_name() -> String { "Tilegrid".to_string() }

fn default_shortcut() -> String { "Alt+Shift+T".to_string() }

fn default_shortcut_mac() -> String { "Option+Shift+T".to_string() }

fn default_sound_throttle_ms() -> u64 { 100 }

fn default_padding() -> i32 { 10 }

fn default_max_columns() -> usize { 3 }

fn default_min_window_size() -> i32 { 550 }

fn default_main_window_ratio() -> f64 { 0.5 }

impl Default for Config {
    fn default() -> Self {
        Self::parse(include_str!("../../tilegrid.default.toml"))
            .unwrap_or_else(|_| Config { settings: Settings::default() })
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf)
    }

    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Self::default()) }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(include_str!("../../tilegrid.default.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn default_layout_matches_builtin_parameters() {
        let layout = Config::default().settings.layout;
        assert_eq!(layout.padding, 10);
        assert_eq!(layout.max_columns, 3);
        assert_eq!(layout.min_window_size, 550);
        assert_eq!(layout.main_window_ratio, 0.5);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config = Config::parse(
            r#"
            [settings.layout]
            padding = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.layout.padding, 4);
        assert_eq!(config.settings.layout.max_columns, 3);
        assert_eq!(config.settings.short_name, "Tilegrid");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("[settings]\nanimate = true\n").is_err());
    }

    #[test]
    fn invalid_values_are_reported_and_fixed() {
        let mut config = Config::default();

        config.settings.layout.max_columns = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("max_columns must be at least 1"));

        let fixes = config.auto_fix_values();
        assert_eq!(fixes, 1);
        assert_eq!(config.settings.layout.max_columns, 3);

        config.settings.layout.main_window_ratio = 1.5;
        config.settings.layout.padding = -3;
        let issues = config.validate();
        assert_eq!(issues.len(), 2);

        let fixes = config.auto_fix_values();
        assert_eq!(fixes, 2);
        assert_eq!(config.settings.layout.main_window_ratio, 0.5);
        assert_eq!(config.settings.layout.padding, 10);
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tilegrid.toml");
        let mut config = Config::default();
        config.settings.layout.padding = 6;
        config.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), config);
    }

    #[test]
    fn action_title_includes_shortcut() {
        let settings = Settings::default();
        let title = settings.action_title();
        assert!(title.starts_with("Tilegrid ("));
        assert!(title.ends_with(')'));
    }
}
