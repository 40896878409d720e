//! Demo configuration.
//!
//! Reads/writes TOML at `~/.config/appind/demo.toml` (`%APPDATA%` on
//! Windows). Missing fields take their defaults, so an empty file is valid.

use std::path::{Path, PathBuf};

use anyhow::Context;
use appind_indicator::{Category, Flavor, Status};
use serde::{Deserialize, Serialize};

/// What a menu entry does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    /// Only logs the activation.
    Log,
    /// Flips the indicator between active and needs-attention.
    ToggleAttention,
    /// Stops the main loop.
    Quit,
}

/// One entry of the indicator menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub separator: bool,
    #[serde(default = "default_true")]
    pub sensitive: bool,
    #[serde(default = "default_action")]
    pub action: MenuAction,
}

impl MenuEntry {
    fn item(label: &str, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            separator: false,
            sensitive: true,
            action,
        }
    }

    fn separator() -> Self {
        Self {
            label: String::new(),
            separator: true,
            sensitive: false,
            action: MenuAction::Log,
        }
    }
}

/// Construction and initial state of the indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSection {
    pub id: String,
    pub icon_name: String,
    pub attention_icon_name: String,
    pub icon_theme_path: Option<String>,
    pub category: Category,
    pub status: Status,
    pub flavor: Flavor,
    pub title: Option<String>,
    pub label: Option<String>,
    pub label_guide: Option<String>,
    /// Label of the menu entry activated on a secondary click.
    pub secondary_target: Option<String>,
}

impl Default for IndicatorSection {
    fn default() -> Self {
        Self {
            id: "example-simple-client".into(),
            icon_name: "indicator-messages".into(),
            attention_icon_name: "indicator-messages-new".into(),
            icon_theme_path: None,
            category: Category::ApplicationStatus,
            status: Status::Active,
            flavor: Flavor::AppIndicator,
            title: None,
            label: None,
            label_guide: None,
            secondary_target: Some("Toggle attention".into()),
        }
    }
}

/// Demo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Quit after this many seconds; 0 runs until the Quit entry is used.
    pub run_seconds: u64,
    /// Update the label once per second with a counter.
    pub label_ticker: bool,
    pub indicator: IndicatorSection,
    pub menu: Vec<MenuEntry>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_filter: "info,appind=debug".into(),
            run_seconds: 0,
            label_ticker: false,
            indicator: IndicatorSection::default(),
            menu: vec![
                MenuEntry::item("Item 1", MenuAction::Log),
                MenuEntry::item("Item 2", MenuAction::Log),
                MenuEntry::item("Toggle attention", MenuAction::ToggleAttention),
                MenuEntry::separator(),
                MenuEntry::item("Quit", MenuAction::Quit),
            ],
        }
    }
}

impl DemoConfig {
    /// Loads the configuration at `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "demo configuration saved");
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_action() -> MenuAction {
    MenuAction::Log
}

/// Default location of the configuration file.
pub fn default_path() -> PathBuf {
    config_base_dir().join("appind").join("demo.toml")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}
