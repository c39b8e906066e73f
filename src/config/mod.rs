//! Configuration management for the shell
//!
//! Loads the TOML configuration file and exposes typed accessors for the
//! policy keys. Configuration problems are never fatal: unknown values log
//! a warning and fall back to a safe default at the accessor, so a broken
//! file degrades the shell instead of stopping it.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::background::BackgroundMode;
use crate::shell::PanelPosition;

/// Panel fill when `panel-color` is absent or malformed
pub const DEFAULT_PANEL_COLOR: u32 = 0xaa000000;

/// Clock display policy, derived from the `clock-format` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFormat {
    Minutes,
    Seconds,
    Minutes24h,
    Seconds24h,
    Iso,
    None,
}

impl ClockFormat {
    /// Parse a configuration value; anything unrecognized (including the
    /// empty default) is the ISO format, and only "none" disables the clock.
    pub fn from_name(name: &str) -> Self {
        match name {
            "minutes" => ClockFormat::Minutes,
            "seconds" => ClockFormat::Seconds,
            "minutes-24h" => ClockFormat::Minutes24h,
            "seconds-24h" => ClockFormat::Seconds24h,
            "none" => ClockFormat::None,
            _ => ClockFormat::Iso,
        }
    }
}

/// Main configuration struct containing all shell settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HaloConfig {
    /// Shell policy: panel, clock, background, locking
    #[serde(default)]
    pub shell: ShellSection,

    /// Ordered launcher definitions for the panel
    #[serde(default, rename = "launcher")]
    pub launchers: Vec<LauncherEntry>,
}

/// The `[shell]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellSection {
    /// Panel edge: "top", "bottom", "left", "right"; anything else
    /// disables the panel
    #[serde(default = "ShellSection::default_panel_position", rename = "panel-position")]
    pub panel_position: String,

    /// Clock format name; empty means ISO
    #[serde(default, rename = "clock-format")]
    pub clock_format: String,

    /// Panel fill color as "0xAARRGGBB"
    #[serde(default, rename = "panel-color")]
    pub panel_color: String,

    /// Wallpaper image path
    #[serde(default, rename = "background-image")]
    pub background_image: Option<String>,

    /// Wallpaper fill color as "0xAARRGGBB"
    #[serde(default, rename = "background-color")]
    pub background_color: String,

    /// Wallpaper layout: "scale", "scale-crop", "tile", "centered"
    #[serde(default = "ShellSection::default_background_type", rename = "background-type")]
    pub background_type: String,

    /// Whether the compositor's lock requests get an unlock dialog
    #[serde(default = "ShellSection::default_locking")]
    pub locking: bool,
}

/// One `[[launcher]]` entry; entries missing either key are skipped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherEntry {
    pub icon: Option<String>,
    pub path: Option<String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            panel_position: Self::default_panel_position(),
            clock_format: String::new(),
            panel_color: String::new(),
            background_image: None,
            background_color: String::new(),
            background_type: Self::default_background_type(),
            locking: Self::default_locking(),
        }
    }
}

impl ShellSection {
    fn default_panel_position() -> String {
        "top".to_string()
    }

    fn default_background_type() -> String {
        "tile".to_string()
    }

    fn default_locking() -> bool {
        true
    }
}

impl HaloConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            Path::new(&home).join(path.strip_prefix("~").unwrap_or(path))
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: HaloConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        Ok(config)
    }

    /// Panel edge, or `None` when the panel is disabled
    pub fn panel_position(&self) -> Option<PanelPosition> {
        let name = self.shell.panel_position.as_str();
        let position = PanelPosition::from_name(name);
        if position.is_none() {
            // "none" is a valid way to disable the panel
            if name == "none" {
                warn!("Wrong panel position: none");
            } else {
                warn!("Unknown panel-position '{}', disabling panel", name);
            }
        }
        position
    }

    /// Clock policy for new panels
    pub fn clock_format(&self) -> ClockFormat {
        ClockFormat::from_name(&self.shell.clock_format)
    }

    /// Panel fill color
    pub fn panel_color(&self) -> u32 {
        parse_color(&self.shell.panel_color, "panel-color", DEFAULT_PANEL_COLOR)
    }

    /// Wallpaper fill color; zero selects the stock fill
    pub fn background_color(&self) -> u32 {
        parse_color(&self.shell.background_color, "background-color", 0x00000000)
    }

    /// Wallpaper layout mode
    pub fn background_mode(&self) -> BackgroundMode {
        BackgroundMode::from_name(&self.shell.background_type)
    }

    /// Whether lock requests construct an unlock dialog
    pub fn locking(&self) -> bool {
        self.shell.locking
    }

    /// Launcher definitions with both keys present; malformed entries are
    /// logged and dropped
    pub fn valid_launchers(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for entry in &self.launchers {
            match (&entry.icon, &entry.path) {
                (Some(icon), Some(path)) => out.push((icon.clone(), path.clone())),
                _ => warn!("invalid launcher section"),
            }
        }
        out
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}

/// Parse a "0xAARRGGBB" color value, falling back on anything malformed
fn parse_color(value: &str, key: &str, default: u32) -> u32 {
    if value.is_empty() {
        return default;
    }
    let digits = value.strip_prefix("0x").unwrap_or(value);
    match u32::from_str_radix(digits, 16) {
        Ok(color) => color,
        Err(_) => {
            warn!("Invalid {} '{}', using default", key, value);
            default
        }
    }
}
