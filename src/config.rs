use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::geometry::Aspect;
use crate::engine::hit_test::{self, DEFAULT_HIT_FACTOR};
use crate::engine::session::{DotStyle, SessionOptions};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_hit_factor")]
    pub hit_factor: f32,
    #[serde(default = "default_in_stealth_mode")]
    pub in_stealth_mode: bool,
    #[serde(default = "default_input_enabled")]
    pub input_enabled: bool,
    #[serde(default = "default_haptic_feedback")]
    pub haptic_feedback: bool,
    #[serde(default = "default_dot_size")]
    pub dot_size: f32,
    #[serde(default = "default_dot_size_activated")]
    pub dot_size_activated: f32,
    #[serde(default = "default_path_width")]
    pub path_width: f32,
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default)]
    pub aspect: Aspect,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_hit_factor() -> f32 {
    DEFAULT_HIT_FACTOR
}
fn default_in_stealth_mode() -> bool {
    false
}
fn default_input_enabled() -> bool {
    true
}
fn default_haptic_feedback() -> bool {
    true
}
fn default_dot_size() -> f32 {
    1.5
}
fn default_dot_size_activated() -> f32 {
    3.5
}
fn default_path_width() -> f32 {
    1.0
}
fn default_padding() -> f32 {
    1.0
}
fn default_theme() -> String {
    "midnight".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hit_factor: default_hit_factor(),
            in_stealth_mode: default_in_stealth_mode(),
            input_enabled: default_input_enabled(),
            haptic_feedback: default_haptic_feedback(),
            dot_size: default_dot_size(),
            dot_size_activated: default_dot_size_activated(),
            path_width: default_path_width(),
            padding: default_padding(),
            aspect: Aspect::default(),
            theme: default_theme(),
        }
    }
}

impl Config {
    /// Loads the user config, falling back to defaults when none exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("patternlock")
            .join("config.toml")
    }

    /// Pulls numeric settings back into usable ranges.
    pub fn validate(&mut self) {
        self.hit_factor = hit_test::clamp_hit_factor(self.hit_factor);
        if !(self.dot_size.is_finite() && self.dot_size > 0.0) {
            self.dot_size = default_dot_size();
        }
        if !self.dot_size_activated.is_finite() || self.dot_size_activated < self.dot_size {
            self.dot_size_activated = self.dot_size;
        }
        if !(self.path_width.is_finite() && self.path_width >= 0.0) {
            self.path_width = default_path_width();
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            self.padding = default_padding();
        }
    }

    /// Resets `theme` to the default if it is not one of `available`.
    pub fn normalize_theme(&mut self, available: &[String]) {
        if !available.iter().any(|name| *name == self.theme) {
            self.theme = default_theme();
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            hit_factor: self.hit_factor,
            in_stealth_mode: self.in_stealth_mode,
            input_enabled: self.input_enabled,
            haptic_feedback: self.haptic_feedback,
            style: DotStyle {
                dot_size: self.dot_size,
                dot_size_activated: self.dot_size_activated,
                path_width: self.path_width,
            },
        }
    }
}
