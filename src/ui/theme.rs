use std::fs;

use patternlock::engine::DotColor;
use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub regular: String,
    pub path: String,
    pub accent: String,
    pub error: String,
    pub success: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // User themes shadow bundled ones of the same name
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("patternlock")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(err) => warn!(path = %user_theme_path.display(), %err, "ignoring user theme"),
                }
            }
        }

        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("midnight").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            regular: "#a6adc8".to_string(),
            path: "#89b4fa".to_string(),
            accent: "#89b4fa".to_string(),
            error: "#f38ba8".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    /// Color for a dot or path role. The regular path uses the path color
    /// so an in-progress stroke stands out from idle dots.
    pub fn dot(&self, role: DotColor) -> Color {
        match role {
            DotColor::Regular => self.regular(),
            DotColor::Error => self.error(),
            DotColor::Success => self.success(),
        }
    }

    pub fn line(&self, role: DotColor) -> Color {
        match role {
            DotColor::Regular => self.path(),
            other => self.dot(other),
        }
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn regular(&self) -> Color { Self::parse_color(&self.regular) }
    pub fn path(&self) -> Color { Self::parse_color(&self.path) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}
