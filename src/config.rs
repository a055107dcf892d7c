use crate::gfx::math::Color;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_anchor")]
    pub anchor: Anchor,

    #[serde(default = "default_margins")]
    pub margins: Margins,

    #[serde(default = "default_bar_size")]
    pub bar_size: Size,

    #[serde(default = "default_theme")]
    pub theme: Theme,

    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub track: String,
    pub fill: String,
    pub digits: String,
}

impl Theme {
    pub fn track_color(&self) -> Color {
        Color::from_hex(&self.track).unwrap_or(Color::rgba(26, 26, 26, 255))
    }

    pub fn fill_color(&self) -> Color {
        Color::from_hex(&self.fill).unwrap_or(Color::rgba(74, 158, 255, 255))
    }

    pub fn digits_color(&self) -> Color {
        Color::from_hex(&self.digits).unwrap_or(Color::rgba(255, 255, 255, 255))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            margins: default_margins(),
            bar_size: default_bar_size(),
            theme: default_theme(),
            fps_cap: default_fps_cap(),
            default_duration_secs: default_duration_secs(),
        }
    }
}

fn default_anchor() -> Anchor {
    Anchor::TopRight
}

fn default_margins() -> Margins {
    Margins {
        top: 8,
        right: 8,
        bottom: 8,
        left: 8,
    }
}

fn default_bar_size() -> Size {
    Size {
        width: 240,
        height: 56,
    }
}

fn default_theme() -> Theme {
    Theme {
        track: "#1a1a1a".to_string(),
        fill: "#4a9eff".to_string(),
        digits: "#ffffff".to_string(),
    }
}

fn default_fps_cap() -> u32 {
    60
}

fn default_duration_secs() -> u64 {
    5 * 60
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("wane").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_dir = config_dir.join("wane");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.anchor, Anchor::TopRight);
        assert_eq!(config.fps_cap, 60);
        assert_eq!(config.default_duration_secs, 300);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r##"
            fps_cap = 30
            default_duration_secs = 90

            [theme]
            track = "#000000"
            fill = "#ff0000"
            digits = "#eeeeee"
            "##,
        )
        .unwrap();
        assert_eq!(config.fps_cap, 30);
        assert_eq!(config.default_duration_secs, 90);
        assert_eq!(config.bar_size.width, 240);
        let fill = config.theme.fill_color();
        assert!((fill.r - 1.0).abs() < 1e-6);
        assert_eq!(fill.g, 0.0);
    }

    #[test]
    fn bad_theme_hex_falls_back() {
        let theme = Theme {
            track: "not-a-color".to_string(),
            fill: "#4a9eff".to_string(),
            digits: "#ffffff".to_string(),
        };
        assert_eq!(theme.track_color(), Color::rgba(26, 26, 26, 255));
    }
}
