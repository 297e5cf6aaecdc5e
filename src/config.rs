use anyhow::Context;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::scale::{
    ScaleManager, DEFAULT_BASE_HEIGHT, DEFAULT_BASE_WIDTH, DEFAULT_FONT_SIZE, DEFAULT_ICON_SIZE,
    DEFAULT_MARGIN, DEFAULT_PADDING,
};
use crate::theme::ThemeName;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub ui: UiConfig,
    pub scale: ScaleConfig,
}

impl Config {
    /// First `config.toml` / `config/config.toml` / `config/soundstage.toml`
    /// found in the working directory, then next to the executable.
    pub fn load() -> anyhow::Result<Self> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = env::current_dir() {
            candidates.extend(candidate_paths(&current_dir));
        }

        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.extend(candidate_paths(dir));
            }
        }

        for path in candidates {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        log::debug!("No config file found; using defaults");
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_toml_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        if let Some(dir) = config.ui.palette_dir.take() {
            // Relative palette directories are relative to the config file.
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.ui.palette_dir = Some(base.join(dir));
        }
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(data: &str) -> anyhow::Result<Self> {
        let doc: ConfigDocument = toml::from_str(data)?;
        Ok(doc.into())
    }
}

fn candidate_paths(dir: &Path) -> [PathBuf; 3] {
    [
        dir.join("config.toml"),
        dir.join("config").join("config.toml"),
        dir.join("config").join("soundstage.toml"),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub theme: ThemeName,
    pub hot_reload: bool,
    pub palette_dir: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Light,
            hot_reload: false,
            palette_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleConfig {
    pub base_width: u32,
    pub base_height: u32,
    pub base_font_size: u32,
    pub base_icon_size: u32,
    pub base_padding: u32,
    pub base_margin: u32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            base_width: DEFAULT_BASE_WIDTH,
            base_height: DEFAULT_BASE_HEIGHT,
            base_font_size: DEFAULT_FONT_SIZE,
            base_icon_size: DEFAULT_ICON_SIZE,
            base_padding: DEFAULT_PADDING,
            base_margin: DEFAULT_MARGIN,
        }
    }
}

impl ScaleConfig {
    pub fn scale_manager(&self) -> ScaleManager {
        let manager = ScaleManager::new().with_base_metrics(
            self.base_font_size,
            self.base_icon_size,
            self.base_padding,
            self.base_margin,
        );
        match manager.with_base_resolution(self.base_width, self.base_height) {
            Ok(manager) => manager,
            Err(err) => {
                log::warn!("{err}; keeping {DEFAULT_BASE_WIDTH}x{DEFAULT_BASE_HEIGHT}");
                manager
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    ui: UiSection,
    #[serde(default)]
    scale: ScaleSection,
}

impl From<ConfigDocument> for Config {
    fn from(value: ConfigDocument) -> Self {
        let requested = value.ui.theme.as_deref().map(|name| name.trim().parse::<ThemeName>());
        let theme = match requested {
            Some(Ok(theme)) => theme,
            Some(Err(err)) => {
                log::warn!("{err}; falling back to light");
                ThemeName::Light
            }
            None => ThemeName::Light,
        };
        let ui = UiConfig {
            theme,
            hot_reload: value.ui.hot_reload.unwrap_or(false),
            palette_dir: value.ui.palette_dir,
        };

        let defaults = ScaleConfig::default();
        let s = value.scale;
        let scale = ScaleConfig {
            base_width: positive_or("scale.base_width", s.base_width, defaults.base_width),
            base_height: positive_or("scale.base_height", s.base_height, defaults.base_height),
            base_font_size: positive_or(
                "scale.base_font_size",
                s.base_font_size,
                defaults.base_font_size,
            ),
            base_icon_size: positive_or(
                "scale.base_icon_size",
                s.base_icon_size,
                defaults.base_icon_size,
            ),
            base_padding: positive_or("scale.base_padding", s.base_padding, defaults.base_padding),
            base_margin: positive_or("scale.base_margin", s.base_margin, defaults.base_margin),
        };

        Config { ui, scale }
    }
}

fn positive_or(key: &str, value: Option<i64>, default: u32) -> u32 {
    match value {
        None => default,
        Some(v) => match u32::try_from(v) {
            Ok(v) if v > 0 => v,
            _ => {
                log::warn!("{key} = {v} is not a positive integer; using {default}");
                default
            }
        },
    }
}

#[derive(Debug, Default, Deserialize)]
struct UiSection {
    theme: Option<String>,
    hot_reload: Option<bool>,
    palette_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ScaleSection {
    base_width: Option<i64>,
    base_height: Option<i64>,
    base_font_size: Option<i64>,
    base_icon_size: Option<i64>,
    base_padding: Option<i64>,
    base_margin: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn reads_ui_and_scale_sections() {
        let config = Config::from_toml_str(
            r#"
            [ui]
            theme = " dark "
            hot_reload = true
            palette_dir = "themes"

            [scale]
            base_width = 1280
            base_height = 720
            base_font_size = 13
            "#,
        )
        .unwrap();
        assert_eq!(config.ui.theme, ThemeName::Dark);
        assert!(config.ui.hot_reload);
        assert_eq!(config.ui.palette_dir, Some(PathBuf::from("themes")));
        assert_eq!(config.scale.base_width, 1280);
        assert_eq!(config.scale.base_font_size, 13);
        assert_eq!(config.scale.base_padding, DEFAULT_PADDING);

        let manager = config.scale.scale_manager();
        assert_eq!(manager.base_resolution(), (1280, 720));
        assert_eq!(manager.scaled_font_size(1280, 720).unwrap(), 13);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [ui]
            theme = "sepia"

            [scale]
            base_width = 0
            base_padding = -4
            "#,
        )
        .unwrap();
        assert_eq!(config.ui.theme, ThemeName::Light);
        assert_eq!(config.scale.base_width, DEFAULT_BASE_WIDTH);
        assert_eq!(config.scale.base_padding, DEFAULT_PADDING);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("[ui\ntheme = ").is_err());
    }
}
