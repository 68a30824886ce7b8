//! Configuration loading and settings resolution.
//!
//! Parses `caret.toml` (or an override path provided by the binary) into a
//! `ConfigFile` and resolves it into immutable `Settings` consumed by layout
//! math. Every field is optional; missing sections take defaults and unknown
//! fields are ignored so older binaries tolerate newer files.
//!
//! ```toml
//! [font]
//! family = "monospace"
//! size = 14.0
//!
//! [layout]
//! line_height = 20.0
//!
//! [scrollbar]
//! width = 12.0
//! min_thumb = 20.0
//! ```
//!
//! Resolution clamps values that would break layout: the font size is at
//! least 1px and the line height is never smaller than the font size. Clamps
//! are reported on the `config` tracing target.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "caret.toml";

const MIN_FONT_SIZE: f64 = 1.0;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FontConfig {
    #[serde(default = "FontConfig::default_family")]
    pub family: String,
    #[serde(default = "FontConfig::default_size")]
    pub size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: Self::default_family(),
            size: Self::default_size(),
        }
    }
}

impl FontConfig {
    fn default_family() -> String {
        "monospace".to_string()
    }
    const fn default_size() -> f64 {
        14.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_line_height")]
    pub line_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height: Self::default_line_height(),
        }
    }
}

impl LayoutConfig {
    const fn default_line_height() -> f64 {
        20.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScrollbarConfig {
    #[serde(default = "ScrollbarConfig::default_width")]
    pub width: f64,
    #[serde(default = "ScrollbarConfig::default_min_thumb")]
    pub min_thumb: f64,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            min_thumb: Self::default_min_thumb(),
        }
    }
}

impl ScrollbarConfig {
    const fn default_width() -> f64 {
        12.0
    }
    const fn default_min_thumb() -> f64 {
        20.0
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub scrollbar: ScrollbarConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Resolved, read-only layout inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub font_family: String,
    pub font_size: f64,
    pub line_height: f64,
    pub scrollbar_width: f64,
    pub scrollbar_min_thumb: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().resolve()
    }
}

/// Config path following platform conventions: working directory first, then the user config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("caret").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Resolve the parsed file into settings, clamping values layout cannot work with.
    pub fn resolve(&self) -> Settings {
        let font = &self.file.font;
        let mut font_size = font.size;
        if !font_size.is_finite() || font_size < MIN_FONT_SIZE {
            info!(target: "config", raw = font.size, clamped = MIN_FONT_SIZE, "font_size_clamped");
            font_size = MIN_FONT_SIZE;
        }
        let raw_line_height = self.file.layout.line_height;
        let line_height = if !raw_line_height.is_finite() || raw_line_height < font_size {
            info!(
                target: "config",
                raw = raw_line_height,
                clamped = font_size,
                font_size,
                "line_height_clamped"
            );
            font_size
        } else {
            raw_line_height
        };
        Settings {
            font_family: font.family.clone(),
            font_size,
            line_height,
            scrollbar_width: self.file.scrollbar.width.max(0.0),
            scrollbar_min_thumb: self.file.scrollbar.min_thumb.max(0.0),
        }
    }
}
