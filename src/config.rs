use crate::fs::{FileSystem, default_fs};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".a11y-audit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub thresholds: Thresholds,
    pub touch_target_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Smallest legible font size in px.
    pub min_font_size: f64,
    /// Smallest touch target edge in px (WCAG 2.5.5).
    pub min_touch_target: f64,
    /// Smallest gap between neighbouring touch targets in px.
    pub min_touch_spacing: f64,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    thresholds: Option<RawThresholds>,
    touch_targets: Option<RawTouchTargets>,
}

#[derive(Debug, Deserialize)]
struct RawThresholds {
    min_font_size: Option<f64>,
    min_touch_target: Option<f64>,
    min_touch_spacing: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTouchTargets {
    keywords: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            touch_target_keywords: default_keywords(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_font_size: 11.0,
            min_touch_target: 44.0,
            min_touch_spacing: 8.0,
        }
    }
}

fn default_keywords() -> Vec<String> {
    ["btn", "button", "link", "touch"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

impl Config {
    /// Load `.a11y-audit.toml` from `dir`, or defaults when there is none.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_fs(dir, default_fs())
    }

    pub fn load_with_fs(dir: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !fs.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Thresholds::default();

        let thresholds = match raw.thresholds {
            Some(t) => Thresholds {
                min_font_size: t.min_font_size.unwrap_or(defaults.min_font_size),
                min_touch_target: t.min_touch_target.unwrap_or(defaults.min_touch_target),
                min_touch_spacing: t.min_touch_spacing.unwrap_or(defaults.min_touch_spacing),
            },
            None => defaults,
        };

        let touch_target_keywords = raw
            .touch_targets
            .and_then(|t| t.keywords)
            .map(|keywords| keywords.into_iter().map(|k| k.to_lowercase()).collect())
            .unwrap_or_else(default_keywords);

        Ok(Self {
            thresholds,
            touch_target_keywords,
        })
    }
}

pub fn generate_config_template() -> String {
    let defaults = Config::default();
    let keywords: Vec<_> = defaults
        .touch_target_keywords
        .iter()
        .map(|k| format!("\"{}\"", k))
        .collect();

    format!(
        r#"# a11y-audit configuration

[thresholds]
# Text smaller than this (px) is reported as a typography issue
min_font_size = {min_font_size}

# Touch targets narrower or shorter than this (px) are reported (WCAG 2.5.5)
min_touch_target = {min_touch_target}

# Touch targets closer than this (px) to a neighbour are reported
min_touch_spacing = {min_touch_spacing}

[touch_targets]
# A layer whose name (or master component name) contains one of these
# case-insensitive keywords is treated as interactive
keywords = [{keywords}]
"#,
        min_font_size = defaults.thresholds.min_font_size,
        min_touch_target = defaults.thresholds.min_touch_target,
        min_touch_spacing = defaults.thresholds.min_touch_spacing,
        keywords = keywords.join(", "),
    )
}
