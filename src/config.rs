//! Persisted plugin settings.
//!
//! This module handles loading, validating, and saving the host settings
//! in TOML format with platform-specific directory resolution. The core
//! consumes these values read-only; only the CLI and web API write them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_HEIGHT, DEFAULT_MAX_ACCESSORIES, DEFAULT_WIDTH,
    MAX_ACCESSORY_LIMIT, MIN_ACCESSORY_LIMIT,
};
use crate::models::{CssDimension, Theme};

/// 3D model level of detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelQuality {
    /// Full-resolution meshes
    High,
    /// Reduced meshes
    Medium,
    /// Lowest level of detail
    Low,
    /// Picked by the engine from device capabilities
    #[default]
    Auto,
}

impl ModelQuality {
    /// Returns the attribute slug.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for ModelQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelQuality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "auto" => Ok(Self::Auto),
            other => anyhow::bail!(
                "Unknown model quality '{other}' (expected high, medium, low or auto)"
            ),
        }
    }
}

/// General behavior settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Enable touch-optimized controls on small screens
    #[serde(default = "default_true")]
    pub mobile_optimization: bool,
    /// Report configurator usage to the host analytics
    #[serde(default)]
    pub analytics: bool,
    /// Default accessory cap for new mounts (1-100)
    #[serde(default = "default_max_accessories")]
    pub max_accessories: u32,
    /// Inherit fonts and colors from the host theme
    #[serde(default = "default_true")]
    pub theme_integration: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            mobile_optimization: true,
            analytics: false,
            max_accessories: DEFAULT_MAX_ACCESSORIES,
            theme_integration: true,
        }
    }
}

/// Display defaults applied when a mount does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Default theme
    #[serde(default)]
    pub default_theme: Theme,
    /// Default container width
    #[serde(default = "default_width")]
    pub default_width: CssDimension,
    /// Default container height
    #[serde(default = "default_height")]
    pub default_height: CssDimension,
    /// Extra CSS appended to every mount
    #[serde(default)]
    pub custom_css: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            default_theme: Theme::default(),
            default_width: default_width(),
            default_height: default_height(),
            custom_css: String::new(),
        }
    }
}

/// Asset loading settings passed through to the 3D engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSettings {
    /// Cache downloaded models in the browser
    #[serde(default = "default_true")]
    pub model_caching: bool,
    /// Level of detail
    #[serde(default)]
    pub model_quality: ModelQuality,
    /// Fetch models before they are placed
    #[serde(default)]
    pub preload_models: bool,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            model_caching: true,
            model_quality: ModelQuality::default(),
            preload_models: false,
        }
    }
}

/// Diagnostics and integration overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdvancedSettings {
    /// Verbose logging
    #[serde(default)]
    pub debug_mode: bool,
    /// External catalog endpoint replacing the host catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

/// Where the catalog and saved configurations live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StorageSettings {
    /// Catalog JSON file (defaults to `<config dir>/catalog.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Saved configuration directory (defaults to `<config dir>/configurations`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_max_accessories() -> u32 {
    DEFAULT_MAX_ACCESSORIES
}

fn default_width() -> CssDimension {
    CssDimension::from_normalized(DEFAULT_WIDTH)
}

fn default_height() -> CssDimension {
    CssDimension::from_normalized(DEFAULT_HEIGHT)
}

/// Plugin settings.
///
/// # File Location
///
/// - Linux: `~/.config/BlastiConfigurator/settings.toml`
/// - macOS: `~/Library/Application Support/BlastiConfigurator/settings.toml`
/// - Windows: `%APPDATA%\BlastiConfigurator\settings.toml`
///
/// `BLASTI_CONFIG_DIR` replaces the directory when set.
///
/// # Validation
///
/// - `max_accessories` must be within 1-100
/// - `api_endpoint`, when set, must be an http(s) URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// General behavior
    #[serde(default)]
    pub general: GeneralSettings,
    /// Display defaults
    #[serde(default)]
    pub display: DisplaySettings,
    /// Asset loading
    #[serde(default)]
    pub performance: PerformanceSettings,
    /// Diagnostics
    #[serde(default)]
    pub advanced: AdvancedSettings,
    /// File locations
    #[serde(default)]
    pub storage: StorageSettings,
}

impl Settings {
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the settings file.
    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Resolves the catalog file location.
    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.storage.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("catalog.json")),
        }
    }

    /// Resolves the saved configuration directory.
    pub fn configurations_dir(&self) -> Result<PathBuf> {
        match &self.storage.configurations_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("configurations")),
        }
    }

    /// Loads settings from the settings file.
    ///
    /// If the file doesn't exist, returns default settings.
    pub fn load() -> Result<Self> {
        let path = Self::settings_file_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load settings file: {}", path.display()))
    }

    /// Parses and validates settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings to the settings file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        let path = Self::settings_file_path()?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp settings file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp settings file to: {}", path.display()))?;

        Ok(())
    }

    /// Validates settings values.
    pub fn validate(&self) -> Result<()> {
        validate_max_accessories(self.general.max_accessories)?;

        if let Some(endpoint) = &self.advanced.api_endpoint {
            let lower = endpoint.to_ascii_lowercase();
            let has_host = lower
                .strip_prefix("https://")
                .or_else(|| lower.strip_prefix("http://"))
                .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));
            if !has_host {
                anyhow::bail!("API endpoint must be an http(s) URL, got '{endpoint}'");
            }
        }

        Ok(())
    }
}

/// Checks an accessory cap against the allowed 1-100 range.
pub fn validate_max_accessories(value: u32) -> Result<()> {
    if !(MIN_ACCESSORY_LIMIT..=MAX_ACCESSORY_LIMIT).contains(&value) {
        anyhow::bail!(
            "max_accessories must be between {MIN_ACCESSORY_LIMIT} and {MAX_ACCESSORY_LIMIT}, got {value}"
        );
    }
    Ok(())
}
