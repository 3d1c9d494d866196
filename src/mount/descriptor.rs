//! Mount descriptor: the validated form of the shortcode attribute bag.
//!
//! Attributes arrive as loosely typed strings (`max_accessories="20"`). They
//! are parsed into [`ShortcodeAttributes`], then resolved against the plugin
//! [`Settings`] into a [`MountDescriptor`]. Out-of-range values are rejected,
//! never clamped.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::config::{validate_max_accessories, ModelQuality, Settings};
use crate::constants::DEFAULT_LOADING_TEXT;
use crate::error::ConfiguratorError;
use crate::models::{CssDimension, Theme};

/// Attribute names accepted by the shortcode.
pub const KNOWN_ATTRIBUTES: &[&str] = &[
    "width",
    "height",
    "theme",
    "show_price",
    "show_cart_button",
    "show_camera_controls",
    "enable_mobile",
    "max_accessories",
    "default_pegboard",
    "container_class",
    "loading_text",
    "show_save_config",
];

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z][A-Za-z0-9_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#)
            .expect("valid regex")
    })
}

fn class_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_-]*$").expect("valid regex"))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

/// Raw shortcode attributes, keyed by normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortcodeAttributes {
    values: BTreeMap<String, String>,
}

impl ShortcodeAttributes {
    /// Creates an empty attribute bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key="value" key='value' key=value` text.
    ///
    /// # Errors
    ///
    /// Rejects unknown attribute names and text that is not a sequence of
    /// assignments.
    pub fn parse(text: &str) -> Result<Self, ConfiguratorError> {
        let mut attrs = Self::new();
        let mut consumed = 0;

        for captures in attribute_pattern().captures_iter(text) {
            let whole = captures.get(0).map_or(0..0, |m| m.range());
            if !text[consumed..whole.start].trim().is_empty() {
                return Err(ConfiguratorError::validation(format!(
                    "unexpected text in shortcode attributes: '{}'",
                    text[consumed..whole.start].trim()
                )));
            }
            consumed = whole.end;

            let key = captures.get(1).map_or("", |m| m.as_str());
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .or_else(|| captures.get(4))
                .map_or("", |m| m.as_str());
            attrs.insert(key, value)?;
        }

        if !text[consumed..].trim().is_empty() {
            return Err(ConfiguratorError::validation(format!(
                "unexpected text in shortcode attributes: '{}'",
                text[consumed..].trim()
            )));
        }

        Ok(attrs)
    }

    /// Builds attributes from key/value pairs (query strings, CLI args).
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfiguratorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut attrs = Self::new();
        for (key, value) in pairs {
            attrs.insert(key.as_ref(), value)?;
        }
        Ok(attrs)
    }

    /// Sets one attribute, rejecting unknown names.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Result<(), ConfiguratorError> {
        let key = normalize_key(key);
        if !KNOWN_ATTRIBUTES.contains(&key.as_str()) {
            return Err(ConfiguratorError::validation(format!(
                "unknown shortcode attribute '{key}'"
            )));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Returns a raw value; blank values count as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfiguratorError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                ConfiguratorError::validation(format!(
                    "attribute '{key}' must be a boolean, got '{raw}'"
                ))
            }),
        }
    }
}

/// Parses shortcode boolean spellings.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Which optional panels the scaffold renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelFlags {
    /// Running total panel
    pub show_price: bool,
    /// Add-to-cart button
    pub show_cart_button: bool,
    /// Save and reset buttons
    pub show_save_config: bool,
    /// Camera control buttons
    pub show_camera_controls: bool,
}

impl Default for PanelFlags {
    fn default() -> Self {
        Self {
            show_price: true,
            show_cart_button: true,
            show_save_config: true,
            show_camera_controls: true,
        }
    }
}

/// Settings forwarded to the 3D engine unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineOptions {
    /// Level of detail
    pub model_quality: ModelQuality,
    /// Browser-side model cache
    pub model_caching: bool,
    /// Preload models
    pub preload_models: bool,
    /// Verbose engine logging
    pub debug: bool,
    /// Usage reporting
    pub analytics: bool,
    /// Inherit host theme styling
    pub theme_integration: bool,
    /// Catalog endpoint override
    pub api_endpoint: Option<String>,
}

impl EngineOptions {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            model_quality: settings.performance.model_quality,
            model_caching: settings.performance.model_caching,
            preload_models: settings.performance.preload_models,
            debug: settings.advanced.debug_mode,
            analytics: settings.general.analytics,
            theme_integration: settings.general.theme_integration,
            api_endpoint: settings.advanced.api_endpoint.clone(),
        }
    }
}

/// Everything needed to render and boot one configurator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountDescriptor {
    /// Color theme
    pub theme: Theme,
    /// Container width
    pub width: CssDimension,
    /// Container height
    pub height: CssDimension,
    /// Placement cap (1-100)
    pub max_accessories: u32,
    /// Pegboard selected on load
    pub default_pegboard: Option<String>,
    /// Touch controls on small screens
    pub mobile_enabled: bool,
    /// Optional panels
    pub panels: PanelFlags,
    /// Extra CSS classes for the container
    pub container_classes: Vec<String>,
    /// Loading state text
    pub loading_text: String,
    /// Host custom CSS
    pub custom_css: String,
    /// Engine pass-through options
    pub engine: EngineOptions,
}

impl MountDescriptor {
    /// Descriptor with every value taken from `settings`.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            theme: settings.display.default_theme,
            width: settings.display.default_width.clone(),
            height: settings.display.default_height.clone(),
            max_accessories: settings.general.max_accessories,
            default_pegboard: None,
            mobile_enabled: settings.general.mobile_optimization,
            panels: PanelFlags::default(),
            container_classes: Vec::new(),
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            custom_css: settings.display.custom_css.clone(),
            engine: EngineOptions::from_settings(settings),
        }
    }

    /// Resolves shortcode attributes against the plugin settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfiguratorError::ValidationError`] for an unknown theme, a
    /// malformed dimension, a non-boolean flag, a non-numeric or out-of-range
    /// `max_accessories`, or an invalid CSS class name.
    pub fn from_shortcode(
        attrs: &ShortcodeAttributes,
        settings: &Settings,
    ) -> Result<Self, ConfiguratorError> {
        let mut descriptor = Self::from_settings(settings);

        if let Some(theme) = attrs.get("theme") {
            descriptor.theme = theme
                .parse()
                .map_err(|e: anyhow::Error| ConfiguratorError::validation(e.to_string()))?;
        }

        if let Some(width) = attrs.get("width") {
            descriptor.width = CssDimension::parse(width)
                .map_err(|e| ConfiguratorError::validation(format!("width: {e}")))?;
        }

        if let Some(height) = attrs.get("height") {
            descriptor.height = CssDimension::parse(height)
                .map_err(|e| ConfiguratorError::validation(format!("height: {e}")))?;
        }

        if let Some(raw) = attrs.get("max_accessories") {
            let value: u32 = raw.parse().map_err(|_| {
                ConfiguratorError::validation(format!(
                    "max_accessories must be a whole number, got '{raw}'"
                ))
            })?;
            validate_max_accessories(value)
                .map_err(|e| ConfiguratorError::validation(e.to_string()))?;
            descriptor.max_accessories = value;
        }

        descriptor.default_pegboard = attrs.get("default_pegboard").map(str::to_string);
        descriptor.mobile_enabled = attrs.bool_or("enable_mobile", descriptor.mobile_enabled)?;

        descriptor.panels = PanelFlags {
            show_price: attrs.bool_or("show_price", true)?,
            show_cart_button: attrs.bool_or("show_cart_button", true)?,
            show_save_config: attrs.bool_or("show_save_config", true)?,
            show_camera_controls: attrs.bool_or("show_camera_controls", true)?,
        };

        if let Some(classes) = attrs.get("container_class") {
            for class in classes.split_whitespace() {
                if !class_pattern().is_match(class) {
                    return Err(ConfiguratorError::validation(format!(
                        "invalid CSS class name '{class}'"
                    )));
                }
                descriptor.container_classes.push(class.to_string());
            }
        }

        if let Some(text) = attrs.get("loading_text") {
            descriptor.loading_text = text.to_string();
        }

        Ok(descriptor)
    }

    /// `data-*` attributes placed on the container for the 3D engine.
    #[must_use]
    pub fn data_attributes(&self) -> Vec<(String, String)> {
        let mut attrs = vec![
            ("data-theme".to_string(), self.theme.to_string()),
            ("data-width".to_string(), self.width.to_string()),
            ("data-height".to_string(), self.height.to_string()),
            (
                "data-max-accessories".to_string(),
                self.max_accessories.to_string(),
            ),
            (
                "data-default-pegboard".to_string(),
                self.default_pegboard.clone().unwrap_or_default(),
            ),
            (
                "data-mobile-enabled".to_string(),
                self.mobile_enabled.to_string(),
            ),
            (
                "data-model-quality".to_string(),
                self.engine.model_quality.to_string(),
            ),
            (
                "data-model-caching".to_string(),
                self.engine.model_caching.to_string(),
            ),
            (
                "data-preload-models".to_string(),
                self.engine.preload_models.to_string(),
            ),
            ("data-debug".to_string(), self.engine.debug.to_string()),
        ];

        if let Some(endpoint) = &self.engine.api_endpoint {
            attrs.push(("data-api-endpoint".to_string(), endpoint.clone()));
        }

        attrs
    }
}
