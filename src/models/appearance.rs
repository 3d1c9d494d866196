//! Visual presentation values shared by settings and mount descriptors.

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Configurator color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Plugin default styling
    #[default]
    Default,
    /// Dark background
    Dark,
    /// Light background
    Light,
    /// Stripped-down chrome
    Minimal,
}

impl Theme {
    /// Returns all themes in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Dark, Self::Light, Self::Minimal]
    }

    /// Returns the slug used in attributes and CSS classes.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "minimal" => Ok(Self::Minimal),
            other => anyhow::bail!(
                "Unknown theme '{other}' (expected one of: default, dark, light, minimal)"
            ),
        }
    }
}

fn dimension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:auto|\d+(?:\.\d+)?(?:px|%|em|rem|vh|vw)?)$").expect("valid regex")
    })
}

/// A CSS-like length such as `100%`, `600px` or `auto`.
///
/// Bare numbers are normalized to pixels (`600` becomes `600px`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CssDimension(String);

impl CssDimension {
    /// Parses and normalizes a dimension string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty or not a number with an
    /// optional `px`, `%`, `em`, `rem`, `vh` or `vw` unit.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim().to_ascii_lowercase();
        if !dimension_pattern().is_match(&value) {
            anyhow::bail!(
                "Invalid dimension '{value}' (expected e.g. 100%, 600px, 40rem or auto)"
            );
        }

        if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Ok(Self(format!("{value}px")));
        }

        Ok(Self(value))
    }

    /// Wraps an already-normalized constant.
    pub(crate) fn from_normalized(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the normalized CSS text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CssDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CssDimension {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CssDimension> for String {
    fn from(value: CssDimension) -> Self {
        value.0
    }
}
