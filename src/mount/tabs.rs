//! Admin settings tab selection.
//!
//! Pure presentation state: which tab of the settings page is visible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tabs of the plugin settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTab {
    /// Mobile, analytics, accessory limit, theme integration
    #[default]
    General,
    /// Theme, dimensions, custom CSS
    Display,
    /// Model caching, quality, preloading
    Performance,
    /// Debug mode, API endpoint
    Advanced,
}

impl SettingsTab {
    /// Returns all tabs in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::General, Self::Display, Self::Performance, Self::Advanced]
    }

    /// Returns display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Display => "Display",
            Self::Performance => "Performance",
            Self::Advanced => "Advanced",
        }
    }

    /// URL fragment slug (`#general`, `#display`, ...).
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Display => "display",
            Self::Performance => "performance",
            Self::Advanced => "advanced",
        }
    }

    /// Parses a slug, with or without a leading `#`. Unknown slugs select the first tab.
    #[must_use]
    pub fn from_slug(slug: &str) -> Self {
        let slug = slug.trim().trim_start_matches('#');
        Self::all()
            .iter()
            .copied()
            .find(|tab| tab.slug().eq_ignore_ascii_case(slug))
            .unwrap_or_default()
    }

    fn position(self) -> usize {
        Self::all().iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Next tab, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let all = Self::all();
        all[(self.position() + 1) % all.len()]
    }

    /// Previous tab, wrapping around.
    #[must_use]
    pub fn previous(self) -> Self {
        let all = Self::all();
        all[(self.position() + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for SettingsTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
