//! Criteria for the accessory browser.

use serde::{Deserialize, Serialize};

/// Category selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// Every category, including uncategorized accessories
    #[default]
    All,
    /// Exactly this category
    Named(String),
}

impl CategoryFilter {
    /// Builds a filter from an optional UI value; empty and `all` mean every category.
    #[must_use]
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Self::All,
            Some(v) => Self::Named(v.to_string()),
        }
    }
}

/// Whether incompatible accessories are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityMode {
    /// Only accessories that fit the current pegboard
    #[default]
    CompatibleOnly,
    /// No compatibility filtering
    ShowAll,
}

/// What the accessory list currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterCriteria {
    /// Case-insensitive name search
    #[serde(default)]
    pub search: String,
    /// Category selection
    #[serde(default)]
    pub category: CategoryFilter,
    /// Compatibility mode
    #[serde(default)]
    pub compatibility: CompatibilityMode,
}

impl FilterCriteria {
    /// Sets the search text.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Restricts to one category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = CategoryFilter::Named(category.into());
        self
    }

    /// Sets the compatibility mode.
    #[must_use]
    pub const fn with_compatibility(mut self, mode: CompatibilityMode) -> Self {
        self.compatibility = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_option() {
        assert_eq!(CategoryFilter::from_option(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_option(Some("  ")), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_option(Some("ALL")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_option(Some("hooks")),
            CategoryFilter::Named("hooks".to_string())
        );
    }

    #[test]
    fn test_default_is_compatible_only() {
        let criteria = FilterCriteria::default();
        assert_eq!(criteria.compatibility, CompatibilityMode::CompatibleOnly);
        assert_eq!(criteria.category, CategoryFilter::All);
        assert!(criteria.search.is_empty());
    }
}
